//! Recursive typing of SQL expressions.
//!
//! Each supported node kind computes a [`TypedExpr`]; unsupported kinds fail
//! with the deparsed fragment so the caller can report what was rejected.

use sqlparser::ast::{
    AccessExpr, Expr, Function, FunctionArg, FunctionArgExpr, FunctionArguments, Subscript, Value,
};

use crate::analyzer::error::{snippet, AnalyzeError};
use crate::analyzer::functions::{self, FunctionRule};
use crate::analyzer::operators;
use crate::analyzer::scope::Scope;
use crate::analyzer::statement;
use crate::analyzer::typed_expr::TypedExpr;
use crate::catalog::type_map::normalize_type_name;
use crate::parser::{ident_name, object_name_parts};

/// Maximum recursion depth for expression analysis.
///
/// Beyond this depth analysis fails instead of overflowing the stack on
/// adversarially nested SQL.
const MAX_EXPR_DEPTH: u32 = 128;

/// Compute the type of an expression in `scope`.
pub fn analyze_expression(expr: &Expr, scope: &Scope) -> Result<TypedExpr, AnalyzeError> {
    analyze_expr_depth(expr, scope, 0)
}

fn analyze_expr_depth(expr: &Expr, scope: &Scope, depth: u32) -> Result<TypedExpr, AnalyzeError> {
    if depth > MAX_EXPR_DEPTH {
        return Err(AnalyzeError::Unsupported(format!(
            "expression nested deeper than {MAX_EXPR_DEPTH} levels"
        )));
    }
    let recurse = |inner: &Expr| analyze_expr_depth(inner, scope, depth + 1);
    let types = scope.types();

    match expr {
        Expr::Value(value) => Ok(constant_type(&value.value)),

        Expr::Cast {
            expr: inner,
            data_type,
            ..
        } => {
            let inner = recurse(inner)?;
            Ok(apply_cast(inner, &normalize_type_name(data_type), scope))
        }

        Expr::Identifier(ident) => {
            let name = ident_name(ident);
            let column = scope.resolve_column(&name)?;
            Ok(TypedExpr {
                name,
                ..TypedExpr::of(column.sql_type, column.nullable)
            })
        }

        Expr::CompoundIdentifier(parts) => match parts.as_slice() {
            [table, column] => {
                let name = ident_name(column);
                let column = scope.resolve_qualified_column(&ident_name(table), &name)?;
                Ok(TypedExpr {
                    name,
                    ..TypedExpr::of(column.sql_type, column.nullable)
                })
            }
            _ => Err(AnalyzeError::Unsupported(format!(
                "qualified column reference `{expr}`"
            ))),
        },

        // A star inside an expression is a placeholder, not an expansion.
        Expr::Wildcard(..) => Ok(TypedExpr::of("any", false)),
        Expr::QualifiedWildcard(..) => {
            let text = expr.to_string();
            let qualifier = text.strip_suffix(".*").unwrap_or(&text);
            let alias = qualifier
                .rsplit('.')
                .next()
                .unwrap_or(qualifier)
                .trim_matches('"')
                .to_ascii_lowercase();
            let nullable = scope.table(&alias).is_none_or(|t| t.nullable);
            Ok(TypedExpr::of("any", nullable))
        }

        Expr::Nested(inner) => recurse(inner),

        Expr::UnaryOp { op, expr: operand } => {
            let operand = recurse(operand)?;
            operators::unary_result(op, &operand, types)
        }

        Expr::BinaryOp { left, op, right } => {
            use sqlparser::ast::BinaryOperator::{And, Or};
            let lhs = recurse(left)?;
            let rhs = recurse(right)?;
            if matches!(op, And | Or) {
                return Ok(TypedExpr::of("bool", lhs.nullable || rhs.nullable));
            }
            let symbol = operators::binary_symbol(op)
                .ok_or_else(|| AnalyzeError::Unsupported(format!("operator `{op}`")))?;
            let sql_type = operators::binary_result(&symbol, &lhs, &rhs, types)?;
            Ok(TypedExpr::of(sql_type, lhs.nullable || rhs.nullable))
        }

        Expr::IsNull(inner)
        | Expr::IsNotNull(inner)
        | Expr::IsTrue(inner)
        | Expr::IsNotTrue(inner)
        | Expr::IsFalse(inner)
        | Expr::IsNotFalse(inner)
        | Expr::IsUnknown(inner)
        | Expr::IsNotUnknown(inner) => {
            recurse(inner)?;
            Ok(TypedExpr::of("bool", false))
        }

        Expr::IsDistinctFrom(left, right) | Expr::IsNotDistinctFrom(left, right) => {
            recurse(left)?;
            recurse(right)?;
            Ok(TypedExpr::of("bool", false))
        }

        Expr::InList {
            expr: tested, list, ..
        } => {
            let mut nullable = recurse(tested)?.nullable;
            for item in list {
                nullable |= recurse(item)?.nullable;
            }
            Ok(TypedExpr::of("bool", nullable))
        }

        // The subquery membership forms may yield NULL over an empty set; the
        // interior is not analyzed (it needs no output names).
        Expr::InSubquery { .. } => Ok(TypedExpr::of("bool", true)),

        Expr::InUnnest {
            expr: tested,
            array_expr,
            ..
        } => {
            let lhs = recurse(tested)?;
            let rhs = recurse(array_expr)?;
            Ok(TypedExpr::of("bool", lhs.nullable || rhs.nullable))
        }

        Expr::Between {
            expr: tested,
            low,
            high,
            ..
        } => {
            let tested = recurse(tested)?;
            let low = recurse(low)?;
            let high = recurse(high)?;
            Ok(TypedExpr::of(
                "bool",
                tested.nullable || low.nullable || high.nullable,
            ))
        }

        Expr::Like {
            expr: tested,
            pattern,
            ..
        }
        | Expr::ILike {
            expr: tested,
            pattern,
            ..
        }
        | Expr::SimilarTo {
            expr: tested,
            pattern,
            ..
        }
        | Expr::RLike {
            expr: tested,
            pattern,
            ..
        } => {
            let lhs = recurse(tested)?;
            let rhs = recurse(pattern)?;
            Ok(TypedExpr::of("bool", lhs.nullable || rhs.nullable))
        }

        Expr::AnyOp { left, right, .. } | Expr::AllOp { left, right, .. } => {
            let lhs = recurse(left)?;
            if matches!(right.as_ref(), Expr::Subquery(_)) {
                return Ok(TypedExpr::of("bool", true));
            }
            let rhs = recurse(right)?;
            Ok(TypedExpr::of("bool", lhs.nullable || rhs.nullable))
        }

        Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => {
            if let Some(operand) = operand {
                recurse(operand)?;
            }
            let mut branches = Vec::new();
            for when in conditions {
                recurse(&when.condition)?;
                branches.push(recurse(&when.result)?);
            }
            if let Some(else_expr) = else_result {
                branches.push(recurse(else_expr)?);
            }
            let sql_type = branches
                .first()
                .map_or_else(|| "any".to_string(), |b| b.sql_type.clone());
            let nullable = else_result.is_none() || branches.iter().any(|b| b.nullable);
            Ok(TypedExpr {
                branches,
                ..TypedExpr::of(sql_type, nullable)
            })
        }

        Expr::Exists { .. } => Ok(TypedExpr::of("bool", false)),

        // A scalar subquery takes its first column, forced nullable (it may
        // select zero rows).
        Expr::Subquery(query) => {
            let columns = statement::analyze_query(query, scope.clone())?;
            let mut first = columns.into_iter().next().ok_or_else(|| {
                AnalyzeError::Unsupported(format!("subquery with no columns `{}`", snippet(expr)))
            })?;
            first.nullable = true;
            first.name = String::new();
            Ok(first)
        }

        Expr::Array(array) => {
            let mut element = "any".to_string();
            for (index, item) in array.elem.iter().enumerate() {
                let typed = recurse(item)?;
                if index == 0 {
                    element = typed.sql_type;
                }
            }
            Ok(TypedExpr::of(format!("{element}[]"), false))
        }

        Expr::CompoundFieldAccess { root, access_chain } => {
            analyze_subscript(expr, root, access_chain, scope, depth)
        }

        Expr::Function(function) => analyze_function(function, scope, depth),

        Expr::Tuple(items) => {
            let branches: Vec<TypedExpr> =
                items.iter().map(recurse).collect::<Result<_, _>>()?;
            let sql_type = branches
                .first()
                .map_or_else(|| "any".to_string(), |b| b.sql_type.clone());
            let nullable = branches.iter().any(|b| b.nullable);
            Ok(TypedExpr {
                branches,
                ..TypedExpr::of(sql_type, nullable)
            })
        }

        Expr::Interval(_) => Ok(TypedExpr::of("interval", false)),

        Expr::TypedString { data_type, .. } => {
            Ok(TypedExpr::of(normalize_type_name(data_type), false))
        }

        Expr::AtTimeZone { timestamp, .. } => {
            let operand = recurse(timestamp)?;
            let sql_type = if operand.sql_type == "timestamptz" {
                "timestamp"
            } else {
                "timestamptz"
            };
            Ok(TypedExpr::of(sql_type, operand.nullable))
        }

        Expr::Collate { expr: inner, .. } => recurse(inner),

        Expr::Substring {
            expr: inner,
            substring_from,
            substring_for,
            ..
        } => {
            let operand = recurse(inner)?;
            let mut nullable = operand.nullable;
            for bound in [substring_from, substring_for].into_iter().flatten() {
                nullable |= recurse(bound)?.nullable;
            }
            Ok(TypedExpr::of(operand.sql_type, nullable))
        }

        Expr::Trim {
            expr: inner,
            trim_what,
            ..
        } => {
            let operand = recurse(inner)?;
            let mut nullable = operand.nullable;
            if let Some(what) = trim_what {
                nullable |= recurse(what)?.nullable;
            }
            Ok(TypedExpr::of(operand.sql_type, nullable))
        }

        Expr::Position { expr: needle, r#in } => {
            let lhs = recurse(needle)?;
            let rhs = recurse(r#in)?;
            Ok(TypedExpr::of("int4", lhs.nullable || rhs.nullable))
        }

        Expr::Extract { expr: inner, .. } => {
            let operand = recurse(inner)?;
            Ok(TypedExpr::of("numeric", operand.nullable))
        }

        Expr::Ceil { expr: inner, .. } | Expr::Floor { expr: inner, .. } => {
            let operand = recurse(inner)?;
            Ok(TypedExpr::of(operand.sql_type, operand.nullable))
        }

        other => Err(AnalyzeError::Unsupported(format!(
            "expression `{}`",
            snippet(other)
        ))),
    }
}

/// Type a literal value.
fn constant_type(value: &Value) -> TypedExpr {
    match value {
        Value::Number(text, _) => {
            let tag = if text.contains(['.', 'e', 'E']) {
                "float4"
            } else {
                "int4"
            };
            TypedExpr::constant(tag, text.clone())
        }
        Value::SingleQuotedString(text)
        | Value::EscapedStringLiteral(text)
        | Value::DoubleQuotedString(text) => TypedExpr::constant("text", format!("\"{text}\"")),
        Value::DollarQuotedString(dollar) => {
            TypedExpr::constant("text", format!("\"{}\"", dollar.value))
        }
        Value::Boolean(flag) => TypedExpr::constant("bool", flag.to_string()),
        Value::Null => TypedExpr::null(),
        // Query parameters ($1, …) are untyped from the source alone.
        Value::Placeholder(_) => TypedExpr::of("any", true),
        _ => TypedExpr::of("any", false),
    }
}

/// Retype an analyzed expression under a cast.
fn apply_cast(mut inner: TypedExpr, target: &str, scope: &Scope) -> TypedExpr {
    let types = scope.types();
    // `'t'::bool` / `'f'::bool` are how boolean literals round-trip through
    // deparsed SQL; rewrite them to the boolean constants.
    if target == "bool" {
        if let Some(constant) = inner.constant.as_deref() {
            if constant == "\"t\"" || constant == "\"f\"" {
                let mut rewritten = TypedExpr::constant("bool", (constant == "\"t\"").to_string());
                rewritten.nullable = inner.nullable;
                rewritten.name = inner.name;
                return rewritten;
            }
        }
    }
    // A constant survives a cast only within its own family; `'42'::int4` is
    // no longer the literal string.
    if let Some(constant) = inner.constant.as_deref() {
        let compatible = if constant.starts_with('"') {
            types.is_text(target)
        } else if constant == "true" || constant == "false" {
            target == "bool"
        } else {
            types.is_number(target)
        };
        if !compatible {
            inner.constant = None;
        }
    }
    inner.sql_type = target.to_string();
    inner.branches = Vec::new();
    inner
}

/// Array subscripting: one `[i]` yields the element type (out-of-range reads
/// are NULL); one `[lo:hi]` keeps the array type; anything deeper is
/// unsupported.
fn analyze_subscript(
    whole: &Expr,
    root: &Expr,
    access_chain: &[AccessExpr],
    scope: &Scope,
    depth: u32,
) -> Result<TypedExpr, AnalyzeError> {
    let types = scope.types();
    let base = analyze_expr_depth(root, scope, depth + 1)?;

    let [access] = access_chain else {
        return Err(AnalyzeError::Unsupported(format!(
            "multi-dimensional subscript `{}`",
            snippet(whole)
        )));
    };

    match access {
        AccessExpr::Subscript(Subscript::Index { index }) => {
            analyze_expr_depth(index, scope, depth + 1)?;
            if types.is_json(&base.sql_type) {
                return Ok(TypedExpr::of("any", true));
            }
            let element = types
                .element_type(&base.sql_type)
                .unwrap_or("any")
                .to_string();
            Ok(TypedExpr::of(element, true))
        }
        AccessExpr::Subscript(Subscript::Slice {
            lower_bound,
            upper_bound,
            ..
        }) => {
            let mut nullable = base.nullable;
            for bound in [lower_bound, upper_bound].into_iter().flatten() {
                nullable |= analyze_expr_depth(bound, scope, depth + 1)?.nullable;
            }
            if types.is_json(&base.sql_type) {
                return Ok(TypedExpr::of("any", true));
            }
            Ok(TypedExpr::of(base.sql_type, nullable))
        }
        AccessExpr::Dot(_) => Err(AnalyzeError::Unsupported(format!(
            "field access `{}`",
            snippet(whole)
        ))),
    }
}

/// Type a function or window-function call through the function catalog.
fn analyze_function(
    function: &Function,
    scope: &Scope,
    depth: u32,
) -> Result<TypedExpr, AnalyzeError> {
    let name = object_name_parts(&function.name)
        .last()
        .cloned()
        .unwrap_or_default();

    // `ARRAY(SELECT …)` builds an array from the subquery's first column.
    if let FunctionArguments::Subquery(query) = &function.args {
        if name == "array" {
            let columns = statement::analyze_query(query, scope.clone())?;
            let element = columns
                .first()
                .map_or_else(|| "any".to_string(), |c| c.sql_type.clone());
            return Ok(TypedExpr::of(format!("{element}[]"), false));
        }
        return Ok(TypedExpr::of("any", true));
    }

    let arg_exprs = function_args(function);

    let Some(rule) = functions::function_rule(&name) else {
        // Analyze arguments anyway so resolution errors surface.
        for arg in &arg_exprs {
            analyze_expr_depth(arg, scope, depth + 1)?;
        }
        return Ok(TypedExpr::of("any", true));
    };

    if rule == FunctionRule::Coalesce {
        // Arguments after the first provably non-nullable one are
        // unreachable for the type.
        let mut branches = Vec::new();
        let mut all_nullable = true;
        for arg in &arg_exprs {
            let typed = analyze_expr_depth(arg, scope, depth + 1)?;
            let stop = !typed.nullable;
            branches.push(typed);
            if stop {
                all_nullable = false;
                break;
            }
        }
        let sql_type = branches
            .first()
            .map_or_else(|| "any".to_string(), |b| b.sql_type.clone());
        return Ok(TypedExpr {
            branches,
            ..TypedExpr::of(sql_type, all_nullable)
        });
    }

    let args: Vec<TypedExpr> = arg_exprs
        .iter()
        .map(|arg| analyze_expr_depth(arg, scope, depth + 1))
        .collect::<Result<_, _>>()?;
    Ok(functions::apply_rule(rule, &args))
}

/// The positional expression arguments of a call, skipping wildcards
/// (`count(*)` has none).
fn function_args(function: &Function) -> Vec<&Expr> {
    match &function.args {
        FunctionArguments::List(list) => list
            .args
            .iter()
            .filter_map(|arg| match arg {
                FunctionArg::Unnamed(FunctionArgExpr::Expr(expr))
                | FunctionArg::Named {
                    arg: FunctionArgExpr::Expr(expr),
                    ..
                }
                | FunctionArg::ExprNamed {
                    arg: FunctionArgExpr::Expr(expr),
                    ..
                } => Some(expr),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
