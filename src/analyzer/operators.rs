//! Result-type rules for binary and unary operators.
//!
//! Dispatch is on the operator's textual name, so built-in symbols and custom
//! operators (`&&`, `&<`, `-|-`, …) share one table.

use sqlparser::ast::{BinaryOperator, UnaryOperator};

use crate::analyzer::error::AnalyzeError;
use crate::analyzer::typed_expr::TypedExpr;
use crate::catalog::type_map::TypeCatalog;

/// Operators that compare or test their operands.
const BOOL_OPS: &[&str] = &[
    "=", "<", ">", "<=", ">=", "<>", "!=", "@>", "<@", "?", "?|", "?&", "@?", "@@", "&&", "&<",
    "&>", "-|-", "~*", "!~", "!~*", "~~", "~~*", "!~~", "!~~*", "^@",
];

/// Operators typed by their left operand.
const LEFT_OPS: &[&str] = &["&", "|", "#", "->", "#>", "#-"];

/// Math operators typed by their right operand.
const MATH_OPS: &[&str] = &["%", "^", "|/", "||/", "@"];

/// The textual name of a binary operator as `PostgreSQL` spells it.
pub(crate) fn binary_symbol(op: &BinaryOperator) -> Option<String> {
    let symbol = match op {
        BinaryOperator::Plus => "+",
        BinaryOperator::Minus => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Modulo => "%",
        BinaryOperator::StringConcat => "||",
        BinaryOperator::Gt => ">",
        BinaryOperator::Lt => "<",
        BinaryOperator::GtEq => ">=",
        BinaryOperator::LtEq => "<=",
        BinaryOperator::Eq => "=",
        BinaryOperator::NotEq => "<>",
        BinaryOperator::BitwiseOr => "|",
        BinaryOperator::BitwiseAnd => "&",
        BinaryOperator::PGBitwiseXor => "#",
        BinaryOperator::PGBitwiseShiftLeft => "<<",
        BinaryOperator::PGBitwiseShiftRight => ">>",
        BinaryOperator::PGExp => "^",
        BinaryOperator::PGRegexMatch => "~",
        BinaryOperator::PGRegexIMatch => "~*",
        BinaryOperator::PGRegexNotMatch => "!~",
        BinaryOperator::PGRegexNotIMatch => "!~*",
        BinaryOperator::PGLikeMatch => "~~",
        BinaryOperator::PGILikeMatch => "~~*",
        BinaryOperator::PGNotLikeMatch => "!~~",
        BinaryOperator::PGNotILikeMatch => "!~~*",
        BinaryOperator::PGStartsWith => "^@",
        BinaryOperator::Arrow => "->",
        BinaryOperator::LongArrow => "->>",
        BinaryOperator::HashArrow => "#>",
        BinaryOperator::HashLongArrow => "#>>",
        BinaryOperator::AtArrow => "@>",
        BinaryOperator::ArrowAt => "<@",
        BinaryOperator::HashMinus => "#-",
        BinaryOperator::AtQuestion => "@?",
        BinaryOperator::AtAt => "@@",
        BinaryOperator::Question => "?",
        BinaryOperator::QuestionAnd => "?&",
        BinaryOperator::QuestionPipe => "?|",
        BinaryOperator::Custom(symbol) => return Some(symbol.clone()),
        BinaryOperator::PGCustomBinaryOperator(parts) => return parts.last().cloned(),
        _ => return None,
    };
    Some(symbol.to_string())
}

/// Compute the result type of `lhs <op> rhs`.
pub(crate) fn binary_result(
    op: &str,
    lhs: &TypedExpr,
    rhs: &TypedExpr,
    types: &TypeCatalog,
) -> Result<String, AnalyzeError> {
    let l = lhs.sql_type.as_str();
    let r = rhs.sql_type.as_str();

    let result = match op {
        "+" => {
            if (types.is_date(l) && types.is_number(r)) || (types.is_number(l) && types.is_date(r))
            {
                "date".to_string()
            } else if (types.is_date(l) && (types.is_time(r) || r == "interval"))
                || (types.is_date(r) && (types.is_time(l) || l == "interval"))
            {
                "timestamp".to_string()
            } else if l == "interval" && (types.is_time(r) || types.is_timestamp(r)) {
                r.to_string()
            } else if r == "interval" && (types.is_time(l) || types.is_timestamp(l)) {
                l.to_string()
            } else {
                r.to_string()
            }
        }
        "-" => {
            if types.is_json(l) {
                l.to_string()
            } else if types.is_date(l) && types.is_date(r) {
                "int4".to_string()
            } else if types.is_date(l) && types.is_number(r) {
                "date".to_string()
            } else if types.is_date(l) && r == "interval" {
                "timestamp".to_string()
            } else if types.is_time(l) && types.is_time(r) {
                "interval".to_string()
            } else if (types.is_time(l) || types.is_timestamp(l)) && r == "interval" {
                l.to_string()
            } else if types.is_timestamp(l) && types.is_timestamp(r) {
                "interval".to_string()
            } else {
                r.to_string()
            }
        }
        "*" => {
            if (l == "interval" && types.is_number(r)) || (types.is_number(l) && r == "interval") {
                "interval".to_string()
            } else {
                r.to_string()
            }
        }
        "/" => {
            if l == "interval" && types.is_number(r) {
                "interval".to_string()
            } else {
                r.to_string()
            }
        }
        "<<" | ">>" => {
            if types.is_number(r) {
                l.to_string()
            } else {
                "bool".to_string()
            }
        }
        "~" => {
            if types.is_number(r) || types.is_bit(r) {
                r.to_string()
            } else {
                "bool".to_string()
            }
        }
        "||" => {
            if types.is_array(l) {
                l.to_string()
            } else if types.is_array(r) {
                r.to_string()
            } else if types.is_text(l) || types.is_text(r) {
                "text".to_string()
            } else {
                r.to_string()
            }
        }
        "->>" | "#>>" => "text".to_string(),
        op if BOOL_OPS.contains(&op) => "bool".to_string(),
        op if LEFT_OPS.contains(&op) => l.to_string(),
        op if MATH_OPS.contains(&op) => r.to_string(),
        other => {
            return Err(AnalyzeError::Unsupported(format!("operator `{other}`")));
        }
    };
    Ok(result)
}

/// Compute the result of a unary operator applied to `operand`.
pub(crate) fn unary_result(
    op: &UnaryOperator,
    operand: &TypedExpr,
    types: &TypeCatalog,
) -> Result<TypedExpr, AnalyzeError> {
    let tag = operand.sql_type.as_str();
    let result = match op {
        UnaryOperator::Not => TypedExpr::of("bool", operand.nullable),
        UnaryOperator::Plus => {
            let mut kept = TypedExpr::of(tag, operand.nullable);
            kept.constant = operand.constant.clone();
            kept
        }
        UnaryOperator::Minus => {
            let mut negated = TypedExpr::of(tag, operand.nullable);
            // Trivial constant propagation keeps `SELECT -5 x` a literal.
            negated.constant = match operand.constant.as_deref() {
                Some(value) if !value.starts_with('-') => Some(format!("-{value}")),
                _ => None,
            };
            negated
        }
        UnaryOperator::PGBitwiseNot => {
            if types.is_number(tag) || types.is_bit(tag) {
                TypedExpr::of(tag, operand.nullable)
            } else {
                TypedExpr::of("bool", operand.nullable)
            }
        }
        UnaryOperator::PGSquareRoot | UnaryOperator::PGCubeRoot | UnaryOperator::PGAbs => {
            TypedExpr::of(tag, operand.nullable)
        }
        UnaryOperator::PGPostfixFactorial | UnaryOperator::PGPrefixFactorial => {
            TypedExpr::of("numeric", operand.nullable)
        }
        other => {
            return Err(AnalyzeError::Unsupported(format!(
                "unary operator `{other}`"
            )));
        }
    };
    Ok(result)
}
