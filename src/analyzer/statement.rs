//! Statement-level analysis: SELECT (plain, set operations, VALUES), CTEs,
//! and the RETURNING clauses of INSERT/UPDATE/DELETE.

use indexmap::IndexMap;
use sqlparser::ast::{
    FromTable, Query, Select, SelectItem, SelectItemQualifiedWildcardKind, SetExpr, Statement,
    TableObject, Values,
};

use crate::analyzer::error::{snippet, AnalyzeError};
use crate::analyzer::expression::analyze_expression;
use crate::analyzer::from_clause;
use crate::analyzer::scope::Scope;
use crate::analyzer::typed_expr::{ResultColumn, TypedExpr};
use crate::catalog::schema::Table;
use crate::parser::{ident_name, object_name_parts};

/// Analyze one statement into its named result columns.
///
/// Statements without a result (DML without RETURNING) yield an empty list.
pub fn analyze_statement(
    statement: &Statement,
    scope: &Scope,
) -> Result<Vec<ResultColumn>, AnalyzeError> {
    match statement {
        Statement::Query(query) => analyze_query(query, scope.clone()),

        Statement::Insert(insert) => {
            let Some(returning) = &insert.returning else {
                return Ok(Vec::new());
            };
            let TableObject::TableName(name) = &insert.table else {
                return Err(AnalyzeError::Unsupported(format!(
                    "INSERT target `{}`",
                    insert.table
                )));
            };
            let mut scope = scope.clone();
            let (alias, table) = resolve_target_relation(&scope, name)?;
            let alias = insert
                .table_alias
                .as_ref()
                .map_or(alias, |ident| ident_name(ident));
            scope.add_table(alias, table, false);
            analyze_targets(returning, &scope)
        }

        Statement::Update {
            table, returning, ..
        } => {
            let Some(returning) = returning else {
                return Ok(Vec::new());
            };
            let scope = from_clause::analyze_from(std::slice::from_ref(table), scope)?;
            analyze_targets(returning, &scope)
        }

        Statement::Delete(delete) => {
            let Some(returning) = &delete.returning else {
                return Ok(Vec::new());
            };
            let tables = match &delete.from {
                FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
            };
            let scope = from_clause::analyze_from(tables, scope)?;
            analyze_targets(returning, &scope)
        }

        other => Err(AnalyzeError::Unsupported(format!(
            "statement `{}`",
            snippet(other)
        ))),
    }
}

/// Analyze a query: WITH clause first (each CTE in a clone of the scope so
/// earlier CTEs are visible to later ones and nothing leaks outward), then
/// the body.
pub fn analyze_query(query: &Query, mut scope: Scope) -> Result<Vec<ResultColumn>, AnalyzeError> {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            let columns = analyze_query(&cte.query, scope.clone())?;
            let mut table = columns_to_table(&columns);
            rename_cte_columns(&mut table, cte);
            scope.add_cte(ident_name(&cte.alias.name), table);
        }
    }
    analyze_set_expr(&query.body, &scope)
}

fn analyze_set_expr(body: &SetExpr, scope: &Scope) -> Result<Vec<ResultColumn>, AnalyzeError> {
    match body {
        SetExpr::Select(select) => analyze_select(select, scope),
        SetExpr::Query(inner) => analyze_query(inner, scope.clone()),
        SetExpr::Values(values) => analyze_values(values, scope),
        SetExpr::SetOperation { left, right, .. } => {
            let left = analyze_set_expr(left, scope)?;
            let right = analyze_set_expr(right, scope)?;
            merge_set_operation(left, right)
        }
        other => Err(AnalyzeError::Unsupported(format!(
            "query body `{}`",
            snippet(other)
        ))),
    }
}

/// Combine the two arms of a set operation column by column.
///
/// Name and type come from the left arm; nullability is the OR of both.
/// Nested set operations are flattened so every original operand query
/// contributes exactly one variant per column.
fn merge_set_operation(
    left: Vec<ResultColumn>,
    right: Vec<ResultColumn>,
) -> Result<Vec<ResultColumn>, AnalyzeError> {
    if left.len() != right.len() {
        return Err(AnalyzeError::Unsupported(format!(
            "set operation arms project {} and {} columns",
            left.len(),
            right.len()
        )));
    }

    let merged = left
        .into_iter()
        .zip(right)
        .map(|(l, r)| {
            let mut variants = Vec::new();
            for column in [&l, &r] {
                if column.set_variants.is_empty() {
                    let mut variant = column.clone();
                    variant.name = String::new();
                    variants.push(variant);
                } else {
                    variants.extend(column.set_variants.iter().cloned());
                }
            }
            ResultColumn {
                sql_type: l.sql_type.clone(),
                nullable: l.nullable || r.nullable,
                name: l.name.clone(),
                constant: l.constant.clone(),
                branches: l.branches.clone(),
                set_variants: variants,
            }
        })
        .collect();
    Ok(merged)
}

fn analyze_select(select: &Select, scope: &Scope) -> Result<Vec<ResultColumn>, AnalyzeError> {
    let scope = from_clause::analyze_from(&select.from, scope)?;
    analyze_targets(&select.projection, &scope)
}

/// Columns of a VALUES list are `column1`, `column2`, …; each collects every
/// row's value as a branch.
fn analyze_values(values: &Values, scope: &Scope) -> Result<Vec<ResultColumn>, AnalyzeError> {
    let width = values.rows.first().map_or(0, Vec::len);
    let mut columns = Vec::with_capacity(width);
    for index in 0..width {
        let mut branches = Vec::new();
        for row in &values.rows {
            if let Some(value) = row.get(index) {
                branches.push(analyze_expression(value, scope)?);
            }
        }
        let sql_type = branches
            .first()
            .map_or_else(|| "any".to_string(), |b| b.sql_type.clone());
        let nullable = branches.iter().any(|b| b.nullable);
        columns.push(ResultColumn {
            name: format!("column{}", index + 1),
            branches,
            ..TypedExpr::of(sql_type, nullable)
        });
    }
    Ok(columns)
}

/// Analyze a target list (projection or RETURNING), expanding stars.
///
/// Output names key an ordered map: a later duplicate overwrites the earlier
/// value but keeps its position.
pub(crate) fn analyze_targets(
    items: &[SelectItem],
    scope: &Scope,
) -> Result<Vec<ResultColumn>, AnalyzeError> {
    let mut output: IndexMap<String, TypedExpr> = IndexMap::new();

    for item in items {
        match item {
            SelectItem::Wildcard(_) => {
                for (_, table) in scope.tables() {
                    expand_star(&mut output, table);
                }
            }

            SelectItem::QualifiedWildcard(kind, _) => match kind {
                SelectItemQualifiedWildcardKind::ObjectName(name) => {
                    let parts = object_name_parts(name);
                    let alias = parts.join(".");
                    let table = scope
                        .table(&alias)
                        .ok_or_else(|| AnalyzeError::UnknownTable(alias.clone()))?;
                    expand_star(&mut output, table);
                }
                SelectItemQualifiedWildcardKind::Expr(inner) => {
                    return Err(AnalyzeError::Unsupported(format!(
                        "wildcard on expression `{}`",
                        snippet(inner)
                    )));
                }
            },

            SelectItem::UnnamedExpr(expr) => {
                let typed = analyze_expression(expr, scope)?;
                if typed.name.is_empty() {
                    return Err(AnalyzeError::MissingAlias(snippet(expr)));
                }
                output.insert(typed.name.clone(), typed);
            }

            SelectItem::ExprWithAlias { expr, alias } => {
                let mut typed = analyze_expression(expr, scope)?;
                typed.name = ident_name(alias);
                output.insert(typed.name.clone(), typed);
            }
        }
    }

    Ok(output.into_values().collect())
}

/// Expand one table's columns into the output map, preserving declared order
/// and join-lifted nullability.
fn expand_star(output: &mut IndexMap<String, TypedExpr>, table: &Table) {
    for (name, column) in &table.columns {
        let nullable = column.nullable || table.nullable;
        output.insert(
            name.clone(),
            TypedExpr {
                name: name.clone(),
                ..TypedExpr::of(column.sql_type.clone(), nullable)
            },
        );
    }
}

/// Collapse result columns into a synthetic table (for CTEs, derived tables,
/// and view materialization).
pub(crate) fn columns_to_table(columns: &[ResultColumn]) -> Table {
    let mut table = Table::new();
    for column in columns {
        table.insert_column(&column.name, &column.sql_type, column.nullable);
    }
    table
}

/// Apply a CTE's explicit column-name list positionally.
fn rename_cte_columns(table: &mut Table, cte: &sqlparser::ast::Cte) {
    if cte.alias.columns.is_empty() {
        return;
    }
    let renamed = table
        .columns
        .iter()
        .enumerate()
        .map(|(index, (name, column))| {
            let new_name = cte
                .alias
                .columns
                .get(index)
                .map_or_else(|| name.clone(), |def| ident_name(&def.name));
            (new_name, column.clone())
        })
        .collect();
    table.columns = renamed;
}

/// Resolve a DML target relation name to `(default alias, table)`.
fn resolve_target_relation(
    scope: &Scope,
    name: &sqlparser::ast::ObjectName,
) -> Result<(String, Table), AnalyzeError> {
    let parts = object_name_parts(name);
    let (schema, relation) = match parts.as_slice() {
        [relation] => (None, relation.clone()),
        [schema, relation] => (Some(schema.clone()), relation.clone()),
        _ => return Err(AnalyzeError::UnknownTable(parts.join("."))),
    };
    let table = scope
        .resolve_relation(schema.as_deref(), &relation)
        .ok_or_else(|| AnalyzeError::UnknownTable(parts.join(".")))?;
    Ok((relation, table))
}
