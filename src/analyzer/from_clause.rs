//! FROM-clause analysis: binding relations into scope and widening
//! nullability across outer joins.

use sqlparser::ast::{JoinOperator, TableAlias, TableFactor, TableWithJoins};

use crate::analyzer::error::{snippet, AnalyzeError};
use crate::analyzer::scope::Scope;
use crate::analyzer::statement;
use crate::catalog::schema::Table;
use crate::parser::{ident_name, object_name_parts};

/// One relation collected from a FROM item: alias, columns, and whether its
/// rows may be absent (optional side of an outer join).
type ScopedRelation = (String, Table, bool);

/// Analyze every FROM item and build the statement's scope on top of `outer`.
///
/// Items are independent of each other (Cartesian product semantics); join
/// nullability widens only within one item's join chain.
pub(crate) fn analyze_from<'a>(
    from: &[TableWithJoins],
    outer: &Scope<'a>,
) -> Result<Scope<'a>, AnalyzeError> {
    let mut relations: Vec<ScopedRelation> = Vec::new();
    for item in from {
        let mut chain = Vec::new();
        collect_table_with_joins(item, outer, &mut chain)?;
        relations.extend(chain);
    }

    let mut scope = outer.clone();
    for (alias, table, nullable) in relations {
        scope.add_table(alias, table, nullable);
    }
    Ok(scope)
}

/// Walk one FROM item's join chain left to right.
///
/// A RIGHT or FULL join marks everything collected so far nullable; a LEFT or
/// FULL join marks its right side nullable.
fn collect_table_with_joins(
    item: &TableWithJoins,
    outer: &Scope,
    chain: &mut Vec<ScopedRelation>,
) -> Result<(), AnalyzeError> {
    collect_relation(&item.relation, outer, false, chain)?;
    for join in &item.joins {
        let (flood_left, right_nullable) = match &join.join_operator {
            JoinOperator::LeftOuter(_) => (false, true),
            JoinOperator::RightOuter(_) => (true, false),
            JoinOperator::FullOuter(_) => (true, true),
            _ => (false, false),
        };
        if flood_left {
            for relation in chain.iter_mut() {
                relation.2 = true;
            }
        }
        collect_relation(&join.relation, outer, right_nullable, chain)?;
    }
    Ok(())
}

fn collect_relation(
    factor: &TableFactor,
    outer: &Scope,
    nullable: bool,
    chain: &mut Vec<ScopedRelation>,
) -> Result<(), AnalyzeError> {
    match factor {
        TableFactor::Table { name, alias, .. } => {
            let parts = object_name_parts(name);
            let (schema, relation) = match parts.as_slice() {
                [relation] => (None, relation.clone()),
                [schema, relation] => (Some(schema.clone()), relation.clone()),
                _ => return Err(AnalyzeError::UnknownTable(parts.join("."))),
            };
            let mut table = outer
                .resolve_relation(schema.as_deref(), &relation)
                .ok_or_else(|| AnalyzeError::UnknownTable(parts.join(".")))?;
            let bound_name = match alias {
                Some(alias) => {
                    apply_alias_columns(&mut table, alias);
                    ident_name(&alias.name)
                }
                None => relation,
            };
            chain.push((bound_name, table, nullable));
            Ok(())
        }

        TableFactor::Derived {
            subquery, alias, ..
        } => {
            let columns = statement::analyze_query(subquery, outer.clone())?;
            let Some(alias) = alias else {
                return Err(AnalyzeError::MissingAlias(snippet(factor)));
            };
            let mut table = statement::columns_to_table(&columns);
            apply_alias_columns(&mut table, alias);
            chain.push((ident_name(&alias.name), table, nullable));
            Ok(())
        }

        TableFactor::NestedJoin {
            table_with_joins, ..
        } => {
            let mut inner = Vec::new();
            collect_table_with_joins(table_with_joins, outer, &mut inner)?;
            if nullable {
                for relation in &mut inner {
                    relation.2 = true;
                }
            }
            chain.extend(inner);
            Ok(())
        }

        other => Err(AnalyzeError::Unsupported(format!(
            "FROM item `{}`",
            snippet(other)
        ))),
    }
}

/// Rename columns positionally per an alias column list (`t AS x(a, b)`).
fn apply_alias_columns(table: &mut Table, alias: &TableAlias) {
    if alias.columns.is_empty() {
        return;
    }
    let renamed = table
        .columns
        .iter()
        .enumerate()
        .map(|(index, (name, column))| {
            let new_name = alias
                .columns
                .get(index)
                .map_or_else(|| name.clone(), |def| ident_name(&def.name));
            (new_name, column.clone())
        })
        .collect();
    table.columns = renamed;
}
