//! Pre-analysis of view definitions so views are queryable like base tables.

use log::debug;
use thiserror::Error;

use crate::analyzer::error::AnalyzeError;
use crate::analyzer::scope::Scope;
use crate::analyzer::statement::{analyze_statement, columns_to_table};
use crate::catalog::schema::{SchemaCatalog, Table};
use crate::catalog::type_map::TypeCatalog;
use crate::parser::parse_queries;

/// A view or materialized view definition awaiting analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDef {
    /// Schema the view lives in.
    pub schema: String,
    /// View name.
    pub name: String,
    /// The defining SELECT statement.
    pub sql: String,
}

/// A view whose definition failed to analyze.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("view `{name}`: {source}")]
pub struct ViewError {
    /// Schema-qualified view name.
    pub name: String,
    /// The underlying analysis failure.
    pub source: AnalyzeError,
}

/// Analyze each definition in order against the growing catalog and install
/// the result columns as that view's table.
///
/// A view may reference base tables and previously materialized views only; a
/// forward or cyclic reference fails with the name of the view that could not
/// be analyzed.
pub fn materialize_views(
    catalog: &mut SchemaCatalog,
    types: &TypeCatalog,
    views: &[ViewDef],
) -> Result<(), ViewError> {
    for view in views {
        debug!("materializing view {}.{}", view.schema, view.name);
        let table = analyze_view(catalog, types, view).map_err(|source| ViewError {
            name: format!("{}.{}", view.schema, view.name),
            source,
        })?;
        catalog.insert_table(&view.schema, &view.name, table);
    }
    Ok(())
}

fn analyze_view(
    catalog: &SchemaCatalog,
    types: &TypeCatalog,
    view: &ViewDef,
) -> Result<Table, AnalyzeError> {
    let statements = parse_queries(&view.sql)?;
    let statement = statements
        .first()
        .ok_or_else(|| AnalyzeError::Parse("empty view definition".to_string()))?;
    let scope = Scope::new(catalog, types);
    let columns = analyze_statement(statement, &scope)?;
    Ok(columns_to_table(&columns))
}
