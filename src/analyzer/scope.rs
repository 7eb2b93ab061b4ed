use indexmap::IndexMap;

use crate::analyzer::error::AnalyzeError;
use crate::catalog::schema::{Column, SchemaCatalog, Table};
use crate::catalog::type_map::TypeCatalog;

/// Name-resolution environment for one statement analysis.
///
/// Visible tables are kept in insertion order; bare column references scan
/// them front to back and the first match wins. CTE relations live on the
/// scope itself, shadowing the default schema, so a clone taken for a
/// subquery or a later CTE sees them without mutating the shared catalog.
#[derive(Debug, Clone)]
pub struct Scope<'a> {
    tables: IndexMap<String, Table>,
    ctes: IndexMap<String, Table>,
    catalog: &'a SchemaCatalog,
    types: &'a TypeCatalog,
}

impl<'a> Scope<'a> {
    /// A scope with no visible tables.
    pub fn new(catalog: &'a SchemaCatalog, types: &'a TypeCatalog) -> Self {
        Scope {
            tables: IndexMap::new(),
            ctes: IndexMap::new(),
            catalog,
            types,
        }
    }

    /// The shared schema catalog.
    pub fn catalog(&self) -> &'a SchemaCatalog {
        self.catalog
    }

    /// The shared type catalog.
    pub fn types(&self) -> &'a TypeCatalog {
        self.types
    }

    /// Bind `table` under `alias`, force-nullifying every column when the
    /// binding comes from the optional side of an outer join.
    pub fn add_table(&mut self, alias: String, table: Table, force_nullable: bool) {
        let table = if force_nullable || table.nullable {
            table.as_nullable()
        } else {
            table
        };
        self.tables.insert(alias, table);
    }

    /// Register a CTE relation in the (cloned) default schema.
    pub fn add_cte(&mut self, name: String, table: Table) {
        self.ctes.insert(name, table);
    }

    /// Resolve a relation reference: CTEs shadow the default schema, the
    /// catalog answers everything else.
    pub fn resolve_relation(&self, schema: Option<&str>, name: &str) -> Option<Table> {
        let in_default = schema.is_none_or(|s| s == self.catalog.default_schema());
        if in_default {
            if let Some(table) = self.ctes.get(name) {
                return Some(table.clone());
            }
        }
        self.catalog.table(schema, name).cloned()
    }

    /// Direct lookup of a visible table by alias.
    pub fn table(&self, alias: &str) -> Option<&Table> {
        self.tables.get(alias)
    }

    /// Visible tables in insertion order.
    pub fn tables(&self) -> impl Iterator<Item = (&String, &Table)> {
        self.tables.iter()
    }

    /// Resolve a bare column across visible tables, first match wins.
    pub fn resolve_column(&self, name: &str) -> Result<Column, AnalyzeError> {
        for table in self.tables.values() {
            if let Some(column) = table.column(name) {
                let mut column = column.clone();
                column.nullable |= table.nullable;
                return Ok(column);
            }
        }
        Err(AnalyzeError::UnknownColumn(name.to_string()))
    }

    /// Resolve a `table.column` reference by direct lookup.
    pub fn resolve_qualified_column(
        &self,
        table: &str,
        column: &str,
    ) -> Result<Column, AnalyzeError> {
        let bound = self
            .table(table)
            .ok_or_else(|| AnalyzeError::UnknownTable(table.to_string()))?;
        let found = bound
            .column(column)
            .ok_or_else(|| AnalyzeError::UnknownColumn(format!("{table}.{column}")))?;
        let mut found = found.clone();
        found.nullable |= bound.nullable;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::EnumCatalog;

    fn fixture_catalog() -> SchemaCatalog {
        let mut catalog = SchemaCatalog::new("public");
        catalog.add_column("public", "customer", "customer_id", "int4", false);
        catalog.add_column("public", "customer", "email", "text", true);
        catalog.add_column("public", "address", "address_id", "int4", false);
        catalog.add_column("public", "address", "customer_id", "int4", false);
        catalog
    }

    #[test]
    fn bare_columns_resolve_first_match_in_insertion_order() {
        let catalog = fixture_catalog();
        let types = TypeCatalog::new("string", EnumCatalog::new());
        let mut scope = Scope::new(&catalog, &types);
        scope.add_table(
            "c".to_string(),
            catalog.table(None, "customer").unwrap().clone(),
            false,
        );
        scope.add_table(
            "a".to_string(),
            catalog.table(None, "address").unwrap().clone(),
            false,
        );

        // `customer_id` exists in both; the first-bound table wins.
        let column = scope.resolve_column("customer_id").unwrap();
        assert_eq!(column.sql_type, "int4");
        assert!(!column.nullable);

        let err = scope.resolve_column("missing").unwrap_err();
        assert_eq!(err, AnalyzeError::UnknownColumn("missing".to_string()));
    }

    #[test]
    fn outer_join_binding_nullifies_every_column() {
        let catalog = fixture_catalog();
        let types = TypeCatalog::new("string", EnumCatalog::new());
        let mut scope = Scope::new(&catalog, &types);
        scope.add_table(
            "a".to_string(),
            catalog.table(None, "address").unwrap().clone(),
            true,
        );

        let column = scope.resolve_qualified_column("a", "address_id").unwrap();
        assert!(column.nullable);
    }

    #[test]
    fn ctes_shadow_the_default_schema() {
        let catalog = fixture_catalog();
        let types = TypeCatalog::new("string", EnumCatalog::new());
        let mut scope = Scope::new(&catalog, &types);
        let mut cte = Table::new();
        cte.insert_column("total", "int8", false);
        scope.add_cte("customer".to_string(), cte);

        let resolved = scope.resolve_relation(None, "customer").unwrap();
        assert!(resolved.column("total").is_some());
        // An explicit non-default schema bypasses CTEs.
        assert!(scope.resolve_relation(Some("other"), "customer").is_none());
    }

    #[test]
    fn qualified_lookup_reports_missing_alias_as_unknown_table() {
        let catalog = fixture_catalog();
        let types = TypeCatalog::new("string", EnumCatalog::new());
        let scope = Scope::new(&catalog, &types);

        let err = scope.resolve_qualified_column("t", "x").unwrap_err();
        assert_eq!(err, AnalyzeError::UnknownTable("t".to_string()));
    }
}
