use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single column as declared in the database or synthesized from a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// `PostgreSQL` type tag (`int4`, `text`, `mpaa_rating`, `int4[]`, …).
    pub sql_type: String,
    /// Whether the column may hold NULL.
    pub nullable: bool,
}

/// An ordered set of columns, plus whether the whole row may be absent.
///
/// `nullable = true` means the row comes from the optional side of an outer
/// join; every column flattened into scope from such a table is nullable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Table {
    /// Columns in declaration order.
    pub columns: IndexMap<String, Column>,
    /// True when the entire row may be absent.
    pub nullable: bool,
}

impl Table {
    /// An empty, non-nullable table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, replacing any previous column of the same name.
    pub fn insert_column(&mut self, name: &str, sql_type: &str, nullable: bool) {
        self.columns.insert(
            name.to_string(),
            Column {
                sql_type: sql_type.to_string(),
                nullable,
            },
        );
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// A copy of this table with the row and every column forced nullable.
    pub fn as_nullable(&self) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|(name, column)| {
                (
                    name.clone(),
                    Column {
                        sql_type: column.sql_type.clone(),
                        nullable: true,
                    },
                )
            })
            .collect();
        Table {
            columns,
            nullable: true,
        }
    }
}

/// All relations visible to analysis, keyed by schema then relation name.
///
/// Built once at startup and immutable afterwards; analyses share it by
/// reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCatalog {
    schemas: IndexMap<String, IndexMap<String, Table>>,
    default_schema: String,
}

impl SchemaCatalog {
    /// An empty catalog. The default schema is always present, even if empty.
    pub fn new(default_schema: &str) -> Self {
        let mut schemas = IndexMap::new();
        schemas.insert(default_schema.to_string(), IndexMap::new());
        SchemaCatalog {
            schemas,
            default_schema: default_schema.to_string(),
        }
    }

    /// The schema consulted for unqualified relation references.
    pub fn default_schema(&self) -> &str {
        &self.default_schema
    }

    /// Insert (or replace) a relation.
    pub fn insert_table(&mut self, schema: &str, name: &str, table: Table) {
        self.schemas
            .entry(schema.to_string())
            .or_default()
            .insert(name.to_string(), table);
    }

    /// Append one column to a relation, creating the relation if needed.
    pub fn add_column(
        &mut self,
        schema: &str,
        table: &str,
        column: &str,
        sql_type: &str,
        nullable: bool,
    ) {
        self.schemas
            .entry(schema.to_string())
            .or_default()
            .entry(table.to_string())
            .or_default()
            .insert_column(column, sql_type, nullable);
    }

    /// Look up a relation; `None` schema means the default schema.
    pub fn table(&self, schema: Option<&str>, name: &str) -> Option<&Table> {
        let schema = schema.unwrap_or(&self.default_schema);
        self.schemas.get(schema)?.get(name)
    }

    /// Number of relations across all schemas.
    pub fn number_of_tables(&self) -> usize {
        self.schemas.values().map(IndexMap::len).sum()
    }
}

/// Enum type labels in declared order, keyed by type name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnumCatalog {
    enums: IndexMap<String, Vec<String>>,
}

impl EnumCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one label to an enum type, creating the type if needed.
    pub fn add_label(&mut self, type_name: &str, label: &str) {
        self.enums
            .entry(type_name.to_string())
            .or_default()
            .push(label.to_string());
    }

    /// The labels of an enum type, in declared order.
    pub fn labels(&self, type_name: &str) -> Option<&[String]> {
        self.enums.get(type_name).map(Vec::as_slice)
    }

    /// Number of enum types.
    pub fn len(&self) -> usize {
        self.enums.len()
    }

    /// True when no enum types are known.
    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_nullable_forces_every_column() {
        let mut table = Table::new();
        table.insert_column("id", "int4", false);
        table.insert_column("note", "text", true);

        let lifted = table.as_nullable();
        assert!(lifted.nullable);
        assert!(lifted.columns.values().all(|c| c.nullable));
        // The original is untouched.
        assert!(!table.nullable);
        assert!(!table.column("id").unwrap().nullable);
    }

    #[test]
    fn default_schema_is_present_even_when_empty() {
        let catalog = SchemaCatalog::new("public");
        assert_eq!(catalog.default_schema(), "public");
        assert_eq!(catalog.number_of_tables(), 0);
        assert!(catalog.table(None, "missing").is_none());
    }

    #[test]
    fn table_lookup_honors_explicit_schema() {
        let mut catalog = SchemaCatalog::new("public");
        catalog.add_column("app", "docs", "id", "int4", false);

        assert!(catalog.table(Some("app"), "docs").is_some());
        assert!(catalog.table(None, "docs").is_none());
    }

    #[test]
    fn enum_labels_keep_declared_order() {
        let mut enums = EnumCatalog::new();
        for label in ["G", "PG", "PG-13", "R", "NC-17"] {
            enums.add_label("mpaa_rating", label);
        }
        assert_eq!(
            enums.labels("mpaa_rating").unwrap(),
            ["G", "PG", "PG-13", "R", "NC-17"]
        );
    }
}
