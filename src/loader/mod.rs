//! Schema, view, and enum introspection over a live `PostgreSQL` connection.
//!
//! Three queries run once at startup; everything is cast to `text`/`bool` on
//! the server so row decoding stays uniform. System schemas are excluded.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text};
use log::info;
use thiserror::Error;

use crate::analyzer::views::ViewDef;
use crate::catalog::schema::{EnumCatalog, SchemaCatalog};

/// Catalogs and view definitions loaded from the database at startup.
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    /// Base-table catalog; views are added by materialization.
    pub schema: SchemaCatalog,
    /// Enum type labels in declared order.
    pub enums: EnumCatalog,
    /// View and materialized-view definitions in catalog order.
    pub views: Vec<ViewDef>,
}

/// Introspection failures.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Could not establish the connection.
    #[error("connection failed: {0}")]
    Connection(#[from] diesel::result::ConnectionError),
    /// An introspection query failed.
    #[error("introspection query failed: {0}")]
    Query(#[from] diesel::result::Error),
}

const COLUMNS_SQL: &str = "
SELECT c.table_schema::text AS table_schema,
       c.table_name::text AS table_name,
       c.column_name::text AS column_name,
       CASE WHEN c.data_type = 'ARRAY'
            THEN ltrim(c.udt_name, '_') || '[]'
            ELSE c.udt_name::text
       END AS sql_type,
       (c.is_nullable = 'YES') AS nullable
FROM information_schema.columns c
JOIN information_schema.tables t
  ON t.table_schema = c.table_schema AND t.table_name = c.table_name
WHERE t.table_type = 'BASE TABLE'
  AND c.table_schema NOT IN ('pg_catalog', 'information_schema')
ORDER BY c.table_schema, c.table_name, c.ordinal_position
";

const VIEWS_SQL: &str = "
SELECT schemaname::text AS view_schema, viewname::text AS view_name,
       definition::text AS definition
FROM pg_catalog.pg_views
WHERE schemaname NOT IN ('pg_catalog', 'information_schema')
UNION ALL
SELECT schemaname::text, matviewname::text, definition::text
FROM pg_catalog.pg_matviews
WHERE schemaname NOT IN ('pg_catalog', 'information_schema')
ORDER BY 1, 2
";

const ENUMS_SQL: &str = "
SELECT t.typname::text AS type_name, e.enumlabel::text AS label
FROM pg_catalog.pg_type t
JOIN pg_catalog.pg_enum e ON e.enumtypid = t.oid
ORDER BY t.typname, e.enumsortorder
";

#[derive(QueryableByName)]
struct ColumnRow {
    #[diesel(sql_type = Text)]
    table_schema: String,
    #[diesel(sql_type = Text)]
    table_name: String,
    #[diesel(sql_type = Text)]
    column_name: String,
    #[diesel(sql_type = Text)]
    sql_type: String,
    #[diesel(sql_type = Bool)]
    nullable: bool,
}

#[derive(QueryableByName)]
struct ViewRow {
    #[diesel(sql_type = Text)]
    view_schema: String,
    #[diesel(sql_type = Text)]
    view_name: String,
    #[diesel(sql_type = Text)]
    definition: String,
}

#[derive(QueryableByName)]
struct EnumRow {
    #[diesel(sql_type = Text)]
    type_name: String,
    #[diesel(sql_type = Text)]
    label: String,
}

/// Run the three introspection queries and assemble the catalogs.
pub fn load_schema(database_url: &str, default_schema: &str) -> Result<LoadedSchema, SchemaError> {
    let mut conn = PgConnection::establish(database_url)?;

    let mut schema = SchemaCatalog::new(default_schema);
    let column_rows: Vec<ColumnRow> = diesel::sql_query(COLUMNS_SQL).load(&mut conn)?;
    for row in &column_rows {
        schema.add_column(
            &row.table_schema,
            &row.table_name,
            &row.column_name,
            &row.sql_type,
            row.nullable,
        );
    }

    let mut enums = EnumCatalog::new();
    let enum_rows: Vec<EnumRow> = diesel::sql_query(ENUMS_SQL).load(&mut conn)?;
    for row in &enum_rows {
        enums.add_label(&row.type_name, &row.label);
    }

    let view_rows: Vec<ViewRow> = diesel::sql_query(VIEWS_SQL).load(&mut conn)?;
    let views = view_rows
        .into_iter()
        .map(|row| ViewDef {
            schema: row.view_schema,
            name: row.view_name,
            sql: row.definition,
        })
        .collect::<Vec<_>>();

    info!(
        "loaded {} tables, {} enum types, {} views",
        schema.number_of_tables(),
        enums.len(),
        views.len()
    );
    Ok(LoadedSchema {
        schema,
        enums,
        views,
    })
}
