//! The driver: build catalogs once, then type queries against them.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use sqlparser::ast::Statement;

use crate::analyzer::error::AnalyzeError;
use crate::analyzer::scope::Scope;
use crate::analyzer::statement::analyze_statement;
use crate::analyzer::views::{materialize_views, ViewDef, ViewError};
use crate::catalog::schema::{EnumCatalog, SchemaCatalog};
use crate::catalog::type_map::TypeCatalog;
use crate::output::formatter::{default_column_formatter, ColumnFormatter, Formatter};
use crate::parser::parse_queries;

/// Configuration for a [`Generator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Schema consulted for unqualified table references.
    #[serde(default = "default_schema")]
    pub default_schema: String,
    /// `TypeScript` type used for SQL tags outside every known family.
    #[serde(default = "default_fallback_type")]
    pub fallback_type: String,
    /// SQL tag → `TypeScript` type overrides; win over all defaults.
    #[serde(default)]
    pub type_overrides: IndexMap<String, String>,
    /// Render one column per line instead of a single line.
    #[serde(default)]
    pub pretty: bool,
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_fallback_type() -> String {
    "string".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            default_schema: default_schema(),
            fallback_type: default_fallback_type(),
            type_overrides: IndexMap::new(),
            pretty: false,
        }
    }
}

/// Failures while constructing a [`Generator`] from a live database.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Schema introspection failed.
    #[cfg(feature = "db")]
    #[error(transparent)]
    Schema(#[from] crate::loader::SchemaError),
    /// A view definition failed to analyze.
    #[error(transparent)]
    View(#[from] ViewError),
}

/// Generates `TypeScript` result types for SQL queries.
///
/// Catalogs are built once at construction; [`Generator::generate`] is pure
/// and holds no connection.
pub struct Generator {
    schema: SchemaCatalog,
    types: TypeCatalog,
    column_formatter: ColumnFormatter,
    pretty: bool,
}

impl Generator {
    /// Build a generator from already-loaded catalogs.
    pub fn from_catalogs(
        schema: SchemaCatalog,
        enums: EnumCatalog,
        config: &GeneratorConfig,
    ) -> Self {
        let mut types = TypeCatalog::new(&config.fallback_type, enums);
        types.set_overrides(config.type_overrides.clone());
        Generator {
            schema,
            types,
            column_formatter: default_column_formatter,
            pretty: config.pretty,
        }
    }

    /// Introspect a live database, materialize its views, and build a
    /// generator. The connection is released before this returns.
    #[cfg(feature = "db")]
    pub fn connect(database_url: &str, config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let loaded = crate::loader::load_schema(database_url, &config.default_schema)?;
        let mut generator = Self::from_catalogs(loaded.schema, loaded.enums, config);
        materialize_views(&mut generator.schema, &generator.types, &loaded.views)?;
        Ok(generator)
    }

    /// Analyze view definitions against the current catalog and install them
    /// as queryable relations.
    pub fn materialize(&mut self, views: &[ViewDef]) -> Result<(), ViewError> {
        materialize_views(&mut self.schema, &self.types, views)
    }

    /// Replace the per-column renderer.
    #[must_use]
    pub fn with_column_formatter(mut self, column_formatter: ColumnFormatter) -> Self {
        self.column_formatter = column_formatter;
        self
    }

    /// The schema catalog (base tables plus materialized views).
    pub fn schema(&self) -> &SchemaCatalog {
        &self.schema
    }

    /// Type every statement in `sql`.
    ///
    /// Each statement yields its own entry; a failure in one statement does
    /// not affect the others. A parse failure covers the whole source string
    /// and yields a single `Err`.
    pub fn generate(&self, sql: &str) -> Vec<Result<String, AnalyzeError>> {
        let statements = match parse_queries(sql) {
            Ok(statements) => statements,
            Err(error) => return vec![Err(error)],
        };
        statements
            .iter()
            .map(|statement| self.generate_statement(statement))
            .collect()
    }

    fn generate_statement(&self, statement: &Statement) -> Result<String, AnalyzeError> {
        let scope = Scope::new(&self.schema, &self.types);
        let columns = analyze_statement(statement, &scope)?;
        debug!("typed {} result columns", columns.len());
        let formatter = Formatter::new(&self.types, self.column_formatter, self.pretty);
        Ok(formatter.render(&columns))
    }
}
