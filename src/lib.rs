//! Generate `TypeScript` result types for `PostgreSQL` queries from a live schema.
#![warn(missing_docs)]

/// SQL semantic analysis: scopes, expression typing, and statement analysis.
pub mod analyzer;
/// Schema, enum, and type catalogs shared by every analysis.
pub mod catalog;
/// The `Generator` driver: load a schema once, then type queries.
pub mod generator;
/// Live-database schema introspection.
#[cfg(feature = "db")]
pub mod loader;
/// Rendering of analyzed result columns into `TypeScript` types.
pub mod output;
/// SQL parsing and identifier helpers.
pub mod parser;
