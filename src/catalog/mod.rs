/// Column, table, schema, and enum catalogs introspected from the database.
pub mod schema;
/// SQL type tag → `TypeScript` type mapping and type-family predicates.
pub mod type_map;
