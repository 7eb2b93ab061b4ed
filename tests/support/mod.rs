#![allow(dead_code)]

use sql2ts::analyzer::error::AnalyzeError;
use sql2ts::catalog::schema::{EnumCatalog, SchemaCatalog};
use sql2ts::generator::{Generator, GeneratorConfig};

/// A film-rental shaped catalog exercising every interesting column kind:
/// nullable and non-null scalars, an enum, and a nullable array.
pub(crate) fn fixture_catalog() -> SchemaCatalog {
    let mut catalog = SchemaCatalog::new("public");

    for (column, sql_type, nullable) in [
        ("customer_id", "int4", false),
        ("store_id", "int2", false),
        ("first_name", "text", false),
        ("last_name", "text", false),
        ("email", "text", true),
        ("address_id", "int2", false),
        ("activebool", "bool", false),
        ("create_date", "date", false),
        ("last_update", "timestamptz", true),
    ] {
        catalog.add_column("public", "customer", column, sql_type, nullable);
    }

    for (column, sql_type, nullable) in [
        ("address_id", "int4", false),
        ("address", "text", false),
        ("address2", "text", true),
        ("district", "text", false),
        ("postal_code", "text", true),
        ("phone", "text", false),
    ] {
        catalog.add_column("public", "address", column, sql_type, nullable);
    }

    for (column, sql_type, nullable) in [
        ("film_id", "int4", false),
        ("title", "text", false),
        ("description", "text", true),
        ("release_year", "int4", true),
        ("rental_rate", "numeric", false),
        ("length", "int2", true),
        ("rating", "mpaa_rating", true),
        ("special_features", "text[]", true),
        ("last_update", "timestamptz", false),
    ] {
        catalog.add_column("public", "film", column, sql_type, nullable);
    }

    catalog
}

pub(crate) fn fixture_enums() -> EnumCatalog {
    let mut enums = EnumCatalog::new();
    for label in ["G", "PG", "PG-13", "R", "NC-17"] {
        enums.add_label("mpaa_rating", label);
    }
    enums
}

pub(crate) fn fixture_generator() -> Generator {
    Generator::from_catalogs(
        fixture_catalog(),
        fixture_enums(),
        &GeneratorConfig::default(),
    )
}

/// Type a single-statement source, panicking on failure.
pub(crate) fn generate_one(generator: &Generator, sql: &str) -> String {
    let mut results = generator.generate(sql);
    assert_eq!(results.len(), 1, "expected one statement in {sql:?}");
    results
        .remove(0)
        .unwrap_or_else(|e| panic!("{sql:?} should analyze: {e}"))
}

/// Type a single-statement source, returning its analysis error.
pub(crate) fn generate_err(generator: &Generator, sql: &str) -> AnalyzeError {
    let mut results = generator.generate(sql);
    assert_eq!(results.len(), 1, "expected one statement in {sql:?}");
    results
        .remove(0)
        .expect_err(&format!("{sql:?} should fail analysis"))
}
