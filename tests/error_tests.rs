mod support;

use sql2ts::analyzer::error::AnalyzeError;
use support::{fixture_generator, generate_err};

#[test]
fn unknown_tables_are_reported_by_name() {
    let generator = fixture_generator();
    assert_eq!(
        generate_err(&generator, "SELECT * FROM nope"),
        AnalyzeError::UnknownTable("nope".to_string())
    );
    assert_eq!(
        generate_err(&generator, "SELECT * FROM other_schema.film"),
        AnalyzeError::UnknownTable("other_schema.film".to_string())
    );
}

#[test]
fn unknown_columns_are_reported_by_reference() {
    let generator = fixture_generator();
    assert_eq!(
        generate_err(&generator, "SELECT missing FROM film"),
        AnalyzeError::UnknownColumn("missing".to_string())
    );
    assert_eq!(
        generate_err(&generator, "SELECT f.missing FROM film f"),
        AnalyzeError::UnknownColumn("f.missing".to_string())
    );
}

#[test]
fn unnamed_targets_need_an_alias() {
    let generator = fixture_generator();
    assert!(matches!(
        generate_err(&generator, "SELECT 1"),
        AnalyzeError::MissingAlias(_)
    ));
    assert!(matches!(
        generate_err(&generator, "SELECT length(title) FROM film"),
        AnalyzeError::MissingAlias(_)
    ));
}

#[test]
fn three_part_column_references_are_unsupported() {
    let generator = fixture_generator();
    assert!(matches!(
        generate_err(&generator, "SELECT public.film.title x FROM film"),
        AnalyzeError::Unsupported(_)
    ));
}

#[test]
fn mismatched_set_operation_arms_are_rejected() {
    let generator = fixture_generator();
    assert!(matches!(
        generate_err(
            &generator,
            "SELECT title FROM film UNION SELECT title, film_id FROM film"
        ),
        AnalyzeError::Unsupported(_)
    ));
}

#[test]
fn derived_tables_require_an_alias() {
    let generator = fixture_generator();
    assert!(matches!(
        generate_err(&generator, "SELECT n FROM (SELECT 42 n)"),
        AnalyzeError::MissingAlias(_)
    ));
}

#[test]
fn parse_failures_cover_the_whole_source() {
    let generator = fixture_generator();
    let results = generator.generate("SELECT WHERE FROM");
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(AnalyzeError::Parse(_))));
}

#[test]
fn statement_failures_are_isolated_per_statement() {
    let generator = fixture_generator();
    let results = generator.generate("SELECT 1 x; SELECT missing FROM film; SELECT 2 y");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_deref(), Ok("{ \"x\": 1 }"));
    assert_eq!(
        results[1],
        Err(AnalyzeError::UnknownColumn("missing".to_string()))
    );
    assert_eq!(results[2].as_deref(), Ok("{ \"y\": 2 }"));
}

#[test]
fn errors_render_their_cause() {
    let generator = fixture_generator();
    let error = generate_err(&generator, "SELECT * FROM nope");
    assert_eq!(error.to_string(), "unknown table `nope`");
}
