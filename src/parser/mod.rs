use sqlparser::ast::{Ident, ObjectName, ObjectNamePart, Statement};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use crate::analyzer::error::AnalyzeError;

/// Parse a SQL source string into its statements.
pub fn parse_queries(sql: &str) -> Result<Vec<Statement>, AnalyzeError> {
    Parser::parse_sql(&PostgreSqlDialect {}, sql).map_err(|e| AnalyzeError::Parse(e.to_string()))
}

/// The catalog name of an identifier.
///
/// `PostgreSQL` folds unquoted identifiers to lowercase; quoted identifiers
/// keep their spelling.
pub fn ident_name(ident: &Ident) -> String {
    if ident.quote_style.is_none() {
        ident.value.to_ascii_lowercase()
    } else {
        ident.value.clone()
    }
}

/// The identifier components of a (possibly qualified) object name.
pub fn object_name_parts(name: &ObjectName) -> Vec<String> {
    name.0
        .iter()
        .map(|part| match part {
            ObjectNamePart::Identifier(ident) => ident_name(ident),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::ast::Statement;

    #[test]
    fn parses_multiple_statements() {
        let statements = parse_queries("SELECT 1 a; SELECT 2 b").unwrap();
        assert_eq!(statements.len(), 2);
        assert!(matches!(statements[0], Statement::Query(_)));
    }

    #[test]
    fn surfaces_parse_errors() {
        let err = parse_queries("SELECT FROM WHERE").unwrap_err();
        assert!(matches!(err, AnalyzeError::Parse(_)));
    }

    #[test]
    fn ident_name_folds_unquoted_identifiers() {
        assert_eq!(ident_name(&Ident::new("Film")), "film");
        assert_eq!(ident_name(&Ident::with_quote('"', "Film")), "Film");
    }
}
