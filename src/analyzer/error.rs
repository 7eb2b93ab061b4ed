use thiserror::Error;

/// Errors raised while typing a query.
///
/// Any of these is fatal for the statement that raised it; the driver isolates
/// failures per statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    /// Referenced table or view is neither in scope nor in the catalog.
    #[error("unknown table `{0}`")]
    UnknownTable(String),
    /// Column reference cannot be resolved in any scoped table.
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
    /// Target-list item has no name and none can be inferred.
    #[error("missing alias for expression `{0}`")]
    MissingAlias(String),
    /// Node kind, operator, function, or subscript form outside the supported set.
    #[error("unsupported SQL construct: {0}")]
    Unsupported(String),
    /// The SQL source could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Shorten deparsed SQL for inclusion in an error message.
pub(crate) fn snippet(sql: impl ToString) -> String {
    let text = sql.to_string();
    if text.len() > 60 {
        let cut: String = text.chars().take(57).collect();
        format!("{cut}...")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_truncates_long_sql() {
        let long = "x".repeat(100);
        let short = snippet(&long);
        assert_eq!(short.len(), 60);
        assert!(short.ends_with("..."));
        assert_eq!(snippet("SELECT 1"), "SELECT 1");
    }
}
