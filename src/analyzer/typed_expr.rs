/// The type computed for one expression.
///
/// Produced once by expression analysis and consumed by the formatter; all
/// rendering logic lives there. Branches and set variants carry their own
/// constants so the formatter can union them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypedExpr {
    /// `PostgreSQL` type tag (`int4`, `text`, `null`, `any`, `int4[]`, …).
    pub sql_type: String,
    /// Whether the value may be NULL.
    pub nullable: bool,
    /// Name inferred from a bare column reference; empty otherwise.
    pub name: String,
    /// Rendered literal when the expression is provably a single constant.
    pub constant: Option<String>,
    /// Result branches of CASE/COALESCE/VALUES-style expressions.
    pub branches: Vec<TypedExpr>,
    /// One entry per set-operation operand contributing to this column.
    pub set_variants: Vec<TypedExpr>,
}

/// A result column: a typed expression with a non-empty output name.
pub type ResultColumn = TypedExpr;

impl TypedExpr {
    /// A plain typed value with no name, constant, or branches.
    pub fn of(sql_type: impl Into<String>, nullable: bool) -> Self {
        TypedExpr {
            sql_type: sql_type.into(),
            nullable,
            ..TypedExpr::default()
        }
    }

    /// A non-nullable constant of the given type.
    pub fn constant(sql_type: impl Into<String>, value: impl Into<String>) -> Self {
        TypedExpr {
            sql_type: sql_type.into(),
            constant: Some(value.into()),
            ..TypedExpr::default()
        }
    }

    /// The NULL literal.
    pub fn null() -> Self {
        TypedExpr {
            sql_type: "null".to_string(),
            nullable: true,
            ..TypedExpr::default()
        }
    }
}
