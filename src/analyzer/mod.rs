/// Typed analysis errors.
pub mod error;
/// Recursive expression typing rules.
pub mod expression;
/// FROM-clause analysis and join-nullability widening.
pub(crate) mod from_clause;
/// Function return-type families.
pub(crate) mod functions;
/// Operator result-type rules.
pub(crate) mod operators;
/// The name-resolution environment.
pub mod scope;
/// Statement-level analysis.
pub mod statement;
/// The analysis result IR.
pub mod typed_expr;
/// View pre-analysis.
pub mod views;
