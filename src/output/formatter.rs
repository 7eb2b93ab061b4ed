//! Assembles analyzed result columns into `TypeScript` type expressions.
//!
//! Per-column rendering unions branch constants, falls back to the mapped SQL
//! type, and appends `null` for nullable columns; set-operation results emit
//! one object type per operand query.

use crate::analyzer::typed_expr::{ResultColumn, TypedExpr};
use crate::catalog::type_map::TypeCatalog;

/// Renders one `name: type` column entry.
pub type ColumnFormatter = fn(&str, &str) -> String;

/// The default column renderer: `"name": type,`.
pub fn default_column_formatter(name: &str, ts_type: &str) -> String {
    format!("\"{name}\": {ts_type},")
}

/// Renders one query's result columns as a `TypeScript` type expression.
#[derive(Clone)]
pub struct Formatter<'a> {
    types: &'a TypeCatalog,
    column_formatter: ColumnFormatter,
    pretty: bool,
}

impl<'a> Formatter<'a> {
    /// A formatter over the given type catalog.
    pub fn new(types: &'a TypeCatalog, column_formatter: ColumnFormatter, pretty: bool) -> Self {
        Formatter {
            types,
            column_formatter,
            pretty,
        }
    }

    /// Render one query's result columns.
    ///
    /// When every column carries set variants the result is a union of object
    /// types, one per original set-operation operand.
    pub fn render(&self, columns: &[ResultColumn]) -> String {
        let variant_count = columns
            .first()
            .map(|c| c.set_variants.len())
            .filter(|_| columns.iter().all(|c| !c.set_variants.is_empty()));

        match variant_count {
            Some(count) => {
                let objects: Vec<String> = (0..count)
                    .map(|index| self.render_object(columns, Some(index)))
                    .collect();
                objects.join(" | ")
            }
            None => self.render_object(columns, None),
        }
    }

    fn render_object(&self, columns: &[ResultColumn], variant: Option<usize>) -> String {
        let entries: Vec<String> = columns
            .iter()
            .map(|column| {
                let source = variant
                    .and_then(|index| column.set_variants.get(index))
                    .unwrap_or(column);
                (self.column_formatter)(&column.name, &self.column_type(source))
            })
            .collect();

        if entries.is_empty() {
            return "{}".to_string();
        }
        if self.pretty {
            let body: Vec<String> = entries.iter().map(|entry| format!("  {entry}")).collect();
            format!("{{\n{}\n}}", body.join("\n"))
        } else {
            let body = entries.join(" ");
            format!("{{ {} }}", body.trim_end_matches(','))
        }
    }

    /// The rendered union for one column: branch constants (or mapped branch
    /// types), else the constant, else the mapped type; `null` appended for
    /// nullable columns. Parts are deduplicated in first-seen order.
    fn column_type(&self, column: &TypedExpr) -> String {
        let mut parts: Vec<String> = Vec::new();
        if column.branches.is_empty() {
            match &column.constant {
                Some(constant) => parts.push(constant.clone()),
                None => parts.push(self.types.map(&column.sql_type)),
            }
        } else {
            for branch in &column.branches {
                let rendered = branch
                    .constant
                    .clone()
                    .unwrap_or_else(|| self.types.map(&branch.sql_type));
                push_unique(&mut parts, rendered);
            }
        }
        if column.nullable {
            push_unique(&mut parts, "null".to_string());
        }
        parts.join(" | ")
    }
}

fn push_unique(parts: &mut Vec<String>, part: String) {
    if !parts.contains(&part) {
        parts.push(part);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::EnumCatalog;

    fn types() -> TypeCatalog {
        TypeCatalog::new("string", EnumCatalog::new())
    }

    fn named(name: &str, expr: TypedExpr) -> ResultColumn {
        ResultColumn {
            name: name.to_string(),
            ..expr
        }
    }

    #[test]
    fn renders_a_single_object() {
        let types = types();
        let formatter = Formatter::new(&types, default_column_formatter, false);
        let columns = vec![
            named("id", TypedExpr::of("int4", false)),
            named("email", TypedExpr::of("text", true)),
        ];
        assert_eq!(
            formatter.render(&columns),
            "{ \"id\": number, \"email\": string | null }"
        );
    }

    #[test]
    fn renders_constants_verbatim() {
        let types = types();
        let formatter = Formatter::new(&types, default_column_formatter, false);
        let columns = vec![named("answer", TypedExpr::constant("int4", "42"))];
        assert_eq!(formatter.render(&columns), "{ \"answer\": 42 }");
    }

    #[test]
    fn branch_unions_deduplicate_in_first_seen_order() {
        let types = types();
        let formatter = Formatter::new(&types, default_column_formatter, false);
        let mut column = TypedExpr::of("text", false);
        column.branches = vec![
            TypedExpr::constant("text", "\"a\""),
            TypedExpr::of("text", false),
            TypedExpr::constant("text", "\"a\""),
        ];
        let columns = vec![named("k", column)];
        assert_eq!(formatter.render(&columns), "{ \"k\": \"a\" | string }");
    }

    #[test]
    fn nullable_branch_union_ends_in_null() {
        let types = types();
        let formatter = Formatter::new(&types, default_column_formatter, false);
        let mut column = TypedExpr::of("int4", true);
        column.branches = vec![
            TypedExpr::constant("int4", "1"),
            TypedExpr::constant("int4", "2"),
        ];
        let columns = vec![named("c", column)];
        assert_eq!(formatter.render(&columns), "{ \"c\": 1 | 2 | null }");
    }

    #[test]
    fn set_variants_render_one_object_per_operand() {
        let types = types();
        let formatter = Formatter::new(&types, default_column_formatter, false);
        let mut column = TypedExpr::of("text", false);
        column.set_variants = vec![
            TypedExpr::constant("text", "\"a\""),
            TypedExpr::of("text", true),
        ];
        let columns = vec![named("k", column)];
        assert_eq!(
            formatter.render(&columns),
            "{ \"k\": \"a\" } | { \"k\": string | null }"
        );
    }

    #[test]
    fn empty_projection_renders_an_empty_object() {
        let types = types();
        let formatter = Formatter::new(&types, default_column_formatter, false);
        assert_eq!(formatter.render(&[]), "{}");
    }

    #[test]
    fn pretty_mode_renders_one_column_per_line() {
        let types = types();
        let formatter = Formatter::new(&types, default_column_formatter, true);
        let columns = vec![
            named("id", TypedExpr::of("int4", false)),
            named("email", TypedExpr::of("text", true)),
        ];
        assert_eq!(
            formatter.render(&columns),
            "{\n  \"id\": number,\n  \"email\": string | null,\n}"
        );
    }
}
