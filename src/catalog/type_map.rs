use indexmap::IndexMap;
use sqlparser::ast::{ArrayElemTypeDef, DataType};

use crate::catalog::schema::EnumCatalog;

const NUMBER_TAGS: &[&str] = &[
    "int2", "int4", "int8", "smallint", "integer", "int", "bigint", "serial", "serial2", "serial4",
    "serial8", "smallserial", "bigserial", "float2", "float4", "float8", "real", "numeric",
    "decimal", "oid",
];

const TEXT_TAGS: &[&str] = &["text", "varchar", "bpchar", "citext", "name", "char"];

const TIME_TAGS: &[&str] = &["time", "timetz"];

const TIMESTAMP_TAGS: &[&str] = &["timestamp", "timestamptz"];

const BIT_TAGS: &[&str] = &["bit", "varbit"];

const JSON_TAGS: &[&str] = &["json", "jsonb"];

/// Maps `PostgreSQL` type tags to `TypeScript` types and answers type-family
/// questions for the operator rules.
///
/// A user-supplied override map wins over every default; enum tags render as
/// the union of their labels.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    overrides: IndexMap<String, String>,
    fallback_type: String,
    enums: EnumCatalog,
}

impl TypeCatalog {
    /// A catalog with the given fallback for unrecognized tags.
    pub fn new(fallback_type: &str, enums: EnumCatalog) -> Self {
        TypeCatalog {
            overrides: IndexMap::new(),
            fallback_type: fallback_type.to_string(),
            enums,
        }
    }

    /// Replace the override map (tag → `TypeScript` type).
    pub fn set_overrides(&mut self, overrides: IndexMap<String, String>) {
        self.overrides = overrides;
    }

    /// Merge overrides from a JSON object of tag → `TypeScript` type.
    pub fn load_overrides_json(&mut self, json: &str) -> Result<(), String> {
        let parsed: IndexMap<String, String> = serde_json::from_str(json)
            .map_err(|e| format!("Invalid type override JSON: {e}"))?;
        for (tag, ts_type) in parsed {
            self.overrides.insert(tag, ts_type);
        }
        Ok(())
    }

    /// Render a SQL type tag as a `TypeScript` type.
    pub fn map(&self, tag: &str) -> String {
        if let Some(ts_type) = self.overrides.get(tag) {
            return ts_type.clone();
        }
        match tag {
            "null" => return "null".to_string(),
            "any" => return "any".to_string(),
            "unknown" => return "unknown".to_string(),
            _ => {}
        }
        if let Some(element) = self.element_type(tag) {
            return format!("Array<{}>", self.map(element));
        }
        if let Some(labels) = self.enums.labels(tag) {
            let union: Vec<String> = labels.iter().map(|l| format!("\"{l}\"")).collect();
            return union.join(" | ");
        }
        if self.is_number(tag) {
            "number".to_string()
        } else if self.is_text(tag) {
            "string".to_string()
        } else if tag == "bool" || tag == "boolean" {
            "boolean".to_string()
        } else if self.is_date(tag) || self.is_timestamp(tag) {
            "Date".to_string()
        } else if self.is_time(tag) || self.is_bit(tag) || tag == "interval" {
            "string".to_string()
        } else if self.is_json(tag) {
            "any".to_string()
        } else if tag == "bytea" {
            "Buffer".to_string()
        } else {
            self.fallback_type.clone()
        }
    }

    /// True for the numeric family (`int*`, `serial*`, `float*`, `numeric`, …).
    pub fn is_number(&self, tag: &str) -> bool {
        NUMBER_TAGS.contains(&tag)
    }

    /// True for the character-string family.
    pub fn is_text(&self, tag: &str) -> bool {
        TEXT_TAGS.contains(&tag)
    }

    /// True for `time` and `timetz`.
    pub fn is_time(&self, tag: &str) -> bool {
        TIME_TAGS.contains(&tag)
    }

    /// True for `timestamp` and `timestamptz`.
    pub fn is_timestamp(&self, tag: &str) -> bool {
        TIMESTAMP_TAGS.contains(&tag)
    }

    /// True for `date`.
    pub fn is_date(&self, tag: &str) -> bool {
        tag == "date"
    }

    /// True for `bit` and `varbit`.
    pub fn is_bit(&self, tag: &str) -> bool {
        BIT_TAGS.contains(&tag)
    }

    /// True for `json` and `jsonb`.
    pub fn is_json(&self, tag: &str) -> bool {
        JSON_TAGS.contains(&tag)
    }

    /// True when the tag denotes an array type.
    pub fn is_array(&self, tag: &str) -> bool {
        tag.ends_with("[]")
    }

    /// The element tag of an array type, if `tag` is one.
    pub fn element_type<'t>(&self, tag: &'t str) -> Option<&'t str> {
        tag.strip_suffix("[]")
    }
}

/// Normalize a parsed SQL data type to its `PostgreSQL` catalog tag.
///
/// Collapses spelled-out names (`INTEGER`, `CHARACTER VARYING`, `TIMESTAMP
/// WITH TIME ZONE`) onto the tags the schema loader reports (`int4`,
/// `varchar`, `timestamptz`) and encodes array types with a `[]` suffix.
pub fn normalize_type_name(data_type: &DataType) -> String {
    if let DataType::Array(def) = data_type {
        let element = match def {
            ArrayElemTypeDef::SquareBracket(inner, _)
            | ArrayElemTypeDef::AngleBracket(inner)
            | ArrayElemTypeDef::Parenthesis(inner) => normalize_type_name(inner),
            ArrayElemTypeDef::None => "any".to_string(),
        };
        return format!("{element}[]");
    }

    let mut name = data_type.to_string().to_ascii_lowercase();
    if let (Some(open), Some(close)) = (name.find('('), name.rfind(')')) {
        if open < close {
            name.replace_range(open..=close, "");
        }
    }
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

    let tag = match name.as_str() {
        "int" | "integer" | "int4" => "int4",
        "bigint" | "int8" => "int8",
        "smallint" | "int2" => "int2",
        "real" | "float4" => "float4",
        "float" | "double precision" | "float8" => "float8",
        "numeric" | "decimal" | "dec" => "numeric",
        "character varying" | "char varying" | "varchar" => "varchar",
        "character" | "char" | "bpchar" => "bpchar",
        "bool" | "boolean" => "bool",
        "timestamp" | "timestamp without time zone" => "timestamp",
        "timestamptz" | "timestamp with time zone" => "timestamptz",
        "time" | "time without time zone" => "time",
        "timetz" | "time with time zone" => "timetz",
        "bit varying" | "varbit" => "varbit",
        other => {
            // Custom types may arrive schema-qualified or quoted.
            let tail = other.rsplit('.').next().unwrap_or(other);
            return tail.trim_matches('"').to_string();
        }
    };
    tag.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::dialect::PostgreSqlDialect;
    use sqlparser::parser::Parser;

    fn catalog() -> TypeCatalog {
        let mut enums = EnumCatalog::new();
        for label in ["G", "PG", "PG-13", "R", "NC-17"] {
            enums.add_label("mpaa_rating", label);
        }
        TypeCatalog::new("string", enums)
    }

    fn parse_data_type(sql: &str) -> DataType {
        let mut parser = Parser::new(&PostgreSqlDialect {})
            .try_with_sql(sql)
            .expect("tokenizing a data type should succeed");
        parser.parse_data_type().expect("data type should parse")
    }

    #[test]
    fn maps_scalar_families() {
        let types = catalog();
        assert_eq!(types.map("int4"), "number");
        assert_eq!(types.map("numeric"), "number");
        assert_eq!(types.map("text"), "string");
        assert_eq!(types.map("bool"), "boolean");
        assert_eq!(types.map("timestamptz"), "Date");
        assert_eq!(types.map("time"), "string");
        assert_eq!(types.map("jsonb"), "any");
        assert_eq!(types.map("bytea"), "Buffer");
        assert_eq!(types.map("null"), "null");
        assert_eq!(types.map("any"), "any");
    }

    #[test]
    fn unknown_tags_use_the_fallback() {
        let types = catalog();
        assert_eq!(types.map("uuid"), "string");
        assert_eq!(types.map("inet"), "string");
        assert_eq!(types.map("some_domain"), "string");
    }

    #[test]
    fn enums_render_as_label_unions() {
        let types = catalog();
        assert_eq!(
            types.map("mpaa_rating"),
            "\"G\" | \"PG\" | \"PG-13\" | \"R\" | \"NC-17\""
        );
    }

    #[test]
    fn arrays_wrap_their_element_type() {
        let types = catalog();
        assert_eq!(types.map("int4[]"), "Array<number>");
        assert_eq!(types.map("text[]"), "Array<string>");
        assert_eq!(
            types.map("mpaa_rating[]"),
            "Array<\"G\" | \"PG\" | \"PG-13\" | \"R\" | \"NC-17\">"
        );
    }

    #[test]
    fn overrides_win_over_defaults() {
        let mut types = catalog();
        types
            .load_overrides_json(r#"{"int8": "bigint", "uuid": "Uuid"}"#)
            .unwrap();
        assert_eq!(types.map("int8"), "bigint");
        assert_eq!(types.map("uuid"), "Uuid");
        assert_eq!(types.map("int8[]"), "Array<bigint>");
    }

    #[test]
    fn rejects_invalid_override_json() {
        let mut types = catalog();
        let err = types.load_overrides_json("not json").unwrap_err();
        assert!(err.contains("Invalid type override JSON"));
    }

    #[test]
    fn normalizes_spelled_out_type_names() {
        assert_eq!(normalize_type_name(&parse_data_type("INTEGER")), "int4");
        assert_eq!(normalize_type_name(&parse_data_type("BIGINT")), "int8");
        assert_eq!(
            normalize_type_name(&parse_data_type("CHARACTER VARYING(30)")),
            "varchar"
        );
        assert_eq!(
            normalize_type_name(&parse_data_type("TIMESTAMP WITH TIME ZONE")),
            "timestamptz"
        );
        assert_eq!(normalize_type_name(&parse_data_type("TEXT")), "text");
        assert_eq!(
            normalize_type_name(&parse_data_type("mpaa_rating")),
            "mpaa_rating"
        );
    }

    #[test]
    fn normalizes_array_types() {
        assert_eq!(normalize_type_name(&parse_data_type("INT[]")), "int4[]");
        assert_eq!(normalize_type_name(&parse_data_type("TEXT[]")), "text[]");
    }
}
