//! Return-type catalog for SQL functions, aggregates, and window functions.
//!
//! Functions are classified into result-shape families; each family fixes the
//! result type and how nullability relates to the arguments. Names missing
//! from the catalog type as `any`, nullable.

use crate::analyzer::typed_expr::TypedExpr;

/// How a function's result nullability relates to its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NullRule {
    /// Never null.
    Never,
    /// Null if any argument is nullable.
    FromArgs,
    /// Always nullable.
    Always,
}

/// Result-shape family of a known function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FunctionRule {
    /// Type of the first argument; nullable if any argument is.
    PassThrough,
    /// Type and nullability of the first argument alone.
    ArrayShape,
    /// Type and nullability of the second argument alone.
    SecondArg,
    /// Type of the second argument; nullable if any argument is.
    SecondArgType,
    /// First argument's type suffixed `[]`; always nullable (empty input).
    ArrayAggregate,
    /// Type of the first argument; always nullable (aggregate over an empty
    /// set, or a window frame edge).
    Aggregate,
    /// `avg`: interval and float8 preserved, float4 widens, else numeric.
    Avg,
    /// Fixed result type with a nullability rule.
    Fixed(&'static str, NullRule),
    /// COALESCE short-circuit branch collection (handled by the expression
    /// analyzer, which needs the argument order).
    Coalesce,
    /// NULLIF: type of the first argument, always nullable.
    NullIf,
    /// GREATEST/LEAST: first argument's type, nullable only if every argument
    /// is (NULL inputs are skipped).
    MinMax,
}

/// Look up the rule for a lowercased function name.
pub(crate) fn function_rule(name: &str) -> Option<FunctionRule> {
    use FunctionRule::{
        Aggregate, ArrayAggregate, ArrayShape, Avg, Coalesce, Fixed, MinMax, NullIf, PassThrough,
        SecondArg, SecondArgType,
    };
    use NullRule::{Always, FromArgs, Never};

    let rule = match name {
        // Shape-preserving scalars.
        "abs" | "ceil" | "ceiling" | "floor" | "round" | "trunc" | "exp" | "ln" | "log"
        | "log10" | "sqrt" | "cbrt" | "power" | "pow" | "mod" | "div" | "lower" | "upper"
        | "initcap" | "substring" | "substr" | "trim" | "btrim" | "ltrim" | "rtrim" | "lpad"
        | "rpad" | "repeat" | "reverse" | "replace" | "regexp_replace" | "translate" | "left"
        | "right" | "overlay" | "md5" | "sha224" | "sha256" | "sha384" | "sha512"
        | "first_value" | "last_value" => PassThrough,
        "concat" | "concat_ws" => Fixed("text", FromArgs),

        // Arrays.
        "array_append" | "array_cat" | "array_remove" | "array_replace" | "array_fill" => {
            ArrayShape
        }
        "array_prepend" => SecondArg,
        "array_agg" => ArrayAggregate,

        // Aggregates and window functions.
        "count" | "currval" | "nextval" | "lastval" | "setval" | "rank" | "dense_rank"
        | "row_number" => Fixed("int8", Never),
        "sum" | "min" | "max" | "string_agg" | "lag" | "lead" | "nth_value" => Aggregate,
        "avg" => Avg,
        "percent_rank" | "cume_dist" => Fixed("float8", Never),
        "bool_and" | "bool_or" | "every" | "isfinite" | "starts_with" => Fixed("bool", FromArgs),

        // Bytes.
        "convert_to" | "decode" => Fixed("bytea", FromArgs),

        // Date and time.
        "make_date" | "to_date" => Fixed("date", FromArgs),
        "date_trunc" | "date_bin" => SecondArgType,
        "make_time" => Fixed("time", FromArgs),
        "make_timestamp" => Fixed("timestamp", FromArgs),
        "make_timestamptz" | "to_timestamp" => Fixed("timestamptz", FromArgs),
        "clock_timestamp" | "now" | "statement_timestamp" | "transaction_timestamp" => {
            Fixed("timestamptz", Never)
        }
        "timeofday" => Fixed("text", Never),
        "age" | "make_interval" | "justify_days" | "justify_hours" | "justify_interval" => {
            Fixed("interval", FromArgs)
        }

        // Integers.
        "length" | "array_length" | "array_lower" | "array_upper" | "array_ndims" | "ascii"
        | "bit_length" | "cardinality" | "char_length" | "character_length" | "chr" | "get_bit"
        | "get_byte" | "ntile" | "octet_length" | "position" | "scale" | "strpos"
        | "width_bucket" | "num_nulls" | "num_nonnulls" => Fixed("int4", FromArgs),
        "array_position" => Fixed("int4", Always),
        "bit_count" => Fixed("int8", FromArgs),

        // Fixed numeric, text, and uuid returners.
        "pi" | "random" => Fixed("float8", Never),
        "degrees" | "radians" => Fixed("float8", FromArgs),
        "extract" | "date_part" => Fixed("numeric", FromArgs),
        "to_number" => Fixed("numeric", FromArgs),
        "to_char" | "format" | "split_part" | "array_to_string" | "quote_ident"
        | "quote_literal" | "encode" => Fixed("text", FromArgs),
        "string_to_array" | "regexp_split_to_array" => Fixed("text[]", FromArgs),
        "current_database" | "current_schema" | "version" => Fixed("text", Never),
        "gen_random_uuid" | "uuid_generate_v4" => Fixed("uuid", Never),

        // JSON.
        "to_json" | "row_to_json" | "json_build_object" | "json_build_array" => {
            Fixed("json", FromArgs)
        }
        "to_jsonb" | "jsonb_build_object" | "jsonb_build_array" => Fixed("jsonb", FromArgs),
        "json_agg" => Fixed("json", Always),
        "jsonb_agg" => Fixed("jsonb", Always),
        "json_typeof" | "jsonb_typeof" => Fixed("text", FromArgs),
        "json_array_length" | "jsonb_array_length" => Fixed("int4", FromArgs),

        // SQL value functions arrive as zero-argument calls.
        "current_date" => Fixed("date", Never),
        "current_time" => Fixed("timetz", Never),
        "current_timestamp" => Fixed("timestamptz", Never),
        "localtime" => Fixed("time", Never),
        "localtimestamp" => Fixed("timestamp", Never),
        "current_user" | "session_user" | "user" | "current_role" | "current_catalog" => {
            Fixed("text", Never)
        }

        "coalesce" => Coalesce,
        "nullif" => NullIf,
        "greatest" | "least" => MinMax,

        _ => return None,
    };
    Some(rule)
}

/// Apply a function rule to already-analyzed arguments.
///
/// `Coalesce` is not handled here; the expression analyzer implements its
/// short-circuit branch collection.
pub(crate) fn apply_rule(rule: FunctionRule, args: &[TypedExpr]) -> TypedExpr {
    let first_type = || {
        args.first()
            .map_or_else(|| "any".to_string(), |a| a.sql_type.clone())
    };
    let any_nullable = args.iter().any(|a| a.nullable);

    match rule {
        FunctionRule::PassThrough => TypedExpr::of(first_type(), any_nullable),
        FunctionRule::ArrayShape => {
            let nullable = args.first().is_some_and(|a| a.nullable);
            TypedExpr::of(first_type(), nullable)
        }
        FunctionRule::SecondArg => {
            let second = args.get(1).or_else(|| args.first());
            match second {
                Some(arg) => TypedExpr::of(arg.sql_type.clone(), arg.nullable),
                None => TypedExpr::of("any", true),
            }
        }
        FunctionRule::SecondArgType => {
            let tag = args
                .get(1)
                .map_or_else(|| "any".to_string(), |a| a.sql_type.clone());
            TypedExpr::of(tag, any_nullable)
        }
        FunctionRule::ArrayAggregate => TypedExpr::of(format!("{}[]", first_type()), true),
        FunctionRule::Aggregate => TypedExpr::of(first_type(), true),
        FunctionRule::Avg => {
            let tag = match first_type().as_str() {
                "interval" => "interval",
                "float8" | "float4" => "float8",
                _ => "numeric",
            };
            TypedExpr::of(tag, true)
        }
        FunctionRule::Fixed(tag, null_rule) => {
            let nullable = match null_rule {
                NullRule::Never => false,
                NullRule::FromArgs => any_nullable,
                NullRule::Always => true,
            };
            TypedExpr::of(tag, nullable)
        }
        FunctionRule::NullIf => TypedExpr::of(first_type(), true),
        FunctionRule::MinMax => {
            let nullable = !args.is_empty() && args.iter().all(|a| a.nullable);
            TypedExpr {
                branches: args.to_vec(),
                ..TypedExpr::of(first_type(), nullable)
            }
        }
        FunctionRule::Coalesce => TypedExpr::of("any", true),
    }
}
