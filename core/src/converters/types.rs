//! # Type Tables
//!
//! Maps each format's `(type, format)` pairs onto [`InternalType`] and back.
//!
//! Every canonical row round-trips: `from_internal(to_internal(t, f)) == (t, f)`.
//! Alias rows are many-to-one collapses and only apply on import.

use crate::formats::Format;
use crate::model::InternalType;

/// One row of a mapping table.
type Row = (&'static str, Option<&'static str>, InternalType);

const SWAGGER_CANONICAL: &[Row] = &[
    ("integer", None, InternalType::Integer),
    ("integer", Some("int"), InternalType::Int),
    ("integer", Some("int8"), InternalType::Int8),
    ("integer", Some("int16"), InternalType::Int16),
    ("integer", Some("int32"), InternalType::Int32),
    ("integer", Some("int64"), InternalType::Int64),
    ("number", None, InternalType::Number),
    ("number", Some("float"), InternalType::Float),
    ("number", Some("double"), InternalType::Double),
    ("boolean", None, InternalType::Boolean),
    ("string", None, InternalType::String),
    ("string", Some("byte"), InternalType::Byte),
    ("string", Some("binary"), InternalType::Binary),
    ("string", Some("password"), InternalType::Password),
    ("string", Some("date"), InternalType::DateOnly),
    ("string", Some("date-time"), InternalType::DateTime),
    ("string", Some("time"), InternalType::TimeOnly),
    ("string", Some("date-time-only"), InternalType::DateTimeOnly),
    ("file", None, InternalType::File),
    ("object", None, InternalType::Object),
    ("array", None, InternalType::Array),
    ("null", None, InternalType::Null),
];

const SWAGGER_ALIASES: &[Row] = &[
    ("integer", Some("long"), InternalType::Int64),
    ("number", Some("int32"), InternalType::Int32),
    ("number", Some("int64"), InternalType::Int64),
    ("number", Some("long"), InternalType::Int64),
];

const RAML10_CANONICAL: &[Row] = &[
    ("integer", None, InternalType::Integer),
    ("integer", Some("int"), InternalType::Int),
    ("integer", Some("int8"), InternalType::Int8),
    ("integer", Some("int16"), InternalType::Int16),
    ("integer", Some("int32"), InternalType::Int32),
    ("integer", Some("int64"), InternalType::Int64),
    ("number", None, InternalType::Number),
    ("number", Some("float"), InternalType::Float),
    ("number", Some("double"), InternalType::Double),
    ("boolean", None, InternalType::Boolean),
    ("string", None, InternalType::String),
    ("date-only", None, InternalType::DateOnly),
    ("datetime", None, InternalType::DateTime),
    ("time-only", None, InternalType::TimeOnly),
    ("datetime-only", None, InternalType::DateTimeOnly),
    ("file", None, InternalType::File),
    ("object", None, InternalType::Object),
    ("array", None, InternalType::Array),
    ("nil", None, InternalType::Null),
];

const RAML10_ALIASES: &[Row] = &[
    ("integer", Some("long"), InternalType::Int64),
    ("number", Some("int"), InternalType::Int),
    ("number", Some("int8"), InternalType::Int8),
    ("number", Some("int16"), InternalType::Int16),
    ("number", Some("int32"), InternalType::Int32),
    ("number", Some("int64"), InternalType::Int64),
    ("number", Some("long"), InternalType::Int64),
    ("datetime", Some("rfc3339"), InternalType::DateTime),
    ("datetime", Some("rfc2616"), InternalType::String),
    ("date", None, InternalType::DateTime),
];

const RAML08_CANONICAL: &[Row] = &[
    ("integer", None, InternalType::Integer),
    ("number", None, InternalType::Number),
    ("boolean", None, InternalType::Boolean),
    ("string", None, InternalType::String),
    ("date", None, InternalType::DateTime),
    ("file", None, InternalType::File),
];

const RAML08_ALIASES: &[Row] = &[];

fn tables(format: Format) -> (&'static [Row], &'static [Row]) {
    match format {
        Format::Swagger => (SWAGGER_CANONICAL, SWAGGER_ALIASES),
        Format::Raml10 => (RAML10_CANONICAL, RAML10_ALIASES),
        Format::Raml08 => (RAML08_CANONICAL, RAML08_ALIASES),
    }
}

/// Result of normalizing a wire `(type, format)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    /// Canonical type.
    pub internal_type: InternalType,
    /// The wire format when the table did not absorb it.
    pub residual_format: Option<String>,
}

/// Normalizes a wire `(type, format)` pair.
///
/// Unknown formats keep the type of their base row and travel on as
/// `residual_format`; unknown types fall back to `string`.
pub fn to_internal(format: Format, type_name: &str, wire_format: Option<&str>) -> TypeMapping {
    let (canonical, aliases) = tables(format);

    let exact = canonical
        .iter()
        .chain(aliases.iter())
        .find(|(t, f, _)| *t == type_name && *f == wire_format);
    if let Some((_, _, internal)) = exact {
        // A datetime collapsed into a string keeps its format so it can come back.
        let residual = if *internal == InternalType::String {
            wire_format.map(str::to_string)
        } else {
            None
        };
        return TypeMapping {
            internal_type: *internal,
            residual_format: residual,
        };
    }

    let base = canonical
        .iter()
        .find(|(t, f, _)| *t == type_name && f.is_none())
        .map(|(_, _, internal)| *internal);

    match base {
        Some(internal) => TypeMapping {
            internal_type: internal,
            residual_format: wire_format.map(str::to_string),
        },
        None => {
            log::warn!(
                "unknown {} type '{}', falling back to string",
                format.display_name(),
                type_name
            );
            TypeMapping {
                internal_type: InternalType::String,
                residual_format: wire_format.map(str::to_string),
            }
        }
    }
}

/// Expands a canonical type into the format's wire pair.
///
/// Returns `None` when the format has no native row for the type (e.g.
/// `byte` in RAML); callers then fall back to [`fallback_type`].
pub fn from_internal(
    format: Format,
    internal: InternalType,
) -> Option<(&'static str, Option<&'static str>)> {
    let (canonical, _) = tables(format);
    canonical
        .iter()
        .find(|(_, _, i)| *i == internal)
        .map(|(t, f, _)| (*t, *f))
}

/// The closest native type for a canonical type without a native row.
pub fn fallback_type(format: Format, internal: InternalType) -> &'static str {
    if let Some((t, _)) = from_internal(format, internal) {
        return t;
    }
    match internal {
        InternalType::Int
        | InternalType::Int8
        | InternalType::Int16
        | InternalType::Int32
        | InternalType::Int64 => "integer",
        InternalType::Float | InternalType::Double => "number",
        InternalType::Null if format == Format::Raml08 => "string",
        InternalType::Object | InternalType::Array if format == Format::Raml08 => "string",
        InternalType::TimeOnly | InternalType::DateOnly | InternalType::DateTimeOnly
            if format == Format::Raml08 =>
        {
            "date"
        }
        _ => "string",
    }
}

/// Returns true when `name` is a built-in type name of the format.
pub fn is_builtin(format: Format, name: &str) -> bool {
    let (canonical, aliases) = tables(format);
    canonical
        .iter()
        .chain(aliases.iter())
        .any(|(t, _, _)| *t == name)
        || (format == Format::Raml10 && name == "any")
}

/// Formats a RAML 1.0 number type may carry natively.
pub const RAML_NUMBER_FORMATS: &[&str] = &[
    "int", "int8", "int16", "int32", "int64", "long", "float", "double",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_rows_round_trip() {
        for format in [Format::Swagger, Format::Raml10, Format::Raml08] {
            let (canonical, _) = tables(format);
            for (t, f, internal) in canonical {
                let mapped = to_internal(format, t, *f);
                assert_eq!(mapped.internal_type, *internal, "{} {:?}", t, f);
                assert_eq!(from_internal(format, mapped.internal_type), Some((*t, *f)));
            }
        }
    }

    #[test]
    fn test_swagger_date_time() {
        let mapped = to_internal(Format::Swagger, "string", Some("date-time"));
        assert_eq!(mapped.internal_type, InternalType::DateTime);
        assert_eq!(mapped.residual_format, None);
        assert_eq!(
            from_internal(Format::Raml10, InternalType::DateTime),
            Some(("datetime", None))
        );
    }

    #[test]
    fn test_unknown_format_is_residual() {
        let mapped = to_internal(Format::Swagger, "string", Some("uuid"));
        assert_eq!(mapped.internal_type, InternalType::String);
        assert_eq!(mapped.residual_format.as_deref(), Some("uuid"));
    }

    #[test]
    fn test_unknown_type_falls_back_to_string() {
        let mapped = to_internal(Format::Swagger, "decimal", Some("money"));
        assert_eq!(mapped.internal_type, InternalType::String);
        assert_eq!(mapped.residual_format.as_deref(), Some("money"));
    }

    #[test]
    fn test_rfc2616_collapses_to_string() {
        let mapped = to_internal(Format::Raml10, "datetime", Some("rfc2616"));
        assert_eq!(mapped.internal_type, InternalType::String);
        assert_eq!(mapped.residual_format.as_deref(), Some("rfc2616"));
        let rfc3339 = to_internal(Format::Raml10, "datetime", Some("rfc3339"));
        assert_eq!(rfc3339.internal_type, InternalType::DateTime);
        assert_eq!(rfc3339.residual_format, None);
    }

    #[test]
    fn test_raml_has_no_byte_row() {
        assert_eq!(from_internal(Format::Raml10, InternalType::Byte), None);
        assert_eq!(fallback_type(Format::Raml10, InternalType::Byte), "string");
        assert_eq!(fallback_type(Format::Raml08, InternalType::Int64), "integer");
    }

    #[test]
    fn test_builtin_names() {
        assert!(is_builtin(Format::Raml10, "datetime-only"));
        assert!(is_builtin(Format::Raml10, "any"));
        assert!(!is_builtin(Format::Raml10, "Pet"));
        assert!(!is_builtin(Format::Raml08, "object"));
    }
}
