//! # Format Registry
//!
//! Static table of the supported API description formats. The table is built
//! at compile time and never mutated, so it is safe to share between
//! concurrent conversions.

use std::fmt;

/// The concrete formats a converter exists for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Swagger / OpenAPI 2.0.
    Swagger,
    /// RAML 0.8.
    Raml08,
    /// RAML 1.0.
    Raml10,
}

impl Format {
    /// Human readable name, used in error messages and logs.
    pub fn display_name(self) -> &'static str {
        match self {
            Format::Swagger => "Swagger 2.0",
            Format::Raml08 => "RAML 0.8",
            Format::Raml10 => "RAML 1.0",
        }
    }

    /// Returns true for either RAML version.
    pub fn is_raml(self) -> bool {
        matches!(self, Format::Raml08 | Format::Raml10)
    }

    /// The canonical (non deprecated) descriptor for this format.
    pub fn descriptor(self) -> &'static FormatDescriptor {
        FORMATS
            .iter()
            .find(|d| d.format == self && !d.deprecated)
            .unwrap_or(&FORMATS[0])
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// How a document of a given format can be written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationForm {
    /// JSON text.
    Json,
    /// YAML text.
    Yaml,
}

impl fmt::Display for SerializationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationForm::Json => write!(f, "json"),
            SerializationForm::Yaml => write!(f, "yaml"),
        }
    }
}

/// One row of the registry.
#[derive(Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Token accepted on the command line (`--from` / `--to`).
    pub token: &'static str,
    /// Display name.
    pub display_name: &'static str,
    /// Stable identifier used to pick the converter implementation.
    pub internal_id: &'static str,
    /// Forms the format can be serialized to; the first one is the default.
    pub serialization_forms: &'static [SerializationForm],
    /// Deprecated tokens still work but log a warning.
    pub deprecated: bool,
    /// The converter family behind the token.
    pub format: Format,
}

/// Token that asks the facade to sniff the input format.
pub const AUTO_TOKEN: &str = "auto";

static FORMATS: [FormatDescriptor; 5] = [
    FormatDescriptor {
        token: "oas20",
        display_name: "OAS 2.0",
        internal_id: "OAS20",
        serialization_forms: &[SerializationForm::Json, SerializationForm::Yaml],
        deprecated: false,
        format: Format::Swagger,
    },
    FormatDescriptor {
        token: "swagger",
        display_name: "Swagger 2.0",
        internal_id: "OAS20",
        serialization_forms: &[SerializationForm::Json, SerializationForm::Yaml],
        deprecated: false,
        format: Format::Swagger,
    },
    FormatDescriptor {
        token: "raml08",
        display_name: "RAML 0.8",
        internal_id: "RAML08",
        serialization_forms: &[SerializationForm::Yaml],
        deprecated: false,
        format: Format::Raml08,
    },
    FormatDescriptor {
        token: "raml10",
        display_name: "RAML 1.0",
        internal_id: "RAML10",
        serialization_forms: &[SerializationForm::Yaml],
        deprecated: false,
        format: Format::Raml10,
    },
    FormatDescriptor {
        token: "raml",
        display_name: "RAML 1.0",
        internal_id: "RAML10",
        serialization_forms: &[SerializationForm::Yaml],
        deprecated: true,
        format: Format::Raml10,
    },
];

/// Looks up a format token, case-insensitively.
///
/// `auto` is not a format and is handled by the facade; it returns `None` here.
pub fn lookup(token: &str) -> Option<&'static FormatDescriptor> {
    let token = token.trim();
    FORMATS.iter().find(|d| d.token.eq_ignore_ascii_case(token))
}

/// Every registered descriptor, in table order.
pub fn all() -> &'static [FormatDescriptor] {
    &FORMATS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let desc = lookup("RAML10").unwrap();
        assert_eq!(desc.format, Format::Raml10);
        assert_eq!(desc.internal_id, "RAML10");
        assert!(lookup(" Swagger ").is_some());
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(lookup("oas30").is_none());
        assert!(lookup(AUTO_TOKEN).is_none());
    }

    #[test]
    fn test_deprecated_alias() {
        let desc = lookup("raml").unwrap();
        assert!(desc.deprecated);
        assert_eq!(desc.format, Format::Raml10);
        assert!(!Format::Raml10.descriptor().deprecated);
    }

    #[test]
    fn test_default_serialization_form() {
        assert_eq!(
            Format::Swagger.descriptor().serialization_forms[0],
            SerializationForm::Json
        );
        assert_eq!(
            Format::Raml08.descriptor().serialization_forms,
            &[SerializationForm::Yaml]
        );
    }
}
