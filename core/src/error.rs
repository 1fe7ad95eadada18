//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use derive_more::{Display, From};

/// The kind of pointer that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReferenceKind {
    /// A trait applied through `is`.
    #[display("trait")]
    Trait,
    /// A resource type applied through `type`.
    #[display("resource type")]
    ResourceType,
    /// A shared or trait-provided parameter.
    #[display("parameter")]
    Parameter,
    /// A shared or trait-provided response.
    #[display("response")]
    Response,
    /// A named type / schema definition.
    #[display("definition")]
    Definition,
    /// A security scheme referenced by `securedBy` / `security`.
    #[display("security scheme")]
    SecurityScheme,
}

/// The Global Error Enum.
///
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// A format token (or a from/to pair) that is not registered.
    #[from(ignore)]
    #[display("Unsupported format: {_0}")]
    UnsupportedFormat(String),

    /// The YAML / JSON tokenizer rejected the input.
    #[from(ignore)]
    #[display("Failed to parse {format} document: {message}")]
    Parse {
        /// Display name of the format being parsed.
        format: String,
        /// Message reported by the underlying parser.
        message: String,
    },

    /// Structural validation of the input failed.
    #[from(ignore)]
    #[display("Validation Error: {_0}")]
    Validation(String),

    /// A pointer to a trait, resource type or shared component did not resolve.
    #[from(ignore)]
    #[display("Unresolved {kind} reference '{name}'")]
    UnresolvedReference {
        /// What the pointer was supposed to point at.
        kind: ReferenceKind,
        /// The name (or `$ref` value) that failed.
        name: String,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Shorthand for an [`AppError::UnresolvedReference`].
    pub fn unresolved(kind: ReferenceKind, name: impl Into<String>) -> Self {
        AppError::UnresolvedReference {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for an [`AppError::Parse`].
    pub fn parse(format: impl Into<String>, message: impl ToString) -> Self {
        AppError::Parse {
            format: format.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_unresolved_display() {
        let err = AppError::unresolved(ReferenceKind::Response, "trait:search:200");
        assert_eq!(
            err.to_string(),
            "Unresolved response reference 'trait:search:200'"
        );
    }

    #[test]
    fn test_parse_display() {
        let err = AppError::parse("RAML 1.0", "bad indentation");
        assert_eq!(
            err.to_string(),
            "Failed to parse RAML 1.0 document: bad indentation"
        );
    }
}
