#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use oas_raml_core::AppError;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// Conversion failure reported by the core library.
    #[display("{}", _0)]
    Convert(AppError),

    /// Remote input could not be fetched.
    #[from(ignore)]
    #[display("Failed to fetch {}: {}", url, message)]
    Fetch {
        /// The requested URL.
        url: String,
        /// Message reported by the HTTP client.
        message: String,
    },

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// `General(String)` holds no error source, so the trait is implemented by hand.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_convert() {
        let err: CliError = AppError::UnsupportedFormat("oas30".into()).into();
        assert_eq!(err.to_string(), "Unsupported format: oas30");
    }

    #[test]
    fn test_fetch_display() {
        let err = CliError::Fetch {
            url: "https://example.com/api.raml".into(),
            message: "status code 404".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch https://example.com/api.raml: status code 404"
        );
    }
}
