#![deny(missing_docs)]

//! # OAS RAML Core
//!
//! Converts API descriptions between Swagger 2.0, RAML 0.8 and RAML 1.0
//! through one intermediate model. Every document is imported into a
//! [`model::Root`], then exported to the target format.

/// Shared error types.
pub mod error;

/// Format registry.
pub mod formats;

/// The intermediate model.
pub mod model;

/// Per-format import / export.
pub mod converters;

/// Text parsing, format sniffing and serialization.
pub mod loader;

/// Structural checks on input documents.
pub mod validation;

/// The conversion facade.
pub mod convert;

pub use convert::{convert, convert_document, resolve_source, ConvertOptions, OutputForm};
pub use converters::inheritance::resolve_inheritance;
pub use converters::naming::TraitKeyStyle;
pub use converters::{converter_for, FormatConverter};
pub use error::{AppError, AppResult, ReferenceKind};
pub use formats::{Format, FormatDescriptor, SerializationForm};
pub use loader::{detect_format, parse_document, serialize_document};
pub use model::Root;
pub use validation::validate_document;
