//! # Converters
//!
//! One [`FormatConverter`] per format, each wiring its per-entity import /
//! export functions together in dependency order:
//! info → security → definitions → resource types → traits → resources.
//!
//! - **swagger**: Swagger 2.0.
//! - **raml**: RAML 0.8 and 1.0, sharing one implementation set.
//! - **inheritance**: the fixup pass run before exporting to a format
//!   without traits / resource types.

pub mod annotations;
pub mod inheritance;
pub(crate) mod json;
pub mod naming;
pub mod placeholders;
pub mod raml;
pub mod swagger;
pub mod types;

use crate::error::AppResult;
use crate::formats::Format;
use crate::model::Root;
use serde_json::Value;

/// Import / export of whole documents for one format.
///
/// Both directions work on parsed trees; text handling lives in `loader`.
pub trait FormatConverter {
    /// The format handled.
    fn format(&self) -> Format;

    /// Builds a fresh model from a parsed document.
    fn import(&self, document: &Value) -> AppResult<Root>;

    /// Writes a model as a document tree of this format.
    fn export(&self, root: &Root) -> AppResult<Value>;
}

/// Returns the converter registered for a format.
pub fn converter_for(format: Format) -> Box<dyn FormatConverter> {
    match format {
        Format::Swagger => Box::new(swagger::SwaggerConverter),
        Format::Raml08 | Format::Raml10 => Box::new(raml::RamlConverter::new(format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_for_each_format() {
        for format in [Format::Swagger, Format::Raml08, Format::Raml10] {
            assert_eq!(converter_for(format).format(), format);
        }
    }
}
