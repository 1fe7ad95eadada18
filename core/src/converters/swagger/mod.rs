//! # Swagger 2.0
//!
//! Import walks the document in dependency order so that every `$ref`
//! (definitions, shared parameters, shared responses) resolves against
//! entities built earlier; export runs the inheritance fixup first because
//! Swagger has neither traits nor resource types.

pub mod definition;
pub(crate) mod method;
pub(crate) mod parameter;
pub(crate) mod resource;
pub(crate) mod root;
pub(crate) mod security;

use crate::converters::inheritance::resolve_inheritance;
use crate::converters::naming::TraitKeyStyle;
use crate::converters::FormatConverter;
use crate::error::AppResult;
use crate::formats::Format;
use crate::model::Root;
use serde_json::Value;

/// `$ref` prefix of shared parameters.
pub const PARAMETERS_PREFIX: &str = "#/parameters/";
/// `$ref` prefix of shared responses.
pub const RESPONSES_PREFIX: &str = "#/responses/";

/// Transfer protocols Swagger can declare in `schemes`.
const SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

/// Keeps the protocols Swagger accepts as `schemes`, lowercased.
pub(crate) fn swagger_schemes(protocols: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for protocol in protocols {
        let lower = protocol.to_lowercase();
        if !SCHEMES.contains(&lower.as_str()) {
            log::warn!("protocol '{}' cannot be a Swagger scheme and was dropped", protocol);
        } else if !out.contains(&lower) {
            out.push(lower);
        }
    }
    out
}

/// Swagger 2.0 converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwaggerConverter;

impl FormatConverter for SwaggerConverter {
    fn format(&self) -> Format {
        Format::Swagger
    }

    fn import(&self, document: &Value) -> AppResult<Root> {
        root::import_root(document)
    }

    fn export(&self, root: &Root) -> AppResult<Value> {
        let resolved = resolve_inheritance(root, TraitKeyStyle::Colon)?;
        root::export_root(&resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swagger_schemes_filters_and_lowercases() {
        let protocols = vec!["HTTPS".to_string(), "ftp".to_string(), "https".to_string()];
        assert_eq!(swagger_schemes(&protocols), vec!["https"]);
    }
}
