//! # Conversion Facade
//!
//! `convert(from, to, text, options)`: the single entry point wrapped by the
//! CLI. Resolves format tokens, parses, optionally validates, then runs
//! import → export and serializes the result. Nothing is emitted on error.

use crate::converters::converter_for;
use crate::error::{AppError, AppResult};
use crate::formats::{lookup, Format, FormatDescriptor, SerializationForm, AUTO_TOKEN};
use crate::loader::{detect_format, parse_document, serialize_document};
use crate::validation::validate_document;
use serde_json::Value;

/// Output serialization requested by the caller.
pub type OutputForm = SerializationForm;

/// Options for [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Run structural validation on the input before converting.
    pub validate: bool,
    /// Output form. `None` picks the target format's default.
    pub output: Option<OutputForm>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            validate: true,
            output: None,
        }
    }
}

fn resolve_token(token: &str) -> AppResult<&'static FormatDescriptor> {
    let descriptor =
        lookup(token).ok_or_else(|| AppError::UnsupportedFormat(token.trim().to_string()))?;
    if descriptor.deprecated {
        log::warn!(
            "format '{}' is deprecated, use '{}' instead",
            descriptor.token,
            descriptor.format.descriptor().token
        );
    }
    Ok(descriptor)
}

/// Resolves the source format, sniffing the text for `auto`.
pub fn resolve_source(token: &str, raw: &str) -> AppResult<Format> {
    if token.trim().eq_ignore_ascii_case(AUTO_TOKEN) {
        let detected = detect_format(raw)?;
        log::debug!("detected {} input", detected.display_name());
        return Ok(detected);
    }
    Ok(resolve_token(token)?.format)
}

/// Converts an already parsed document tree between formats.
pub fn convert_document(from: Format, to: Format, document: &Value) -> AppResult<Value> {
    let root = converter_for(from).import(document)?;
    log::debug!("imported {} into the model", from.display_name());
    let exported = converter_for(to).export(&root)?;
    log::debug!("exported the model as {}", to.display_name());
    Ok(exported)
}

/// Converts `raw` from one format token to another.
///
/// Tokens are case-insensitive; `from` may be `auto`.
pub fn convert(from: &str, to: &str, raw: &str, options: &ConvertOptions) -> AppResult<String> {
    if to.trim().eq_ignore_ascii_case(AUTO_TOKEN) {
        return Err(AppError::UnsupportedFormat(
            "'auto' is only valid as a source format".to_string(),
        ));
    }
    let target = resolve_token(to)?;
    let form = options.output.unwrap_or(target.serialization_forms[0]);
    if !target.serialization_forms.contains(&form) {
        return Err(AppError::UnsupportedFormat(format!(
            "{} cannot be written as {}",
            target.display_name, form
        )));
    }
    let source = resolve_source(from, raw)?;

    let document = parse_document(raw, source)?;
    if options.validate {
        validate_document(raw, &document, source)?;
    }
    let exported = convert_document(source, target.format, &document)?;
    serialize_document(&exported, target.format, form)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETS: &str = "#%RAML 1.0
title: Pets
version: v1
/pets:
  get:
    responses:
      200:
        body:
          application/json:
            type: string
";

    #[test]
    fn test_unknown_tokens() {
        let options = ConvertOptions::default();
        let err = convert("raml10", "oas30", PETS, &options).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported format: oas30");
        assert!(matches!(
            convert("wsdl", "swagger", PETS, &options),
            Err(AppError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            convert("raml10", "auto", PETS, &options),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_raml_cannot_be_json() {
        let options = ConvertOptions {
            validate: false,
            output: Some(SerializationForm::Json),
        };
        assert!(matches!(
            convert("swagger", "raml10", "{}", &options),
            Err(AppError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_auto_detection_to_swagger() {
        let text = convert("AUTO", "swagger", PETS, &ConvertOptions::default()).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["swagger"], "2.0");
        assert_eq!(value["info"]["title"], "Pets");
        assert!(value["paths"]["/pets"]["get"]["responses"]["200"].is_object());
    }

    #[test]
    fn test_deprecated_token_still_converts() {
        let text = convert("raml", "raml08", PETS, &ConvertOptions::default()).unwrap();
        assert!(text.starts_with("#%RAML 0.8\n"));
    }

    #[test]
    fn test_validation_runs_before_import() {
        let untitled = "#%RAML 1.0\n/pets: {}\n";
        let err = convert("raml10", "swagger", untitled, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let options = ConvertOptions {
            validate: false,
            output: None,
        };
        assert!(convert("raml10", "swagger", untitled, &options).is_ok());
    }
}
