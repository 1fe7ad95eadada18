//! # Document Loader
//!
//! Text in, `serde_json::Value` out (and back). YAML is read through
//! `serde_yaml` and normalized into the same JSON tree the converters walk,
//! so both families share one document representation.

use crate::error::{AppError, AppResult};
use crate::formats::{Format, SerializationForm};
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::OnceLock;

/// Matches the `#%RAML <version>` header on the first line.
fn raml_header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#%RAML[ \t]+(0\.8|1\.0)\b").expect("Invalid regex"))
}

/// Matches a top-level `swagger:` key in YAML text.
fn swagger_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?m)^["']?swagger["']?[ \t]*:"#).expect("Invalid regex"))
}

/// Reads the RAML version from the header line, if any.
pub fn raml_version(raw: &str) -> Option<Format> {
    let caps = raml_header_regex().captures(raw.trim_start_matches('\u{feff}'))?;
    match caps.get(1)?.as_str() {
        "0.8" => Some(Format::Raml08),
        _ => Some(Format::Raml10),
    }
}

/// Sniffs the format of a document.
///
/// JSON input (`{` prefix) belongs to the Swagger family. YAML input is
/// RAML when it carries a version header, Swagger when it has a
/// top-level `swagger:` key.
pub fn detect_format(raw: &str) -> AppResult<Format> {
    let text = raw.trim_start_matches('\u{feff}').trim_start();
    if text.starts_with('{') {
        return Ok(Format::Swagger);
    }
    if let Some(version) = raml_version(text) {
        return Ok(version);
    }
    if swagger_key_regex().is_match(text) {
        return Ok(Format::Swagger);
    }
    Err(AppError::UnsupportedFormat(
        "unable to detect the input format".to_string(),
    ))
}

/// Parses a document of the given format into a JSON tree.
pub fn parse_document(raw: &str, format: Format) -> AppResult<Value> {
    let text = raw.trim_start_matches('\u{feff}');
    if format.is_raml() {
        if let Some(found) = raml_version(text) {
            if found != format {
                log::warn!(
                    "document declares {} but is read as {}",
                    found.display_name(),
                    format.display_name()
                );
            }
        }
    }

    let document = if text.trim_start().starts_with('{') {
        serde_json::from_str(text).map_err(|e| AppError::parse(format.display_name(), e))?
    } else {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| AppError::parse(format.display_name(), e))?;
        yaml_to_json(yaml)
    };
    match document {
        Value::Object(_) => Ok(document),
        Value::Null => Err(AppError::parse(format.display_name(), "document is empty")),
        _ => Err(AppError::parse(
            format.display_name(),
            "document root is not a mapping",
        )),
    }
}

/// Converts a YAML tree into the JSON tree the converters expect.
///
/// Mapping keys are stringified (`200:` becomes `"200"`) and tags are
/// dropped in favour of the tagged value.
pub fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => yaml_number(&n),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(yaml_key(key), yaml_to_json(value));
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        return Value::Number(i.into());
    }
    if let Some(u) = n.as_u64() {
        return Value::Number(u.into());
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Writes a document tree as text. RAML output gets its version header.
pub fn serialize_document(
    document: &Value,
    format: Format,
    form: SerializationForm,
) -> AppResult<String> {
    let body = match form {
        SerializationForm::Json => serde_json::to_string_pretty(document)
            .map_err(|e| AppError::General(format!("Failed to write JSON: {}", e)))?,
        SerializationForm::Yaml => serde_yaml::to_string(document)
            .map_err(|e| AppError::General(format!("Failed to write YAML: {}", e)))?,
    };
    Ok(match format {
        Format::Raml08 => format!("#%RAML 0.8\n{}", body),
        Format::Raml10 => format!("#%RAML 1.0\n{}", body),
        Format::Swagger => body,
    })
}
