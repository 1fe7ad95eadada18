//! # Structural Validation
//!
//! Checks run on the parsed tree before import when validation is enabled.
//! Every problem is collected, then reported as one `AppError::Validation`.

use crate::error::{AppError, AppResult};
use crate::formats::Format;
use crate::loader::raml_version;
use crate::model::HttpMethod;
use serde_json::Value;

/// Keys a RAML resource may carry besides methods, child resources and annotations.
const RESOURCE_KEYS: [&str; 8] = [
    "displayName",
    "description",
    "type",
    "is",
    "securedBy",
    "uriParameters",
    "baseUriParameters",
    "usage",
];

/// Verbs RAML 0.8 accepts that the model does not carry.
const RAML08_EXTRA_VERBS: [&str; 2] = ["trace", "connect"];

/// Validates a parsed document. `raw` is the source text (needed for the RAML header).
pub fn validate_document(raw: &str, document: &Value, format: Format) -> AppResult<()> {
    let problems = match format {
        Format::Swagger => swagger_problems(document),
        Format::Raml08 | Format::Raml10 => raml_problems(raw, document, format),
    };
    if problems.is_empty() {
        return Ok(());
    }
    Err(AppError::Validation(problems.join("; ")))
}

fn swagger_problems(doc: &Value) -> Vec<String> {
    let mut problems = Vec::new();
    match doc.get("swagger") {
        Some(Value::String(v)) if v == "2.0" => {}
        Some(other) => problems.push(format!("unsupported swagger version {}", other)),
        None => problems.push("missing 'swagger' field".to_string()),
    }
    match doc.get("info") {
        Some(info @ Value::Object(_)) => {
            if !info.get("title").is_some_and(Value::is_string) {
                problems.push("missing 'info.title'".to_string());
            }
            if info.get("version").map_or(true, Value::is_null) {
                problems.push("missing 'info.version'".to_string());
            }
        }
        _ => problems.push("missing 'info' object".to_string()),
    }
    let Some(paths) = doc.get("paths").and_then(Value::as_object) else {
        problems.push("missing 'paths' object".to_string());
        return problems;
    };
    for (path, item) in paths {
        if path.starts_with("x-") {
            continue;
        }
        if !path.starts_with('/') {
            problems.push(format!("path '{}' must start with '/'", path));
        }
        let Some(item) = item.as_object() else { continue };
        check_swagger_parameters(item.get("parameters"), path, &mut problems);
        for (key, operation) in item {
            if key.parse::<HttpMethod>().is_ok() {
                let location = format!("{} {}", key, path);
                check_swagger_parameters(operation.get("parameters"), &location, &mut problems);
            }
        }
    }
    problems
}

fn check_swagger_parameters(
    parameters: Option<&Value>,
    location: &str,
    problems: &mut Vec<String>,
) {
    let Some(Value::Array(parameters)) = parameters else {
        return;
    };
    for param in parameters {
        if param.get("$ref").is_some() {
            continue;
        }
        let name = param.get("name").and_then(Value::as_str);
        let position = param.get("in").and_then(Value::as_str);
        let (Some(name), Some(position)) = (name, position) else {
            problems.push(format!("parameter in '{}' needs 'name' and 'in'", location));
            continue;
        };
        if position == "path" && param.get("required") == Some(&Value::Bool(false)) {
            problems.push(format!("path parameter '{}' in '{}' must be required", name, location));
        }
    }
}

fn raml_problems(raw: &str, doc: &Value, format: Format) -> Vec<String> {
    let mut problems = Vec::new();
    match raml_version(raw) {
        None => problems.push("missing '#%RAML' version header".to_string()),
        Some(found) if found != format => problems.push(format!(
            "document declares {} but {} was requested",
            found.display_name(),
            format.display_name()
        )),
        Some(_) => {}
    }
    let has_title = match doc.get("title") {
        Some(Value::String(title)) => !title.trim().is_empty(),
        Some(Value::Object(node)) => node.contains_key("value"),
        _ => false,
    };
    if !has_title {
        problems.push("missing 'title'".to_string());
    }
    if let Some(root) = doc.as_object() {
        for (key, node) in root.iter().filter(|(k, _)| k.starts_with('/')) {
            check_raml_resource(key, node, format, &mut problems);
        }
    }
    problems
}

fn check_raml_resource(path: &str, node: &Value, format: Format, problems: &mut Vec<String>) {
    let Some(map) = node.as_object() else {
        if !node.is_null() {
            problems.push(format!("resource '{}' must be a mapping", path));
        }
        return;
    };
    for (key, value) in map {
        if key.starts_with('/') {
            let child = format!("{}{}", path.trim_end_matches('/'), key);
            check_raml_resource(&child, value, format, problems);
        } else if !is_resource_key(key, format) {
            problems.push(format!("unknown key '{}' in resource '{}'", key, path));
        }
    }
}

fn is_resource_key(key: &str, format: Format) -> bool {
    if RESOURCE_KEYS.contains(&key) || key.parse::<HttpMethod>().is_ok() {
        return true;
    }
    if format == Format::Raml08 {
        RAML08_EXTRA_VERBS.contains(&key)
    } else {
        key.starts_with('(') && key.ends_with(')')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_swagger() {
        let doc = json!({
            "swagger": "2.0",
            "info": {"title": "Pets", "version": "1"},
            "paths": {"/pets/{id}": {"get": {"parameters": [
                {"name": "id", "in": "path", "type": "string"}
            ]}}}
        });
        assert!(validate_document("", &doc, Format::Swagger).is_ok());
    }

    #[test]
    fn test_swagger_problems_are_collected() {
        let doc = json!({
            "swagger": "3.0",
            "info": {"title": "Pets"},
            "paths": {
                "pets": {},
                "/a/{id}": {"get": {"parameters": [
                    {"name": "id", "in": "path", "required": false},
                    {"in": "query"}
                ]}}
            }
        });
        let err = validate_document("", &doc, Format::Swagger).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unsupported swagger version"));
        assert!(message.contains("missing 'info.version'"));
        assert!(message.contains("path 'pets' must start with '/'"));
        assert!(message.contains("path parameter 'id'"));
        assert!(message.contains("needs 'name' and 'in'"));
    }

    #[test]
    fn test_raml_header_and_title() {
        let doc = json!({"/pets": {"get": null}});
        let err = validate_document("title: x", &doc, Format::Raml10).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("version header"));
        assert!(message.contains("missing 'title'"));
    }

    #[test]
    fn test_raml_unknown_verb() {
        let doc = json!({
            "title": "A",
            "/pets": {"fetch": {}, "/{id}": {"get": {}, "(audit)": true}}
        });
        let err = validate_document("#%RAML 1.0\n", &doc, Format::Raml10).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation Error: unknown key 'fetch' in resource '/pets'"
        );
    }

    #[test]
    fn test_raml08_accepts_trace() {
        let doc = json!({"title": "A", "/pets": {"trace": {}}});
        assert!(validate_document("#%RAML 0.8\n", &doc, Format::Raml08).is_ok());
    }
}
