//! # Annotations
//!
//! Name mapping between Swagger vendor extensions and RAML annotations, plus
//! the registry that synthesizes RAML annotation type declarations on demand.
//!
//! - Swagger `x-NAME` ⇄ model `oas-NAME` ⇄ RAML `(oas-NAME)`.
//! - RAML `(NAME)` ⇄ model `NAME` ⇄ Swagger `x-annotation-NAME`.

use crate::model::{Annotation, AnnotationType};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

/// Prefix of model annotations that came from Swagger extensions.
pub const OAS_PREFIX: &str = "oas-";
/// Swagger prefix for annotations that came from RAML.
pub const SWAGGER_ANNOTATION_PREFIX: &str = "x-annotation-";
/// Swagger root extension holding RAML annotation type declarations.
pub const SWAGGER_ANNOTATION_TYPES: &str = "x-annotation-types";

/// Maps a Swagger object key to a model annotation name, if it is an extension.
pub fn annotation_name_from_extension(key: &str) -> Option<String> {
    if let Some(rest) = key.strip_prefix(SWAGGER_ANNOTATION_PREFIX) {
        if !rest.is_empty() {
            return Some(rest.to_string());
        }
    }
    key.strip_prefix("x-")
        .filter(|rest| !rest.is_empty())
        .map(|rest| format!("{}{}", OAS_PREFIX, rest))
}

/// Maps a model annotation name to a Swagger extension key.
pub fn extension_from_annotation_name(name: &str) -> String {
    match name.strip_prefix(OAS_PREFIX) {
        Some(rest) => format!("x-{}", rest),
        None => format!("{}{}", SWAGGER_ANNOTATION_PREFIX, name),
    }
}

/// Returns the annotation name of a RAML `(name)` key.
pub fn raml_annotation_name(key: &str) -> Option<&str> {
    key.strip_prefix('(')
        .and_then(|k| k.strip_suffix(')'))
        .filter(|k| !k.is_empty())
}

/// Builds an annotation from a raw value, lifting nested `(name)` keys.
pub fn annotation_from_value(name: &str, value: &Value) -> Annotation {
    match value {
        Value::Object(map) => {
            let mut plain = Map::new();
            let mut nested = Vec::new();
            for (k, v) in map {
                match raml_annotation_name(k) {
                    Some(inner) => nested.push(annotation_from_value(inner, v)),
                    None => {
                        plain.insert(k.clone(), v.clone());
                    }
                }
            }
            Annotation {
                name: name.to_string(),
                definition: Value::Object(plain),
                annotations: nested,
            }
        }
        other => Annotation::new(name, other.clone()),
    }
}

/// Inverse of [`annotation_from_value`].
pub fn annotation_to_value(annotation: &Annotation) -> Value {
    if annotation.annotations.is_empty() {
        return annotation.definition.clone();
    }
    let mut map = match &annotation.definition {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    for nested in &annotation.annotations {
        map.insert(format!("({})", nested.name), annotation_to_value(nested));
    }
    Value::Object(map)
}

/// Collects the `x-*` keys of a Swagger object as annotations.
///
/// Keys listed in `reserved` are handled first-class by the caller.
pub fn import_extensions(object: &Value, reserved: &[&str]) -> Vec<Annotation> {
    let Some(map) = object.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter(|(k, _)| !reserved.contains(&k.as_str()) && *k != SWAGGER_ANNOTATION_TYPES)
        .filter_map(|(k, v)| {
            annotation_name_from_extension(k).map(|name| annotation_from_value(&name, v))
        })
        .collect()
}

/// Writes annotations as `x-*` keys.
pub fn export_extensions(map: &mut Map<String, Value>, annotations: &[Annotation]) {
    for annotation in annotations {
        map.insert(
            extension_from_annotation_name(&annotation.name),
            annotation_to_value(annotation),
        );
    }
}

/// Collects the `(name)` keys of a RAML node as annotations.
pub fn import_raml_annotations(object: &Value) -> Vec<Annotation> {
    let Some(map) = object.as_object() else {
        return Vec::new();
    };
    map.iter()
        .filter_map(|(k, v)| raml_annotation_name(k).map(|name| annotation_from_value(name, v)))
        .collect()
}

/// Built-in declaration for annotations synthesized by the converters.
pub fn builtin_declaration(name: &str) -> Value {
    match name {
        "oas-info" => json!({
            "properties": {
                "termsOfService?": "string",
                "contact?": {
                    "properties": {"name?": "string", "url?": "string", "email?": "string"}
                },
                "license?": {
                    "properties": {"name?": "string", "url?": "string"}
                }
            },
            "allowedTargets": "API"
        }),
        "oas-tags-definition" => json!({
            "type": "array",
            "items": {
                "properties": {
                    "name": "string",
                    "description?": "string",
                    "externalDocs?": {
                        "properties": {"url": "string", "description?": "string"}
                    }
                }
            },
            "allowedTargets": "API"
        }),
        "oas-externalDocs" => json!({
            "properties": {"url": "string", "description?": "string"},
            "allowedTargets": ["API", "Method", "TypeDeclaration"]
        }),
        "oas-summary" => json!({"type": "string", "allowedTargets": "Method"}),
        "oas-tags" => json!({"type": "string[]", "allowedTargets": "Method"}),
        "oas-deprecated" => json!({"type": "boolean", "allowedTargets": "Method"}),
        "oas-schemes" => json!({"type": "string[]", "allowedTargets": ["API", "Method"]}),
        "oas-body-name" => json!({"type": "string", "allowedTargets": "TypeDeclaration"}),
        "oas-format" | "oas-collectionFormat" => {
            json!({"type": "string", "allowedTargets": "TypeDeclaration"})
        }
        "oas-allowEmptyValue" | "oas-exclusiveMinimum" | "oas-exclusiveMaximum"
        | "oas-readOnly" => json!({"type": "boolean", "allowedTargets": "TypeDeclaration"}),
        "oas-xml" => json!({"type": "object", "allowedTargets": "TypeDeclaration"}),
        _ => json!("any"),
    }
}

/// Annotation types of the document being written.
///
/// Insertion is idempotent by name; declarations already present in the
/// source document win over synthesized ones.
#[derive(Debug, Default)]
pub struct AnnotationTypeRegistry {
    entries: IndexMap<String, Value>,
}

impl AnnotationTypeRegistry {
    /// Creates a registry pre-seeded with the model's declarations.
    pub fn from_declared(declared: &[AnnotationType]) -> Self {
        let mut registry = Self::default();
        for annotation_type in declared {
            registry
                .entries
                .insert(annotation_type.name.clone(), declaration_value(annotation_type));
        }
        registry
    }

    /// Declares `name` unless it is already declared.
    pub fn ensure(&mut self, name: &str) {
        if !self.entries.contains_key(name) {
            self.entries
                .insert(name.to_string(), builtin_declaration(name));
        }
    }

    /// Declares every annotation of a list (recursively).
    pub fn ensure_all(&mut self, annotations: &[Annotation]) {
        for annotation in annotations {
            self.ensure(&annotation.name);
            self.ensure_all(&annotation.annotations);
        }
    }

    /// Returns true when nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The `annotationTypes` block.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

/// The declaration body written for an annotation type.
pub fn declaration_value(annotation_type: &AnnotationType) -> Value {
    let mut value = annotation_type.definition.clone();
    let has_extras = !annotation_type.allowed_targets.is_empty()
        || annotation_type.display_name.is_some()
        || annotation_type.description.is_some();
    if !has_extras {
        return value;
    }
    if !value.is_object() {
        let mut map = Map::new();
        if !value.is_null() {
            map.insert("type".into(), value);
        }
        value = Value::Object(map);
    }
    if let Value::Object(map) = &mut value {
        if let Some(display) = &annotation_type.display_name {
            map.insert("displayName".into(), Value::String(display.clone()));
        }
        if let Some(desc) = &annotation_type.description {
            map.insert("description".into(), Value::String(desc.clone()));
        }
        if !annotation_type.allowed_targets.is_empty() {
            let targets = if annotation_type.allowed_targets.len() == 1 {
                Value::String(annotation_type.allowed_targets[0].clone())
            } else {
                json!(annotation_type.allowed_targets)
            };
            map.insert("allowedTargets".into(), targets);
        }
    }
    value
}

/// Parses one `annotationTypes` entry.
pub fn import_annotation_type(name: &str, value: &Value) -> AnnotationType {
    let mut definition = value.clone();
    let mut allowed_targets = Vec::new();
    let mut display_name = None;
    let mut description = None;
    if let Value::Object(map) = &mut definition {
        allowed_targets = crate::converters::json::string_list(map.get("allowedTargets"));
        map.shift_remove("allowedTargets");
        display_name = map
            .shift_remove("displayName")
            .and_then(|v| v.as_str().map(str::to_string));
        description = map
            .shift_remove("description")
            .and_then(|v| v.as_str().map(str::to_string));
        if map.len() == 1 {
            if let Some(Value::String(t)) = map.get("type") {
                definition = Value::String(t.clone());
            }
        } else if map.is_empty() {
            definition = Value::Null;
        }
    }
    AnnotationType {
        name: name.to_string(),
        definition,
        allowed_targets,
        display_name,
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_name_mapping_round_trips() {
        assert_eq!(annotation_name_from_extension("x-foo").as_deref(), Some("oas-foo"));
        assert_eq!(extension_from_annotation_name("oas-foo"), "x-foo");
        assert_eq!(
            annotation_name_from_extension("x-annotation-rating").as_deref(),
            Some("rating")
        );
        assert_eq!(extension_from_annotation_name("rating"), "x-annotation-rating");
        assert_eq!(annotation_name_from_extension("title"), None);
    }

    #[test]
    fn test_nested_annotations_round_trip() {
        let raw = json!({"level": 3, "(note)": {"text": "hi"}});
        let annotation = annotation_from_value("rating", &raw);
        assert_eq!(annotation.definition, json!({"level": 3}));
        assert_eq!(annotation.annotations[0].name, "note");
        assert_eq!(annotation_to_value(&annotation), raw);
    }

    #[test]
    fn test_registry_is_idempotent() {
        let mut registry = AnnotationTypeRegistry::default();
        registry.ensure("oas-summary");
        registry.ensure("oas-summary");
        registry.ensure_all(&[Annotation::new("oas-summary", json!("x"))]);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.to_value(),
            json!({"oas-summary": {"type": "string", "allowedTargets": "Method"}})
        );
    }

    #[test]
    fn test_declared_types_win_over_builtin() {
        let declared = vec![AnnotationType {
            name: "oas-summary".into(),
            definition: json!("string"),
            allowed_targets: vec![],
            display_name: None,
            description: None,
        }];
        let mut registry = AnnotationTypeRegistry::from_declared(&declared);
        registry.ensure("oas-summary");
        assert_eq!(registry.to_value(), json!({"oas-summary": "string"}));
    }

    #[test]
    fn test_import_annotation_type_round_trip() {
        let raw = json!({"type": "string", "allowedTargets": ["Method", "Resource"]});
        let parsed = import_annotation_type("owner", &raw);
        assert_eq!(parsed.definition, json!("string"));
        assert_eq!(parsed.allowed_targets, vec!["Method", "Resource"]);
        assert_eq!(declaration_value(&parsed), raw);
    }

    #[test]
    fn test_import_extensions_skips_reserved() {
        let raw = json!({"x-a": 1, "x-facets": {}, "title": "t"});
        let annotations = import_extensions(&raw, &["x-facets"]);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].name, "oas-a");
    }
}
