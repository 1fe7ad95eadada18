//! # Parameter Converter
//!
//! Non-body parameters, body parameters and response header objects.
//! Non-body parameters carry their schema inline (`type`, `format`, `items`,
//! constraints), so the definition is read from and written to the same map.

use super::definition::{
    decode_pointer_segment, encode_pointer_segment, export_schema, import_schema,
    DEFINITIONS_PREFIX, RESERVED_EXTENSIONS,
};
use super::PARAMETERS_PREFIX;
use crate::converters::annotations::{export_extensions, import_extensions};
use crate::converters::json::{get_bool, get_str, insert_opt};
use crate::error::{AppError, AppResult};
use crate::model::{Body, Definition, InternalType, Parameter, ParameterLocation, Root};
use serde_json::{json, Map, Value};

const X_DISPLAY_NAME: &str = "x-displayName";
const X_REPEAT: &str = "x-repeat";

/// Keys of a parameter object that are not part of its inline schema.
const PARAMETER_KEYS: [&str; 7] = [
    "name",
    "in",
    "required",
    "description",
    "collectionFormat",
    "allowEmptyValue",
    "schema",
];

fn own_extensions() -> Vec<&'static str> {
    let mut reserved: Vec<&str> = RESERVED_EXTENSIONS.to_vec();
    reserved.push(X_DISPLAY_NAME);
    reserved.push(X_REPEAT);
    reserved
}

/// Splits a parameter object into its inline schema.
fn schema_part(value: &Value) -> Value {
    let Some(map) = value.as_object() else {
        return Value::Object(Map::new());
    };
    let schema: Map<String, Value> = map
        .iter()
        .filter(|(k, _)| !PARAMETER_KEYS.contains(&k.as_str()))
        .filter(|(k, _)| !k.starts_with("x-") || RESERVED_EXTENSIONS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Value::Object(schema)
}

/// Returns the shared parameter key a `$ref` points at.
pub(crate) fn parameter_ref_key(reference: &str) -> String {
    decode_pointer_segment(reference.strip_prefix(PARAMETERS_PREFIX).unwrap_or(reference))
}

/// Reads a non-body parameter.
pub(crate) fn import_parameter(value: &Value) -> AppResult<Parameter> {
    let name = get_str(value, "name").unwrap_or_default();
    let location_token = get_str(value, "in").unwrap_or_default();
    let location: ParameterLocation = location_token
        .parse()
        .map_err(|e: String| AppError::Validation(format!("parameter '{}': {}", name, e)))?;

    let definition = import_schema(&schema_part(value))?;
    Ok(Parameter {
        display_name: get_str(value, X_DISPLAY_NAME),
        description: get_str(value, "description"),
        collection_format: get_str(value, "collectionFormat"),
        allow_empty_value: get_bool(value, "allowEmptyValue"),
        repeat: get_bool(value, X_REPEAT),
        annotations: import_extensions(value, &own_extensions()),
        ..Parameter::new(
            name,
            location,
            definition,
            get_bool(value, "required").unwrap_or(location == ParameterLocation::Path),
        )
    })
}

/// Reads an `in: body` parameter.
pub(crate) fn import_body_parameter(value: &Value) -> AppResult<Body> {
    let schema = value.get("schema").cloned().unwrap_or_else(|| json!({}));
    Ok(Body {
        mime_type: None,
        description: get_str(value, "description"),
        definition: Some(import_schema(&schema)?),
        required: get_bool(value, "required").unwrap_or(false),
        name: get_str(value, "name"),
        annotations: import_extensions(value, &[]),
    })
}

/// Reads a response header object.
pub(crate) fn import_header(name: &str, value: &Value) -> AppResult<Parameter> {
    let definition = import_schema(&schema_part(value))?;
    Ok(Parameter {
        display_name: get_str(value, X_DISPLAY_NAME),
        description: get_str(value, "description"),
        collection_format: get_str(value, "collectionFormat"),
        annotations: import_extensions(value, &own_extensions()),
        ..Parameter::new(name, ParameterLocation::Header, definition, false)
    })
}

/// Picks a definition Swagger can write inline on a non-body parameter.
fn inline_definition(definition: Option<&Definition>, root: &Root, owner: &str) -> Definition {
    let Some(def) = definition else {
        return Definition::of_type(InternalType::String);
    };
    let resolved = match &def.reference {
        Some(name) => match root.find_type(name) {
            Some(target) => target.clone(),
            None => {
                log::warn!("parameter '{}' points at unknown type '{}', using string", owner, name);
                return Definition::of_type(InternalType::String);
            }
        },
        None => def.clone(),
    };
    let structured = !resolved.properties.is_empty()
        || !resolved.composition_type.is_empty()
        || !resolved.union_type.is_empty()
        || resolved.reference.is_some()
        || resolved.internal_type == Some(InternalType::Object);
    if structured {
        log::warn!("parameter '{}' has a structured type, written as string", owner);
        return Definition {
            description: resolved.description,
            ..Definition::of_type(InternalType::String)
        };
    }
    Definition {
        name: None,
        ..resolved
    }
}

fn write_inline_schema(
    map: &mut Map<String, Value>,
    definition: Option<&Definition>,
    description: Option<&String>,
    root: &Root,
    owner: &str,
) {
    let def = inline_definition(definition, root, owner);
    let schema = export_schema(&def, DEFINITIONS_PREFIX);
    let Value::Object(mut schema) = schema else {
        return;
    };
    let schema_description = schema.shift_remove("description");
    match description {
        Some(desc) => {
            map.insert("description".into(), Value::String(desc.clone()));
        }
        None => insert_opt(map, "description", schema_description),
    }
    schema.shift_remove("title");
    for (k, v) in schema {
        map.insert(k, v);
    }
}

/// Writes a non-body parameter, or a `$ref` to a shared one.
pub(crate) fn export_parameter(param: &Parameter, root: &Root) -> Value {
    if let Some(reference) = &param.reference {
        let pointer = format!("{}{}", PARAMETERS_PREFIX, encode_pointer_segment(reference));
        return json!({ "$ref": pointer });
    }
    let mut map = Map::new();
    map.insert("name".into(), Value::String(param.name.clone()));
    map.insert("in".into(), Value::String(param.location.as_str().into()));
    if param.location == ParameterLocation::Path || param.required {
        map.insert("required".into(), Value::Bool(true));
    }
    write_inline_schema(
        &mut map,
        param.definition.as_ref(),
        param.description.as_ref(),
        root,
        &param.name,
    );
    insert_opt(&mut map, "collectionFormat", param.collection_format.clone());
    insert_opt(&mut map, "allowEmptyValue", param.allow_empty_value);
    insert_opt(&mut map, X_DISPLAY_NAME, param.display_name.clone());
    insert_opt(&mut map, X_REPEAT, param.repeat);
    export_extensions(&mut map, &param.annotations);
    Value::Object(map)
}

/// Writes a response header object.
pub(crate) fn export_header(header: &Parameter, root: &Root) -> Value {
    let mut map = Map::new();
    write_inline_schema(
        &mut map,
        header.definition.as_ref(),
        header.description.as_ref(),
        root,
        &header.name,
    );
    insert_opt(&mut map, "collectionFormat", header.collection_format.clone());
    insert_opt(&mut map, X_DISPLAY_NAME, header.display_name.clone());
    export_extensions(&mut map, &header.annotations);
    Value::Object(map)
}

/// Writes an `in: body` parameter.
pub(crate) fn export_body_parameter(body: &Body) -> Value {
    let mut map = Map::new();
    map.insert(
        "name".into(),
        Value::String(body.name.clone().unwrap_or_else(|| "body".to_string())),
    );
    map.insert("in".into(), Value::String("body".into()));
    insert_opt(&mut map, "description", body.description.clone());
    if body.required {
        map.insert("required".into(), Value::Bool(true));
    }
    let schema = match &body.definition {
        Some(def) => export_schema(def, DEFINITIONS_PREFIX),
        None => json!({}),
    };
    map.insert("schema".into(), schema);
    export_extensions(&mut map, &body.annotations);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_path_parameter_defaults_to_required() {
        let raw = json!({"name": "id", "in": "path", "type": "string"});
        let param = import_parameter(&raw).unwrap();
        assert!(param.required);
        assert_eq!(
            export_parameter(&param, &Root::default()),
            json!({"name": "id", "in": "path", "required": true, "type": "string"})
        );
    }

    #[test]
    fn test_query_parameter_defaults_to_optional() {
        let raw = json!({
            "name": "q",
            "in": "query",
            "type": "integer",
            "format": "int32",
            "minimum": 1
        });
        let param = import_parameter(&raw).unwrap();
        assert!(!param.required);
        let def = param.definition.as_ref().unwrap();
        assert_eq!(def.internal_type, Some(InternalType::Int32));
        assert_eq!(export_parameter(&param, &Root::default()), raw);
    }

    #[test]
    fn test_unknown_location_is_rejected() {
        let raw = json!({"name": "c", "in": "cookie", "type": "string"});
        assert!(matches!(import_parameter(&raw), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_extensions_stay_on_parameter() {
        let raw = json!({
            "name": "q",
            "in": "query",
            "type": "string",
            "x-internal": true,
            "x-minimum": 2
        });
        let param = import_parameter(&raw).unwrap();
        assert_eq!(param.annotations.len(), 1);
        assert_eq!(param.annotations[0].name, "oas-internal");
        assert!(param.definition.as_ref().unwrap().minimum.is_some());
    }

    #[test]
    fn test_structured_type_falls_back_to_string() {
        let mut param = Parameter::new(
            "filter",
            ParameterLocation::Query,
            Definition::reference("Filter"),
            false,
        );
        param.description = Some("f".into());
        let mut filter = Definition::of_type(InternalType::Object);
        filter.name = Some("Filter".into());
        filter
            .properties
            .insert("a".into(), Definition::of_type(InternalType::String));
        let root = Root {
            types: vec![filter],
            ..Default::default()
        };
        assert_eq!(
            export_parameter(&param, &root),
            json!({"name": "filter", "in": "query", "description": "f", "type": "string"})
        );
    }

    #[test]
    fn test_body_parameter() {
        let raw = json!({
            "name": "pet",
            "in": "body",
            "required": true,
            "schema": {"$ref": "#/definitions/Pet"}
        });
        let body = import_body_parameter(&raw).unwrap();
        assert!(body.required);
        assert_eq!(body.name.as_deref(), Some("pet"));
        assert_eq!(export_body_parameter(&body), raw);
    }

    #[test]
    fn test_reference_export() {
        let param =
            Parameter::reference_to("page", ParameterLocation::Query, "trait:paged:page", false);
        assert_eq!(
            export_parameter(&param, &Root::default()),
            json!({"$ref": "#/parameters/trait:paged:page"})
        );
        assert_eq!(parameter_ref_key("#/parameters/trait:paged:page"), "trait:paged:page");
    }
}
