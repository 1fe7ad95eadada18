//! # Named Parameter Converter
//!
//! Query / header / URI / form parameters. RAML 1.0 declares them as type
//! declarations; RAML 0.8 uses named parameters with a fixed facet set.

use super::definition::{export_type, import_type, ImportContext};
use super::ExportContext;
use crate::converters::json::{get_bool, get_number, get_str, get_u64, insert_opt, named_entries};
use crate::converters::types::{fallback_type, to_internal};
use crate::error::AppResult;
use crate::formats::Format;
use crate::model::{take_annotation, Definition, InternalType, Parameter, ParameterLocation};
use serde_json::{json, Map, Value};

const COLLECTION_FORMAT: &str = "oas-collectionFormat";
const ALLOW_EMPTY_VALUE: &str = "oas-allowEmptyValue";

/// The `required` value a parameter has when the key is absent.
pub(crate) fn default_required(version: Format, location: ParameterLocation) -> bool {
    match version {
        Format::Raml08 => location == ParameterLocation::Path,
        _ => true,
    }
}

/// Reads a parameter block (`queryParameters`, `headers`, `uriParameters`, ...).
pub(crate) fn import_parameters(
    block: Option<&Value>,
    location: ParameterLocation,
    ctx: &mut ImportContext,
) -> AppResult<Vec<Parameter>> {
    let mut params = Vec::new();
    for (key, value) in named_entries(block) {
        params.push(import_parameter(&key, &value, location, ctx)?);
    }
    Ok(params)
}

/// Reads one parameter declaration.
pub(crate) fn import_parameter(
    key: &str,
    value: &Value,
    location: ParameterLocation,
    ctx: &mut ImportContext,
) -> AppResult<Parameter> {
    if ctx.version == Format::Raml08 {
        return Ok(import_named_parameter(key, value, location));
    }

    let (name, optional) = match key.strip_suffix('?') {
        Some(stripped) if location != ParameterLocation::Path => (stripped.to_string(), true),
        _ => (key.to_string(), false),
    };
    let mut definition = import_type(value, ctx)?;
    let required = get_bool(value, "required")
        .unwrap_or(!optional && default_required(ctx.version, location));
    let mut param = Parameter::new(name, location, Definition::default(), required);
    param.display_name = definition.title.take();
    param.description = definition.description.take();
    param.collection_format = take_annotation(&mut definition.annotations, COLLECTION_FORMAT)
        .and_then(|a| a.definition.as_str().map(str::to_string));
    param.allow_empty_value = take_annotation(&mut definition.annotations, ALLOW_EMPTY_VALUE)
        .and_then(|a| a.definition.as_bool());
    param.annotations = std::mem::take(&mut definition.annotations);
    param.definition = Some(definition);
    Ok(param)
}

/// Reads a RAML 0.8 named parameter. A list of alternatives keeps the first.
fn import_named_parameter(key: &str, value: &Value, location: ParameterLocation) -> Parameter {
    let value = match value {
        Value::Array(alternatives) => {
            if alternatives.len() > 1 {
                log::warn!(
                    "parameter '{}' declares {} types, keeping the first",
                    key,
                    alternatives.len()
                );
            }
            alternatives.first().cloned().unwrap_or(Value::Null)
        }
        other => other.clone(),
    };
    let type_name = get_str(&value, "type").unwrap_or_else(|| "string".to_string());
    let mapping = to_internal(Format::Raml08, &type_name, None);
    let mut definition = Definition::of_type(mapping.internal_type);
    definition.pattern = get_str(&value, "pattern");
    definition.min_length = get_u64(&value, "minLength");
    definition.max_length = get_u64(&value, "maxLength");
    definition.minimum = get_number(&value, "minimum");
    definition.maximum = get_number(&value, "maximum");
    definition.default = value.get("default").cloned();
    definition.example = value.get("example").cloned();
    if let Some(Value::Array(values)) = value.get("enum") {
        definition.enum_values = values.clone();
    }

    let required =
        get_bool(&value, "required").unwrap_or(default_required(Format::Raml08, location));
    let mut param = Parameter::new(key, location, definition, required);
    param.display_name = get_str(&value, "displayName");
    param.description = get_str(&value, "description");
    param.repeat = get_bool(&value, "repeat");
    param
}

/// Writes a parameter block.
pub(crate) fn export_parameters(
    params: &[Parameter],
    ctx: &mut ExportContext<'_>,
) -> Map<String, Value> {
    let mut block = Map::new();
    for param in params {
        let value = export_parameter(param, ctx);
        block.insert(param.name.clone(), value);
    }
    block
}

/// Writes one parameter declaration.
pub(crate) fn export_parameter(param: &Parameter, ctx: &mut ExportContext<'_>) -> Value {
    if !ctx.is_v10() {
        return export_named_parameter(param);
    }
    let definition = param
        .definition
        .clone()
        .unwrap_or_else(|| Definition::of_type(InternalType::String));
    let mut map = match export_type(&definition, ctx) {
        Value::Object(map) => map,
        compact => {
            let mut map = Map::new();
            map.insert("type".into(), compact);
            map
        }
    };
    if let Some(display) = &param.display_name {
        map.insert("displayName".into(), Value::String(display.clone()));
    }
    if let Some(desc) = &param.description {
        map.insert("description".into(), Value::String(desc.clone()));
    }
    let required = param.required || param.location == ParameterLocation::Path;
    if required != default_required(ctx.version, param.location) {
        map.insert("required".into(), Value::Bool(required));
    }
    if let Some(format) = &param.collection_format {
        ctx.write_annotation(&mut map, COLLECTION_FORMAT, Value::String(format.clone()));
    }
    if let Some(allow) = param.allow_empty_value {
        ctx.write_annotation(&mut map, ALLOW_EMPTY_VALUE, Value::Bool(allow));
    }
    ctx.write_annotations(&mut map, &param.annotations);

    if map.len() == 1 {
        if let Some(Value::String(compact)) = map.get("type") {
            return Value::String(compact.clone());
        }
    }
    Value::Object(map)
}

/// Writes a RAML 0.8 named parameter. Arrays become repeated parameters of
/// their item type.
fn export_named_parameter(param: &Parameter) -> Value {
    let fallback = Definition::of_type(InternalType::String);
    let mut definition = param.definition.as_ref().unwrap_or(&fallback);
    let mut repeat = param.repeat;
    if definition.internal_type == Some(InternalType::Array) {
        if let Some(items) = &definition.items {
            definition = items.as_ref();
            repeat = Some(true);
        }
    }

    let mut map = Map::new();
    let type_name = match definition.internal_type {
        Some(InternalType::Object) | Some(InternalType::Array) | None => {
            log::warn!(
                "RAML 0.8 parameter '{}' has no structured types, writing string",
                param.name
            );
            "string"
        }
        Some(t) => fallback_type(Format::Raml08, t),
    };
    map.insert("type".into(), json!(type_name));
    insert_opt(&mut map, "displayName", param.display_name.clone());
    let description = param
        .description
        .clone()
        .or_else(|| definition.description.clone());
    insert_opt(&mut map, "description", description);
    if !definition.enum_values.is_empty() {
        map.insert("enum".into(), Value::Array(definition.enum_values.clone()));
    }
    insert_opt(&mut map, "pattern", definition.pattern.clone());
    insert_opt(&mut map, "minLength", definition.min_length);
    insert_opt(&mut map, "maxLength", definition.max_length);
    insert_opt(&mut map, "minimum", definition.minimum.clone());
    insert_opt(&mut map, "maximum", definition.maximum.clone());
    insert_opt(&mut map, "default", definition.default.clone());
    insert_opt(&mut map, "example", definition.example.clone());
    insert_opt(&mut map, "repeat", repeat);
    let required = param.required || param.location == ParameterLocation::Path;
    if required != default_required(Format::Raml08, param.location) {
        map.insert("required".into(), Value::Bool(required));
    }
    Value::Object(map)
}
