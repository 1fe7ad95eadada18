//! # Schema Converter
//!
//! Swagger 2.0 Schema Objects ⇄ [`Definition`]. The same code reads and
//! writes the JSON Schema (draft 4) documents embedded in RAML, so it is
//! parameterized by the `$ref` prefix only.
//!
//! RAML-only constructs survive as `x-*` keys (`x-facets`, `x-union`, ...)
//! that import recognizes and restores first-class.

use crate::converters::annotations::{export_extensions, import_extensions};
use crate::converters::json::{
    get_bool, get_number, get_str, get_u64, insert_opt, scalar_to_string, string_list,
};
use crate::converters::types::{fallback_type, from_internal, to_internal};
use crate::error::AppResult;
use crate::formats::Format;
use crate::model::{AdditionalProperties, Definition, ExternalDocs, InternalType};
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use serde_json::{json, Map, Number, Value};

/// `$ref` prefix of Swagger definitions.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

const X_FACETS: &str = "x-facets";
const X_FIXED_FACETS: &str = "x-fixedFacets";
const X_UNION: &str = "x-union";
const X_SCHEMA: &str = "x-schema";
const X_DISCRIMINATOR_VALUE: &str = "x-discriminatorValue";
const X_FILE_TYPES: &str = "x-fileTypes";
const X_EXAMPLES: &str = "x-examples";
const X_PATTERN_PROPERTY: &str = "x-patternProperty";

/// Constraints that only make sense on some types; elsewhere they travel as `x-<name>`.
const NUMERIC_CONSTRAINTS: [&str; 3] = ["minimum", "maximum", "multipleOf"];
const EXCLUSIVE_BOUNDS: [&str; 2] = ["exclusiveMinimum", "exclusiveMaximum"];
const STRING_CONSTRAINTS: [&str; 3] = ["minLength", "maxLength", "pattern"];
const ARRAY_CONSTRAINTS: [&str; 3] = ["minItems", "maxItems", "uniqueItems"];

pub(crate) const RESERVED_EXTENSIONS: [&str; 19] = [
    X_FACETS,
    X_FIXED_FACETS,
    X_UNION,
    X_SCHEMA,
    X_DISCRIMINATOR_VALUE,
    X_FILE_TYPES,
    X_EXAMPLES,
    X_PATTERN_PROPERTY,
    "x-minimum",
    "x-maximum",
    "x-multipleOf",
    "x-exclusiveMinimum",
    "x-exclusiveMaximum",
    "x-minLength",
    "x-maxLength",
    "x-pattern",
    "x-minItems",
    "x-maxItems",
    "x-uniqueItems",
];

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent escapes).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Encodes a name for use as a JSON Pointer segment.
pub(crate) fn encode_pointer_segment(name: &str) -> String {
    name.replace('~', "~0").replace('/', "~1")
}

/// Extracts the type name a `$ref` points at.
///
/// `#/definitions/Pet` gives `Pet`; a bare name (RAML 0.8 schema reference)
/// is returned unchanged.
pub(crate) fn ref_name(reference: &str) -> String {
    if let Some(rest) = reference.strip_prefix(DEFINITIONS_PREFIX) {
        return decode_pointer_segment(rest);
    }
    match reference.rsplit_once('/') {
        Some((_, last)) if reference.contains('#') => decode_pointer_segment(last),
        _ => reference.to_string(),
    }
}

/// Reads a Schema Object.
pub fn import_schema(value: &Value) -> AppResult<Definition> {
    let Some(map) = value.as_object() else {
        // Boolean schemas (`true`) accept anything.
        return Ok(Definition::default());
    };

    let mut def = Definition {
        title: get_str(value, "title"),
        description: get_str(value, "description"),
        default: map.get("default").cloned(),
        example: map.get("example").cloned(),
        examples: map.get(X_EXAMPLES).cloned(),
        enum_values: map
            .get("enum")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        discriminator: get_str(value, "discriminator"),
        discriminator_value: map.get(X_DISCRIMINATOR_VALUE).cloned(),
        read_only: get_bool(value, "readOnly"),
        xml: map.get("xml").cloned(),
        file_types: string_list(map.get(X_FILE_TYPES)),
        schema_source: get_str(value, X_SCHEMA),
        external_docs: import_external_docs(map.get("externalDocs")),
        exclusive_minimum: get_bool(value, "exclusiveMinimum")
            .or_else(|| get_bool(value, "x-exclusiveMinimum")),
        exclusive_maximum: get_bool(value, "exclusiveMaximum")
            .or_else(|| get_bool(value, "x-exclusiveMaximum")),
        annotations: import_extensions(value, &RESERVED_EXTENSIONS),
        ..Default::default()
    };
    import_constraints(value, &mut def);

    if let Some(Value::Object(facets)) = map.get(X_FACETS) {
        def.facets = facets.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    }
    if let Some(Value::Object(fixed)) = map.get(X_FIXED_FACETS) {
        def.fixed_facets = fixed.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    }

    if let Some(Value::Object(props)) = map.get("properties") {
        for (name, prop) in props {
            let mut prop_def = import_schema(prop)?;
            prop_def.name = Some(name.clone());
            def.properties.insert(name.clone(), prop_def);
        }
    }
    for name in string_list(map.get("required")) {
        def.mark_required(&name);
    }

    match map.get("additionalProperties") {
        Some(Value::Bool(b)) => def.additional_properties = Some(AdditionalProperties::Allowed(*b)),
        Some(schema @ Value::Object(_)) => {
            let mut typed = import_schema(schema)?;
            typed.name = get_str(value, X_PATTERN_PROPERTY);
            def.additional_properties = Some(AdditionalProperties::Typed(Box::new(typed)));
        }
        _ => {}
    }

    match map.get("items") {
        Some(items @ Value::Object(_)) => def.items = Some(Box::new(import_schema(items)?)),
        Some(Value::Array(tuple)) => {
            if let Some(first) = tuple.first() {
                def.items = Some(Box::new(import_schema(first)?));
            }
        }
        _ => {}
    }

    if let Some(Value::Array(members)) = map.get(X_UNION) {
        for member in members {
            def.union_type.push(import_schema(member)?);
        }
    }

    if let Some(Value::Array(members)) = map.get("allOf") {
        for member in members {
            let member_def = import_schema(member)?;
            if member_def.reference.is_none() && !member_def.properties.is_empty() {
                merge_inline_member(&mut def, member_def);
            } else {
                def.composition_type.push(member_def);
            }
        }
    }

    if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
        let name = ref_name(reference);
        if def.properties.is_empty() && def.composition_type.is_empty() {
            def.reference = Some(name);
            return Ok(def);
        }
        // `$ref` next to inline properties: the reference becomes a composition member.
        def.composition_type.insert(0, Definition::reference(name));
    }

    import_type(value, &mut def);
    Ok(def)
}

/// Folds an inline `allOf` member into the composing definition.
fn merge_inline_member(def: &mut Definition, member: Definition) {
    for (name, prop) in member.properties {
        def.properties.insert(name, prop);
    }
    for name in member.props_required {
        def.mark_required(&name);
    }
    if def.description.is_none() {
        def.description = member.description;
    }
    if def.additional_properties.is_none() {
        def.additional_properties = member.additional_properties;
    }
    def.annotations.extend(member.annotations);
}

fn import_type(value: &Value, def: &mut Definition) {
    let format = get_str(value, "format");
    match value.get("type") {
        Some(Value::String(type_name)) => {
            let mapped = to_internal(Format::Swagger, type_name, format.as_deref());
            def.internal_type = Some(mapped.internal_type);
            def.format = mapped.residual_format;
        }
        Some(Value::Array(types)) => {
            let names: Vec<String> = types.iter().filter_map(scalar_to_string).collect();
            if names.len() == 1 {
                let mapped = to_internal(Format::Swagger, &names[0], format.as_deref());
                def.internal_type = Some(mapped.internal_type);
                def.format = mapped.residual_format;
            } else {
                for name in names {
                    let mapped = to_internal(Format::Swagger, &name, None);
                    def.union_type.push(Definition::of_type(mapped.internal_type));
                }
            }
        }
        _ => {
            if !def.union_type.is_empty() {
                return;
            }
            if !def.properties.is_empty() || def.additional_properties.is_some() {
                def.internal_type = Some(InternalType::Object);
            } else if def.items.is_some() {
                def.internal_type = Some(InternalType::Array);
            }
            def.format = format;
        }
    }
    if !def.union_type.is_empty() && def.internal_type == Some(InternalType::Object) {
        def.internal_type = None;
    }
}

fn import_constraints(value: &Value, def: &mut Definition) {
    // Native keys win over their `x-` fallbacks.
    let pick_number =
        |key: &str| get_number(value, key).or_else(|| get_number(value, &format!("x-{}", key)));
    let pick_u64 =
        |key: &str| get_u64(value, key).or_else(|| get_u64(value, &format!("x-{}", key)));

    def.minimum = pick_number("minimum");
    def.maximum = pick_number("maximum");
    def.multiple_of = pick_number("multipleOf");
    def.min_length = pick_u64("minLength");
    def.max_length = pick_u64("maxLength");
    def.min_items = pick_u64("minItems");
    def.max_items = pick_u64("maxItems");
    def.min_properties = get_u64(value, "minProperties");
    def.max_properties = get_u64(value, "maxProperties");
    def.pattern = get_str(value, "pattern").or_else(|| get_str(value, "x-pattern"));
    def.unique_items = get_bool(value, "uniqueItems").or_else(|| get_bool(value, "x-uniqueItems"));
}

/// Reads an External Documentation Object.
pub(crate) fn import_external_docs(value: Option<&Value>) -> Option<ExternalDocs> {
    let value = value?;
    Some(ExternalDocs {
        url: get_str(value, "url").unwrap_or_default(),
        description: get_str(value, "description"),
    })
}

/// Writes an External Documentation Object.
pub(crate) fn export_external_docs(docs: &ExternalDocs) -> Value {
    let mut map = Map::new();
    insert_opt(&mut map, "description", docs.description.clone());
    map.insert("url".into(), Value::String(docs.url.clone()));
    Value::Object(map)
}

/// Writes a Schema Object. References are emitted as `<ref_prefix><name>`.
pub fn export_schema(def: &Definition, ref_prefix: &str) -> Value {
    let mut map = Map::new();

    if let Some(reference) = &def.reference {
        if def.composition_type.is_empty() {
            map.insert(
                "$ref".into(),
                Value::String(format!("{}{}", ref_prefix, encode_pointer_segment(reference))),
            );
            insert_opt(&mut map, "description", def.description.clone());
            export_extensions(&mut map, &def.annotations);
            return Value::Object(map);
        }
    }

    insert_opt(&mut map, "title", def.title.clone());
    insert_opt(&mut map, "description", def.description.clone());

    if !def.composition_type.is_empty() {
        let mut members: Vec<Value> = def
            .composition_type
            .iter()
            .map(|m| export_schema(m, ref_prefix))
            .collect();
        if let Some(reference) = &def.reference {
            members.insert(
                0,
                json!({"$ref": format!("{}{}", ref_prefix, encode_pointer_segment(reference))}),
            );
        }
        if !def.properties.is_empty() {
            // `$ref` siblings are ignored by Swagger, so inline properties get their own member.
            let mut inline = Map::new();
            inline.insert("type".into(), Value::String("object".into()));
            export_properties(def, &mut inline, ref_prefix);
            members.push(Value::Object(inline));
        }
        map.insert("allOf".into(), Value::Array(members));
    } else if !def.union_type.is_empty() {
        map.insert("type".into(), Value::String("object".into()));
        map.insert(
            X_UNION.into(),
            Value::Array(
                def.union_type
                    .iter()
                    .map(|m| export_schema(m, ref_prefix))
                    .collect(),
            ),
        );
    } else if let Some(internal) = def.internal_type {
        let (type_name, format) = match from_internal(Format::Swagger, internal) {
            Some(pair) => pair,
            None => (fallback_type(Format::Swagger, internal), None),
        };
        map.insert("type".into(), Value::String(type_name.into()));
        let format = format.map(str::to_string).or_else(|| def.format.clone());
        insert_opt(&mut map, "format", format);
    } else if let Some(format) = &def.format {
        map.insert("format".into(), Value::String(format.clone()));
    }

    if def.composition_type.is_empty() {
        export_properties(def, &mut map, ref_prefix);
    }

    if let Some(items) = &def.items {
        map.insert("items".into(), export_schema(items, ref_prefix));
    }

    export_constraints(def, &mut map);

    if !def.enum_values.is_empty() {
        map.insert("enum".into(), Value::Array(def.enum_values.clone()));
    }
    insert_opt(&mut map, "default", def.default.clone());
    insert_opt(&mut map, "example", def.example.clone());
    insert_opt(&mut map, X_EXAMPLES, def.examples.clone());
    insert_opt(&mut map, "discriminator", def.discriminator.clone());
    insert_opt(&mut map, X_DISCRIMINATOR_VALUE, def.discriminator_value.clone());
    insert_opt(&mut map, "readOnly", def.read_only);
    insert_opt(&mut map, "xml", def.xml.clone());
    insert_opt(&mut map, "externalDocs", def.external_docs.as_ref().map(export_external_docs));
    if !def.file_types.is_empty() {
        map.insert(X_FILE_TYPES.into(), json!(def.file_types));
    }
    insert_opt(&mut map, X_SCHEMA, def.schema_source.clone());
    if !def.facets.is_empty() {
        map.insert(X_FACETS.into(), index_map_to_value(&def.facets));
    }
    if !def.fixed_facets.is_empty() {
        map.insert(X_FIXED_FACETS.into(), index_map_to_value(&def.fixed_facets));
    }
    export_extensions(&mut map, &def.annotations);

    Value::Object(map)
}

fn export_properties(def: &Definition, map: &mut Map<String, Value>, ref_prefix: &str) {
    if !def.properties.is_empty() {
        let props: Map<String, Value> = def
            .properties
            .iter()
            .map(|(name, prop)| (name.clone(), export_schema(prop, ref_prefix)))
            .collect();
        map.insert("properties".into(), Value::Object(props));
    }
    let required: Vec<&String> = def
        .props_required
        .iter()
        .filter(|name| def.properties.contains_key(name.as_str()))
        .collect();
    if !required.is_empty() {
        map.insert("required".into(), json!(required));
    }
    match &def.additional_properties {
        Some(AdditionalProperties::Allowed(b)) => {
            map.insert("additionalProperties".into(), Value::Bool(*b));
        }
        Some(AdditionalProperties::Typed(typed)) => {
            let mut schema = export_schema(typed, ref_prefix);
            if let (Some(obj), Some(name)) = (schema.as_object_mut(), typed.name.as_ref()) {
                obj.shift_remove(X_PATTERN_PROPERTY);
                if name != "//" {
                    map.insert(X_PATTERN_PROPERTY.into(), Value::String(name.clone()));
                }
            }
            map.insert("additionalProperties".into(), schema);
        }
        None => {}
    }
}

fn export_constraints(def: &Definition, map: &mut Map<String, Value>) {
    let internal = def.internal_type;
    let numeric = internal.map_or(true, InternalType::is_numeric);
    let stringy = internal.map_or(true, InternalType::is_string_like);
    let array = internal.map_or(true, |t| t == InternalType::Array);

    let key = |name: &str, native: bool| {
        if native {
            name.to_string()
        } else {
            format!("x-{}", name)
        }
    };

    let numbers: [(&str, &Option<Number>); 3] = [
        (NUMERIC_CONSTRAINTS[0], &def.minimum),
        (NUMERIC_CONSTRAINTS[1], &def.maximum),
        (NUMERIC_CONSTRAINTS[2], &def.multiple_of),
    ];
    for (name, value) in numbers {
        if let Some(n) = value {
            map.insert(key(name, numeric), Value::Number(n.clone()));
        }
    }
    let bounds = [
        (EXCLUSIVE_BOUNDS[0], def.exclusive_minimum),
        (EXCLUSIVE_BOUNDS[1], def.exclusive_maximum),
    ];
    for (name, value) in bounds {
        if let Some(b) = value {
            map.insert(key(name, numeric), Value::Bool(b));
        }
    }

    if let Some(n) = def.min_length {
        map.insert(key(STRING_CONSTRAINTS[0], stringy), json!(n));
    }
    if let Some(n) = def.max_length {
        map.insert(key(STRING_CONSTRAINTS[1], stringy), json!(n));
    }
    if let Some(p) = &def.pattern {
        map.insert(key(STRING_CONSTRAINTS[2], stringy), Value::String(p.clone()));
    }

    if let Some(n) = def.min_items {
        map.insert(key(ARRAY_CONSTRAINTS[0], array), json!(n));
    }
    if let Some(n) = def.max_items {
        map.insert(key(ARRAY_CONSTRAINTS[1], array), json!(n));
    }
    if let Some(b) = def.unique_items {
        map.insert(key(ARRAY_CONSTRAINTS[2], array), Value::Bool(b));
    }

    insert_opt(&mut *map, "minProperties", def.min_properties);
    insert_opt(&mut *map, "maxProperties", def.max_properties);
}

fn index_map_to_value(map: &IndexMap<String, Value>) -> Value {
    Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}
