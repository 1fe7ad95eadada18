//! # Type Converter
//!
//! RAML 1.0 type declarations and type expressions ⇄ [`Definition`], and the
//! JSON Schema strings RAML 0.8 (and RAML 1.0 `type: "{...}"`) embed.
//!
//! Swagger-only facets travel as `(oas-*)` annotations and are lifted back
//! to first-class fields on import.

use super::{split_annotations, ExportContext};
use crate::converters::json::{
    get_bool, get_number, get_str, get_u64, insert_opt, parse_embedded_json, scalar_to_string,
    string_list,
};
use crate::converters::swagger::definition::{
    export_external_docs, export_schema, import_external_docs, import_schema, DEFINITIONS_PREFIX,
};
use crate::converters::types::{
    fallback_type, from_internal, is_builtin, to_internal, RAML_NUMBER_FORMATS,
};
use crate::error::{AppError, AppResult};
use crate::formats::Format;
use crate::model::{AdditionalProperties, Definition, InternalType, Root};
use serde_json::{json, Map, Value};

/// State of one RAML import.
pub(crate) struct ImportContext {
    /// Source version.
    pub version: Format,
    /// Named types found inside embedded JSON Schema `definitions`.
    pub embedded: Vec<Definition>,
}

impl ImportContext {
    pub(crate) fn new(version: Format) -> Self {
        ImportContext {
            version,
            embedded: Vec::new(),
        }
    }
}

const DRAFT_04: &str = "http://json-schema.org/draft-04/schema#";

/// Annotations that carry Swagger facets.
const LIFTED: [&str; 15] = [
    "oas-format",
    "oas-readOnly",
    "oas-exclusiveMinimum",
    "oas-exclusiveMaximum",
    "oas-xml",
    "oas-externalDocs",
    "oas-minimum",
    "oas-maximum",
    "oas-multipleOf",
    "oas-minLength",
    "oas-maxLength",
    "oas-pattern",
    "oas-minItems",
    "oas-maxItems",
    "oas-uniqueItems",
];

/// Keys of a declaration with a meaning of their own; anything else that is
/// not an annotation is a fixed facet.
const DECLARATION_KEYS: [&str; 32] = [
    "type",
    "schema",
    "properties",
    "items",
    "additionalProperties",
    "facets",
    "displayName",
    "description",
    "default",
    "example",
    "examples",
    "enum",
    "minimum",
    "maximum",
    "multipleOf",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "uniqueItems",
    "minProperties",
    "maxProperties",
    "format",
    "discriminator",
    "discriminatorValue",
    "fileTypes",
    "xml",
    "required",
    "repeat",
    "usage",
    "allowedTargets",
];

/// Splits an expression on `|` outside of parentheses.
fn split_union(expr: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, ch) in expr.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            '|' if depth == 0 => {
                parts.push(expr[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(expr[start..].trim());
    parts
}

/// Removes parentheses that wrap the whole expression.
fn strip_parens(expr: &str) -> &str {
    let mut current = expr.trim();
    while current.starts_with('(') && current.ends_with(')') {
        let inner = &current[1..current.len() - 1];
        let mut depth = 0i32;
        let balanced = inner.chars().all(|c| {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            depth >= 0
        });
        if !balanced || depth != 0 {
            break;
        }
        current = inner.trim();
    }
    current
}

/// Parses a RAML 1.0 type expression (`Pet`, `string[]`, `A | B`, `(A | B)[]`, `string?`).
pub(crate) fn parse_type_expression(expr: &str) -> Definition {
    let expr = strip_parens(expr);
    let members = split_union(expr);
    if members.len() > 1 {
        return Definition {
            union_type: members.into_iter().map(parse_type_expression).collect(),
            ..Default::default()
        };
    }
    if let Some(inner) = expr.strip_suffix("[]") {
        return Definition {
            items: Some(Box::new(parse_type_expression(inner))),
            ..Definition::of_type(InternalType::Array)
        };
    }
    if let Some(inner) = expr.strip_suffix('?') {
        return Definition {
            union_type: vec![parse_type_expression(inner), Definition::of_type(InternalType::Null)],
            ..Default::default()
        };
    }
    if expr == "any" || expr.is_empty() {
        return Definition::default();
    }
    if is_builtin(Format::Raml10, expr) {
        return Definition::of_type(to_internal(Format::Raml10, expr, None).internal_type);
    }
    Definition::reference(expr)
}

/// Reads JSON Schema text; non-JSON text is kept verbatim.
pub(crate) fn import_schema_text(text: &str, ctx: &mut ImportContext) -> AppResult<Definition> {
    let Some(schema) = parse_embedded_json(text) else {
        if text.trim_start().starts_with('{') {
            let head: String = text.chars().take(40).collect();
            return Err(AppError::parse(
                "JSON Schema",
                format!("invalid schema text: {}", head),
            ));
        }
        return Ok(Definition {
            schema_source: Some(text.to_string()),
            ..Default::default()
        });
    };
    if let Some(Value::Object(definitions)) = schema.get("definitions") {
        for (name, embedded) in definitions {
            if ctx.embedded.iter().any(|d| d.name.as_deref() == Some(name.as_str())) {
                continue;
            }
            let mut def = import_schema(embedded)?;
            def.name = Some(name.clone());
            ctx.embedded.push(def);
        }
    }
    import_schema(&schema)
}

/// Reads a string found where a type is expected.
fn import_type_string(text: &str, ctx: &mut ImportContext) -> AppResult<Definition> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('<') {
        return import_schema_text(text, ctx);
    }
    Ok(parse_type_expression(text))
}

/// Reads a RAML 1.0 type declaration (string, list or map form).
pub(crate) fn import_type(value: &Value, ctx: &mut ImportContext) -> AppResult<Definition> {
    match value {
        Value::String(text) => import_type_string(text, ctx),
        Value::Array(members) => {
            let mut def = Definition::default();
            for member in members {
                def.composition_type.push(import_type(member, ctx)?);
            }
            Ok(def)
        }
        Value::Object(_) => import_declaration(value, ctx),
        Value::Null => Ok(Definition::of_type(InternalType::String)),
        other => Ok(parse_type_expression(&scalar_to_string(other).unwrap_or_default())),
    }
}

fn import_declaration(node: &Value, ctx: &mut ImportContext) -> AppResult<Definition> {
    let Some(map) = node.as_object() else {
        return Ok(Definition::default());
    };
    let declared_type = map.get("type").or_else(|| map.get("schema"));
    let mut def = match declared_type {
        None => Definition::default(),
        Some(base) => import_type(base, ctx)?,
    };
    let (annotations, lifted) = split_annotations(node, &LIFTED);
    def.annotations.extend(annotations);

    if let Some(title) = get_str(node, "displayName") {
        def.title = Some(title);
    }
    if let Some(desc) = get_str(node, "description") {
        def.description = Some(desc);
    }
    for (key, slot) in [
        ("default", &mut def.default),
        ("example", &mut def.example),
        ("examples", &mut def.examples),
        ("discriminatorValue", &mut def.discriminator_value),
        ("xml", &mut def.xml),
    ] {
        if let Some(v) = map.get(key) {
            *slot = Some(v.clone());
        }
    }
    if let Some(Value::Array(values)) = map.get("enum") {
        def.enum_values = values.clone();
    }
    def.discriminator = get_str(node, "discriminator").or(def.discriminator);
    if map.contains_key("fileTypes") {
        def.file_types = string_list(map.get("fileTypes"));
    }
    def.min_properties = get_u64(node, "minProperties").or(def.min_properties);
    def.max_properties = get_u64(node, "maxProperties").or(def.max_properties);

    import_constraints(node, &lifted, &mut def);
    def.read_only = lifted[1].as_ref().and_then(Value::as_bool).or(def.read_only);
    def.exclusive_minimum = lifted[2].as_ref().and_then(Value::as_bool).or(def.exclusive_minimum);
    def.exclusive_maximum = lifted[3].as_ref().and_then(Value::as_bool).or(def.exclusive_maximum);
    if let Some(xml) = &lifted[4] {
        def.xml = Some(xml.clone());
    }
    if lifted[5].is_some() {
        def.external_docs = import_external_docs(lifted[5].as_ref());
    }

    // An object-level `required: [..]` list overrides the per-property default.
    let required_list = match map.get("required") {
        Some(list @ Value::Array(_)) => Some(string_list(Some(list))),
        _ => None,
    };
    if let Some(Value::Object(props)) = map.get("properties") {
        for (key, raw) in props {
            if key == "//" || (key.len() > 1 && key.starts_with('/') && key.ends_with('/')) {
                let mut typed = import_type(raw, ctx)?;
                typed.name = Some(key.clone());
                def.additional_properties = Some(AdditionalProperties::Typed(Box::new(typed)));
                continue;
            }
            let (name, optional) = match key.strip_suffix('?') {
                Some(stripped) => (stripped.to_string(), true),
                None => (key.clone(), false),
            };
            let mut prop = import_type(raw, ctx)?;
            prop.name = Some(name.clone());
            let required = match &required_list {
                Some(list) => list.contains(&name),
                None => get_bool(raw, "required").unwrap_or(!optional),
            };
            if required {
                def.mark_required(&name);
            }
            def.properties.insert(name, prop);
        }
    }
    if let Some(Value::Bool(b)) = map.get("additionalProperties") {
        if def.additional_properties.is_none() {
            def.additional_properties = Some(AdditionalProperties::Allowed(*b));
        }
    }
    if let Some(items) = map.get("items") {
        def.items = Some(Box::new(import_type(items, ctx)?));
    }
    if let Some(Value::Object(facets)) = map.get("facets") {
        def.facets = facets.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    }
    for (key, value) in map {
        let is_annotation = key.starts_with('(') && key.ends_with(')');
        if !is_annotation && !DECLARATION_KEYS.contains(&key.as_str()) {
            def.fixed_facets.insert(key.clone(), value.clone());
        }
    }

    // `type: Pet` next to inline properties extends Pet.
    if def.reference.is_some() && !def.properties.is_empty() {
        if let Some(name) = def.reference.take() {
            def.composition_type.insert(0, Definition::reference(name));
        }
    }

    if declared_type.is_none() {
        def.internal_type = Some(infer_type(&def));
    } else if def.internal_type.is_none()
        && def.reference.is_none()
        && def.union_type.is_empty()
        && (!def.properties.is_empty() || def.additional_properties.is_some())
    {
        def.internal_type = Some(InternalType::Object);
    }

    apply_format(get_str(node, "format"), lifted[0].as_ref().and_then(scalar_to_string), &mut def);
    Ok(def)
}

fn import_constraints(node: &Value, lifted: &[Option<Value>], def: &mut Definition) {
    let lifted_value = |key: &str| -> Option<Value> {
        let idx = LIFTED.iter().position(|l| *l == format!("oas-{}", key))?;
        lifted[idx].clone()
    };
    let number = |key: &str| {
        get_number(node, key).or_else(|| match lifted_value(key) {
            Some(Value::Number(n)) => Some(n),
            _ => None,
        })
    };
    let unsigned =
        |key: &str| get_u64(node, key).or_else(|| lifted_value(key).and_then(|v| v.as_u64()));

    def.minimum = number("minimum").or(def.minimum.clone());
    def.maximum = number("maximum").or(def.maximum.clone());
    def.multiple_of = number("multipleOf").or(def.multiple_of.clone());
    def.min_length = unsigned("minLength").or(def.min_length);
    def.max_length = unsigned("maxLength").or(def.max_length);
    def.min_items = unsigned("minItems").or(def.min_items);
    def.max_items = unsigned("maxItems").or(def.max_items);
    def.pattern = get_str(node, "pattern")
        .or_else(|| lifted_value("pattern").and_then(|v| v.as_str().map(str::to_string)))
        .or(def.pattern.clone());
    def.unique_items = get_bool(node, "uniqueItems")
        .or_else(|| lifted_value("uniqueItems").and_then(|v| v.as_bool()))
        .or(def.unique_items);
}

/// The type of a declaration without `type`, following RAML defaulting.
fn infer_type(def: &Definition) -> InternalType {
    if !def.properties.is_empty()
        || def.additional_properties.is_some()
        || def.min_properties.is_some()
        || def.max_properties.is_some()
    {
        InternalType::Object
    } else if def.items.is_some() || def.min_items.is_some() || def.max_items.is_some() {
        InternalType::Array
    } else if !def.file_types.is_empty() {
        InternalType::File
    } else if def.minimum.is_some() || def.maximum.is_some() || def.multiple_of.is_some() {
        InternalType::Number
    } else {
        InternalType::String
    }
}

fn is_floating(t: InternalType) -> bool {
    matches!(t, InternalType::Number | InternalType::Float | InternalType::Double)
}

/// Folds RAML `format` and the `(oas-format)` annotation into the definition.
fn apply_format(native: Option<String>, carried: Option<String>, def: &mut Definition) {
    let Some(internal) = def.internal_type else {
        def.format = carried.or(native);
        return;
    };
    if let Some(format) = native {
        let base = match internal {
            t if is_floating(t) => Some("number"),
            t if t.is_numeric() => Some("integer"),
            InternalType::DateTime => Some("datetime"),
            _ => None,
        };
        match base {
            Some(type_name) => {
                let mapped = to_internal(Format::Raml10, type_name, Some(&format));
                def.internal_type = Some(mapped.internal_type);
                def.format = mapped.residual_format;
            }
            None => def.format = Some(format),
        }
    }
    if let Some(format) = carried {
        let swagger_type = if internal.is_numeric() {
            if is_floating(internal) {
                "number"
            } else {
                "integer"
            }
        } else {
            "string"
        };
        let mapped = to_internal(Format::Swagger, swagger_type, Some(&format));
        def.internal_type = Some(mapped.internal_type);
        def.format = mapped.residual_format;
    }
}

fn simple_name(def: &Definition) -> Option<String> {
    if def.is_plain_reference() {
        return def.reference.clone();
    }
    if def == &Definition::default() {
        return Some("any".to_string());
    }
    if def.is_plain_type() {
        let internal = def.internal_type?;
        return match from_internal(Format::Raml10, internal) {
            Some((t, None)) => Some(t.to_string()),
            _ => None,
        };
    }
    if def.internal_type == Some(InternalType::Array) {
        let only_items = Definition {
            items: None,
            name: None,
            ..def.clone()
        } == Definition::of_type(InternalType::Array);
        if only_items {
            let inner = simple_name(def.items.as_deref()?)?;
            return Some(if inner.contains('|') {
                format!("({})[]", inner)
            } else {
                format!("{}[]", inner)
            });
        }
    }
    if !def.union_type.is_empty() {
        let only_members = (Definition {
            union_type: Vec::new(),
            name: None,
            ..def.clone()
        }) == Definition::default();
        if only_members {
            let names: Option<Vec<String>> = def.union_type.iter().map(simple_name).collect();
            return names.map(|n| n.join(" | "));
        }
    }
    None
}

/// Writes a definition as a RAML 1.0 type declaration, compact when possible.
pub(crate) fn export_type(def: &Definition, ctx: &mut ExportContext<'_>) -> Value {
    if let Some(name) = simple_name(def) {
        return Value::String(name);
    }
    Value::Object(export_declaration(def, ctx))
}

fn type_value(def: &Definition, ctx: &mut ExportContext<'_>, map: &mut Map<String, Value>) {
    if let Some(source) = &def.schema_source {
        map.insert("type".into(), Value::String(source.clone()));
        return;
    }
    if let Some(reference) = &def.reference {
        map.insert("type".into(), Value::String(reference.clone()));
        return;
    }
    if !def.composition_type.is_empty() {
        let mut names = Vec::new();
        for member in &def.composition_type {
            match simple_name(member) {
                Some(name) => names.push(Value::String(name)),
                None => {
                    log::warn!(
                        "inline composition member of '{}' written by name only",
                        def.name.as_deref().unwrap_or("type")
                    );
                    names.push(Value::String(member_type_name(member)));
                }
            }
        }
        let value = if names.len() == 1 {
            names.remove(0)
        } else {
            Value::Array(names)
        };
        map.insert("type".into(), value);
        return;
    }
    if !def.union_type.is_empty() {
        let names: Vec<String> = def
            .union_type
            .iter()
            .map(|m| simple_name(m).unwrap_or_else(|| member_type_name(m)))
            .collect();
        map.insert("type".into(), Value::String(names.join(" | ")));
        return;
    }
    let Some(internal) = def.internal_type else {
        let inferred = if def.properties.is_empty() && def.additional_properties.is_none() {
            "any"
        } else {
            "object"
        };
        map.insert("type".into(), Value::String(inferred.into()));
        return;
    };

    // `datetime` with a non rfc3339 format collapsed into a string.
    if internal == InternalType::String && def.format.as_deref() == Some("rfc2616") {
        map.insert("type".into(), json!("datetime"));
        map.insert("format".into(), json!("rfc2616"));
        return;
    }

    match from_internal(Format::Raml10, internal) {
        Some((type_name, native_format)) => {
            map.insert("type".into(), Value::String(type_name.into()));
            match (native_format, &def.format) {
                (Some(f), _) => {
                    map.insert("format".into(), Value::String(f.into()));
                }
                (None, Some(f))
                    if internal.is_numeric() && RAML_NUMBER_FORMATS.contains(&f.as_str()) =>
                {
                    map.insert("format".into(), Value::String(f.clone()));
                }
                (None, Some(f)) => {
                    ctx.write_annotation(map, "oas-format", Value::String(f.clone()))
                }
                (None, None) => {}
            }
        }
        None => {
            let fallback = fallback_type(Format::Raml10, internal);
            map.insert("type".into(), Value::String(fallback.into()));
            let swagger_format = from_internal(Format::Swagger, internal)
                .and_then(|(_, f)| f.map(str::to_string))
                .or_else(|| def.format.clone());
            if let Some(f) = swagger_format {
                ctx.write_annotation(map, "oas-format", Value::String(f));
            }
        }
    }
}

fn member_type_name(def: &Definition) -> String {
    def.reference.clone().unwrap_or_else(|| match def.internal_type {
        Some(t) => fallback_type(Format::Raml10, t).to_string(),
        None => "any".to_string(),
    })
}

fn export_declaration(def: &Definition, ctx: &mut ExportContext<'_>) -> Map<String, Value> {
    let mut map = Map::new();
    type_value(def, ctx, &mut map);
    insert_opt(&mut map, "displayName", def.title.clone());
    insert_opt(&mut map, "description", def.description.clone());

    let mut properties = Map::new();
    for member in def.composition_type.iter().filter(|m| simple_name(m).is_none()) {
        for (name, prop) in &member.properties {
            let key = property_key(name, member.is_required(name));
            properties.insert(key, export_type(prop, ctx));
        }
    }
    for (name, prop) in &def.properties {
        let required = def.is_required(name);
        let exported = export_type(prop, ctx);
        match exported {
            Value::Object(mut obj) if !required => {
                obj.insert("required".into(), Value::Bool(false));
                properties.insert(name.clone(), Value::Object(obj));
            }
            other => {
                properties.insert(property_key(name, required), other);
            }
        }
    }
    match &def.additional_properties {
        Some(AdditionalProperties::Typed(typed)) => {
            let key = typed.name.clone().unwrap_or_else(|| "//".to_string());
            let inner = Definition {
                name: None,
                ..(**typed).clone()
            };
            properties.insert(key, export_type(&inner, ctx));
        }
        Some(AdditionalProperties::Allowed(b)) => {
            map.insert("additionalProperties".into(), Value::Bool(*b));
        }
        None => {}
    }
    if !properties.is_empty() {
        map.insert("properties".into(), Value::Object(properties));
    }
    if let Some(items) = &def.items {
        let exported = export_type(items, ctx);
        map.insert("items".into(), exported);
    }

    export_constraints(def, ctx, &mut map);

    if !def.enum_values.is_empty() {
        map.insert("enum".into(), Value::Array(def.enum_values.clone()));
    }
    insert_opt(&mut map, "default", def.default.clone());
    insert_opt(&mut map, "example", def.example.clone());
    insert_opt(&mut map, "examples", def.examples.clone());
    insert_opt(&mut map, "discriminator", def.discriminator.clone());
    insert_opt(&mut map, "discriminatorValue", def.discriminator_value.clone());
    insert_opt(&mut map, "xml", def.xml.clone());
    if !def.file_types.is_empty() {
        map.insert("fileTypes".into(), json!(def.file_types));
    }
    if !def.facets.is_empty() {
        let facets: Map<String, Value> =
            def.facets.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        map.insert("facets".into(), Value::Object(facets));
    }
    for (k, v) in &def.fixed_facets {
        map.insert(k.clone(), v.clone());
    }
    if let Some(b) = def.read_only {
        ctx.write_annotation(&mut map, "oas-readOnly", Value::Bool(b));
    }
    if let Some(docs) = &def.external_docs {
        ctx.write_annotation(&mut map, "oas-externalDocs", export_external_docs(docs));
    }
    ctx.write_annotations(&mut map, &def.annotations);
    map
}

fn property_key(name: &str, required: bool) -> String {
    if required {
        name.to_string()
    } else {
        format!("{}?", name)
    }
}

fn put_constraint(
    ctx: &mut ExportContext<'_>,
    map: &mut Map<String, Value>,
    key: &str,
    value: Value,
    native: bool,
) {
    if native {
        map.insert(key.to_string(), value);
    } else {
        ctx.write_annotation(map, &format!("oas-{}", key), value);
    }
}

fn export_constraints(def: &Definition, ctx: &mut ExportContext<'_>, map: &mut Map<String, Value>) {
    let internal = def.internal_type;
    let numeric = internal.map_or(false, InternalType::is_numeric);
    let stringy = internal.map_or(false, |t| {
        matches!(
            t,
            InternalType::String
                | InternalType::Password
                | InternalType::Byte
                | InternalType::Binary
        )
    });
    let array = internal == Some(InternalType::Array);

    if let Some(n) = &def.minimum {
        put_constraint(ctx, map, "minimum", Value::Number(n.clone()), numeric);
    }
    if let Some(n) = &def.maximum {
        put_constraint(ctx, map, "maximum", Value::Number(n.clone()), numeric);
    }
    if let Some(n) = &def.multiple_of {
        put_constraint(ctx, map, "multipleOf", Value::Number(n.clone()), numeric);
    }
    if let Some(n) = def.min_length {
        put_constraint(ctx, map, "minLength", json!(n), stringy);
    }
    if let Some(n) = def.max_length {
        put_constraint(ctx, map, "maxLength", json!(n), stringy);
    }
    if let Some(p) = &def.pattern {
        put_constraint(ctx, map, "pattern", Value::String(p.clone()), stringy);
    }
    if let Some(n) = def.min_items {
        put_constraint(ctx, map, "minItems", json!(n), array);
    }
    if let Some(n) = def.max_items {
        put_constraint(ctx, map, "maxItems", json!(n), array);
    }
    if let Some(b) = def.unique_items {
        put_constraint(ctx, map, "uniqueItems", Value::Bool(b), array);
    }
    if let Some(b) = def.exclusive_minimum {
        put_constraint(ctx, map, "exclusiveMinimum", Value::Bool(b), false);
    }
    if let Some(b) = def.exclusive_maximum {
        put_constraint(ctx, map, "exclusiveMaximum", Value::Bool(b), false);
    }
    insert_opt(map, "minProperties", def.min_properties);
    insert_opt(map, "maxProperties", def.max_properties);
}

/// Writes a definition as JSON Schema text, embedding every named type it
/// reaches in `definitions`.
pub(crate) fn export_schema_text(def: &Definition, root: &Root) -> AppResult<String> {
    if let Some(source) = &def.schema_source {
        return Ok(source.clone());
    }
    let mut schema = Map::new();
    schema.insert("$schema".into(), Value::String(DRAFT_04.into()));
    if let Value::Object(body) = export_schema(def, DEFINITIONS_PREFIX) {
        schema.extend(body);
    }

    let own = def.name.clone();
    let mut pending = def.referenced_names();
    let mut definitions = Map::new();
    while let Some(name) = pending.pop() {
        if definitions.contains_key(&name) || Some(&name) == own.as_ref() {
            continue;
        }
        match root.find_type(&name) {
            Some(target) => {
                definitions.insert(name.clone(), export_schema(target, DEFINITIONS_PREFIX));
                pending.extend(target.referenced_names());
            }
            None => log::warn!("schema references unknown type '{}'", name),
        }
    }
    if !definitions.is_empty() {
        definitions.sort_keys();
        schema.insert("definitions".into(), Value::Object(definitions));
    }
    serde_json::to_string_pretty(&Value::Object(schema))
        .map_err(|e| AppError::General(format!("failed to write JSON Schema: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn import(value: Value) -> Definition {
        let mut ctx = ImportContext::new(Format::Raml10);
        import_type(&value, &mut ctx).unwrap()
    }

    fn export(def: &Definition) -> Value {
        let root = Root::default();
        let mut ctx = ExportContext::new(Format::Raml10, &root);
        export_type(def, &mut ctx)
    }

    #[test]
    fn test_type_expressions() {
        assert_eq!(parse_type_expression("Pet").reference.as_deref(), Some("Pet"));
        let arr = parse_type_expression("string[]");
        assert_eq!(arr.internal_type, Some(InternalType::Array));
        assert_eq!(arr.items.unwrap().internal_type, Some(InternalType::String));
        let union = parse_type_expression("(Cat | Dog)[]");
        assert_eq!(union.items.as_ref().unwrap().union_type.len(), 2);
        let nullable = parse_type_expression("string?");
        assert_eq!(nullable.union_type[1].internal_type, Some(InternalType::Null));
    }

    #[test]
    fn test_required_defaults_and_optional_suffix() {
        let def = import(json!({
            "type": "object",
            "properties": {
                "a": "string",
                "b?": "integer",
                "c": {"type": "string", "required": false}
            }
        }));
        assert_eq!(def.props_required, vec!["a"]);
        assert_eq!(
            export(&def),
            json!({
                "type": "object",
                "properties": {"a": "string", "b?": "integer", "c?": "string"}
            })
        );
    }

    #[test]
    fn test_object_required_list_overrides_defaults() {
        let def = import(json!({
            "type": "object",
            "properties": {"a": "string", "b": "dog"},
            "required": ["a"]
        }));
        assert_eq!(def.props_required, vec!["a"]);
        assert!(def.fixed_facets.is_empty());
    }

    #[test]
    fn test_reference_with_properties_becomes_composition() {
        let def = import(json!({"type": "Pet", "properties": {"bark": "boolean"}}));
        assert!(def.reference.is_none());
        assert_eq!(def.composition_type[0].reference.as_deref(), Some("Pet"));
        assert_eq!(def.internal_type, Some(InternalType::Object));
    }

    #[test]
    fn test_pattern_property_becomes_additional_properties() {
        let def = import(json!({"properties": {"//": "string"}}));
        assert_eq!(def.internal_type, Some(InternalType::Object));
        match &def.additional_properties {
            Some(AdditionalProperties::Typed(typed)) => {
                assert_eq!(typed.name.as_deref(), Some("//"))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(export(&def), json!({"type": "object", "properties": {"//": "string"}}));
    }

    #[test]
    fn test_number_formats_are_native() {
        let def = import(json!({"type": "integer", "format": "int64"}));
        assert_eq!(def.internal_type, Some(InternalType::Int64));
        assert_eq!(export(&def), json!({"type": "integer", "format": "int64"}));
    }

    #[test]
    fn test_byte_travels_as_annotation() {
        let root = Root::default();
        let mut ctx = ExportContext::new(Format::Raml10, &root);
        let exported = export_type(&Definition::of_type(InternalType::Byte), &mut ctx);
        assert_eq!(exported, json!({"type": "string", "(oas-format)": "byte"}));
        assert_eq!(ctx.registry.len(), 1);
        assert_eq!(import(exported).internal_type, Some(InternalType::Byte));
    }

    #[test]
    fn test_misplaced_minimum_round_trips() {
        let mut def = Definition::of_type(InternalType::String);
        def.minimum = Some(3.into());
        let exported = export(&def);
        assert_eq!(exported, json!({"type": "string", "(oas-minimum)": 3}));
        let back = import(exported);
        assert_eq!(back.minimum, Some(3.into()));
        assert!(back.annotations.is_empty());
    }

    #[test]
    fn test_fixed_facets_and_facets() {
        let def = import(json!({"type": "Money", "currency": "EUR"}));
        assert_eq!(def.fixed_facets["currency"], json!("EUR"));
        let declared = import(json!({"type": "number", "facets": {"currency": "string"}}));
        assert_eq!(declared.facets["currency"], json!("string"));
        assert_eq!(export(&def), json!({"type": "Money", "currency": "EUR"}));
    }

    #[test]
    fn test_rfc2616_round_trip() {
        let def = import(json!({"type": "datetime", "format": "rfc2616"}));
        assert_eq!(def.internal_type, Some(InternalType::String));
        assert_eq!(export(&def), json!({"type": "datetime", "format": "rfc2616"}));
    }

    #[test]
    fn test_compact_forms() {
        assert_eq!(export(&parse_type_expression("Pet[]")), json!("Pet[]"));
        assert_eq!(export(&parse_type_expression("Cat | Dog")), json!("Cat | Dog"));
        assert_eq!(export(&Definition::default()), json!("any"));
    }

    #[test]
    fn test_json_schema_text_embeds_definitions() {
        let mut pet = Definition::of_type(InternalType::Object);
        pet.name = Some("Pet".into());
        pet.properties.insert("tag".into(), Definition::reference("Tag"));
        let mut tag = Definition::of_type(InternalType::String);
        tag.name = Some("Tag".into());
        let root = Root {
            types: vec![pet.clone(), tag],
            ..Default::default()
        };
        let text = export_schema_text(&pet, &root).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["definitions"]["Tag"], json!({"type": "string"}));
        assert_eq!(parsed["properties"]["tag"], json!({"$ref": "#/definitions/Tag"}));

        let mut ctx = ImportContext::new(Format::Raml08);
        let back = import_schema_text(&text, &mut ctx).unwrap();
        assert_eq!(back.properties["tag"].reference.as_deref(), Some("Tag"));
        assert_eq!(ctx.embedded[0].name.as_deref(), Some("Tag"));
    }

    #[test]
    fn test_xml_schema_is_kept_verbatim() {
        let mut ctx = ImportContext::new(Format::Raml08);
        let def = import_schema_text("<xs:schema/>", &mut ctx).unwrap();
        assert_eq!(def.schema_source.as_deref(), Some("<xs:schema/>"));
    }
}
