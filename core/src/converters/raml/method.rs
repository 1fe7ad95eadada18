//! # Method Converter
//!
//! Methods, bodies and responses. Bodies are keyed by media type; a body
//! without one falls back to the method's / document's media types.
//!
//! Parameters and responses that only point at a shared component (as
//! imported from Swagger) are written inline, or skipped when the trait that
//! provides them is applied through `is`.

use super::definition::{
    export_schema_text, export_type, import_schema_text, import_type, ImportContext,
};
use super::parameter::{export_parameters, import_parameters};
use super::security::{export_secured_by, import_secured_by};
use super::template::{export_template_refs, import_template_refs};
use super::{split_annotations, ExportContext};
use crate::converters::json::{get_str, insert_object, insert_opt, parse_embedded_json, string_list};
use crate::converters::naming::parse_trait_field_key;
use crate::converters::swagger::definition::{export_external_docs, import_external_docs};
use crate::error::{AppError, AppResult, ReferenceKind};
use crate::formats::Format;
use crate::model::{
    take_annotation, Body, Definition, HttpMethod, InternalType, Method, Parameter,
    ParameterLocation, Response, Root, TemplateRef,
};
use serde_json::{json, Map, Value};

const LIFTED: [&str; 4] = ["oas-summary", "oas-tags", "oas-deprecated", "oas-externalDocs"];
const BODY_NAME: &str = "oas-body-name";
const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";
const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// Reads a method node.
pub(crate) fn import_method(
    verb: HttpMethod,
    path: &str,
    value: &Value,
    ctx: &mut ImportContext,
) -> AppResult<Method> {
    let mut method = Method::new(verb, path);
    if value.is_null() {
        return Ok(method);
    }
    method.name = get_str(value, "displayName");
    method.description = get_str(value, "description");

    let (annotations, lifted) = split_annotations(value, &LIFTED);
    method.annotations = annotations;
    method.summary = lifted[0].as_ref().and_then(|v| v.as_str().map(str::to_string));
    method.tags = string_list(lifted[1].as_ref());
    method.deprecated = lifted[2].as_ref().and_then(Value::as_bool).unwrap_or(false);
    method.external_docs = import_external_docs(lifted[3].as_ref());

    method.headers = import_parameters(value.get("headers"), ParameterLocation::Header, ctx)?;
    method.parameters =
        import_parameters(value.get("queryParameters"), ParameterLocation::Query, ctx)?;
    if let Some(query_string) = value.get("queryString") {
        let definition = import_type(query_string, ctx)?;
        method
            .query_strings
            .push(Parameter::new("queryString", ParameterLocation::Query, definition, true));
    }
    if let Some(body) = value.get("body") {
        import_bodies(body, &mut method, ctx)?;
    }
    if let Some(Value::Object(responses)) = value.get("responses") {
        for (code, raw) in responses {
            method.responses.push(import_response(code, raw, ctx)?);
        }
    }
    method.is = import_template_refs(value.get("is"));
    method.secured_by = import_secured_by(value.get("securedBy"));
    method.protocols = string_list(value.get("protocols"))
        .into_iter()
        .map(|p| p.to_lowercase())
        .collect();
    Ok(method)
}

fn is_media_type_map(value: &Value) -> bool {
    value
        .as_object()
        .map_or(false, |m| !m.is_empty() && m.keys().all(|k| k.contains('/')))
}

fn import_bodies(value: &Value, method: &mut Method, ctx: &mut ImportContext) -> AppResult<()> {
    if !is_media_type_map(value) {
        method.bodies.push(import_body(None, value, ctx)?);
        return Ok(());
    }
    let Some(map) = value.as_object() else {
        return Ok(());
    };
    for (mime, decl) in map {
        let is_form = mime == URLENCODED || mime == MULTIPART;
        if ctx.version == Format::Raml08 && is_form && decl.get("formParameters").is_some() {
            let fields =
                import_parameters(decl.get("formParameters"), ParameterLocation::FormData, ctx)?;
            method.form_bodies.extend(fields);
            if !method.consumes.contains(mime) {
                method.consumes.push(mime.clone());
            }
            continue;
        }
        method.bodies.push(import_body(Some(mime.clone()), decl, ctx)?);
    }
    Ok(())
}

/// Reads one body declaration.
fn import_body(mime: Option<String>, decl: &Value, ctx: &mut ImportContext) -> AppResult<Body> {
    let mut body = Body {
        mime_type: mime,
        ..Default::default()
    };
    if decl.is_null() {
        return Ok(body);
    }
    if ctx.version == Format::Raml08 {
        body.description = get_str(decl, "description");
        let mut definition = match get_str(decl, "schema") {
            Some(schema) if schema.trim_start().starts_with(['{', '<']) => {
                Some(import_schema_text(&schema, ctx)?)
            }
            Some(name) => Some(Definition::reference(name)),
            None => None,
        };
        if let Some(example) = decl.get("example") {
            let example = match example.as_str().and_then(parse_embedded_json) {
                Some(parsed) => parsed,
                None => example.clone(),
            };
            definition.get_or_insert_with(Definition::default).example = Some(example);
        }
        body.definition = definition;
        return Ok(body);
    }

    let mut definition = import_type(decl, ctx)?;
    body.description = definition.description.take();
    body.name = take_annotation(&mut definition.annotations, BODY_NAME)
        .and_then(|a| a.definition.as_str().map(str::to_string));
    body.definition = Some(definition);
    Ok(body)
}

/// Reads a response node.
pub(crate) fn import_response(
    code: &str,
    value: &Value,
    ctx: &mut ImportContext,
) -> AppResult<Response> {
    let mut response = Response {
        http_status_code: code.to_string(),
        ..Default::default()
    };
    if value.is_null() {
        return Ok(response);
    }
    response.description = get_str(value, "description");
    response.annotations = split_annotations(value, &[]).0;
    response.headers = import_parameters(value.get("headers"), ParameterLocation::Header, ctx)?;
    if let Some(body) = value.get("body") {
        if is_media_type_map(body) {
            if let Some(map) = body.as_object() {
                for (mime, decl) in map {
                    response.bodies.push(import_body(Some(mime.clone()), decl, ctx)?);
                }
            }
        } else {
            response.bodies.push(import_body(None, body, ctx)?);
        }
    }
    Ok(response)
}

/// Where a stub's target lives.
enum StubTarget<'a> {
    /// Provided by a trait the owner applies; nothing to write.
    Applied,
    /// Provided by a trait the owner does not apply.
    Trait(&'a Method, String),
    /// A shared component.
    Shared,
}

fn stub_target<'a>(
    key: &str,
    applied: &[TemplateRef],
    root: &'a Root,
    kind: ReferenceKind,
) -> AppResult<StubTarget<'a>> {
    match parse_trait_field_key(key) {
        Some((trait_name, _)) if applied.iter().any(|t| t.name == trait_name) => {
            Ok(StubTarget::Applied)
        }
        Some((trait_name, field)) => root
            .find_trait(&trait_name)
            .map(|t| StubTarget::Trait(&t.method, field))
            .ok_or_else(|| AppError::unresolved(kind, key)),
        None => Ok(StubTarget::Shared),
    }
}

/// Replaces a parameter stub with the parameter it points at. Stubs provided
/// by an applied trait resolve to `None`.
pub(crate) fn resolve_parameter_stub(
    param: &Parameter,
    applied: &[TemplateRef],
    root: &Root,
) -> AppResult<Option<Parameter>> {
    let Some(key) = &param.reference else {
        return Ok(Some(param.clone()));
    };
    let unresolved = || AppError::unresolved(ReferenceKind::Parameter, key.clone());
    let found = match stub_target(key, applied, root, ReferenceKind::Parameter)? {
        StubTarget::Applied => return Ok(None),
        StubTarget::Trait(template, field) => template
            .parameters
            .iter()
            .chain(template.headers.iter())
            .chain(template.form_bodies.iter())
            .find(|p| p.name == field)
            .cloned(),
        StubTarget::Shared => root.parameters.get(key).cloned(),
    };
    let mut resolved = found.ok_or_else(unresolved)?;
    resolved.location = param.location;
    Ok(Some(resolved))
}

fn resolve_response_stub(
    response: &Response,
    applied: &[TemplateRef],
    root: &Root,
) -> AppResult<Option<Response>> {
    let Some(key) = &response.reference else {
        return Ok(Some(response.clone()));
    };
    let unresolved = || AppError::unresolved(ReferenceKind::Response, key.clone());
    let found = match stub_target(key, applied, root, ReferenceKind::Response)? {
        StubTarget::Applied => return Ok(None),
        StubTarget::Trait(template, code) => template.find_response(&code).cloned(),
        StubTarget::Shared => root.responses.get(key).cloned(),
    };
    let mut resolved = found.ok_or_else(unresolved)?;
    resolved.http_status_code = response.http_status_code.clone();
    Ok(Some(resolved))
}

fn resolve_parameters(
    params: &[Parameter],
    method: &Method,
    root: &Root,
) -> AppResult<Vec<Parameter>> {
    let mut out = Vec::new();
    for param in params {
        if let Some(resolved) = resolve_parameter_stub(param, &method.is, root)? {
            out.push(resolved);
        }
    }
    Ok(out)
}

/// Writes a method node.
pub(crate) fn export_method(method: &Method, ctx: &mut ExportContext<'_>) -> AppResult<Value> {
    let root = ctx.root;
    let mut map = Map::new();
    insert_opt(&mut map, "displayName", method.name.clone());
    insert_opt(&mut map, "description", method.description.clone());
    if let Some(summary) = &method.summary {
        ctx.write_annotation(&mut map, "oas-summary", Value::String(summary.clone()));
    }
    if !method.tags.is_empty() {
        ctx.write_annotation(&mut map, "oas-tags", json!(method.tags));
    }
    if method.deprecated {
        ctx.write_annotation(&mut map, "oas-deprecated", Value::Bool(true));
    }
    if let Some(docs) = &method.external_docs {
        ctx.write_annotation(&mut map, "oas-externalDocs", export_external_docs(docs));
    }
    ctx.write_annotations(&mut map, &method.annotations);

    if !method.is.is_empty() {
        map.insert("is".into(), export_template_refs(&method.is));
    }
    if !method.secured_by.is_empty() {
        map.insert("securedBy".into(), export_secured_by(&method.secured_by));
    }
    export_protocols(&method.protocols, ctx, &mut map);

    let headers = resolve_parameters(&method.headers, method, root)?;
    insert_object(&mut map, "headers", export_parameters(&headers, ctx));
    let mut query = resolve_parameters(&method.parameters, method, root)?;
    if !ctx.is_v10() {
        query.extend(spread_query_strings(&method.query_strings));
    }
    insert_object(&mut map, "queryParameters", export_parameters(&query, ctx));
    if ctx.is_v10() {
        if let Some(query_string) = method.query_strings.first() {
            let definition = query_string.definition.clone().unwrap_or_default();
            let exported = export_type(&definition, ctx);
            map.insert("queryString".into(), exported);
        }
    }

    let body = export_request_bodies(method, ctx)?;
    if let Some(body) = body {
        map.insert("body".into(), body);
    }

    let mut responses = Map::new();
    for response in &method.responses {
        if let Some(resolved) = resolve_response_stub(response, &method.is, root)? {
            let exported = export_response(&resolved, &method.produces, ctx)?;
            responses.insert(resolved.http_status_code.clone(), exported);
        }
    }
    insert_object(&mut map, "responses", responses);
    Ok(Value::Object(map))
}

/// RAML 0.8 has no `queryString`; object properties become query parameters.
fn spread_query_strings(query_strings: &[Parameter]) -> Vec<Parameter> {
    let mut out = Vec::new();
    for query_string in query_strings {
        let Some(definition) = &query_string.definition else { continue };
        if definition.properties.is_empty() {
            log::warn!(
                "RAML 0.8 has no queryString, dropping a {:?} declaration",
                definition.internal_type
            );
        }
        for (name, prop) in &definition.properties {
            let mut param = Parameter::new(
                name.clone(),
                ParameterLocation::Query,
                prop.clone(),
                definition.is_required(name),
            );
            param.description = prop.description.clone();
            out.push(param);
        }
    }
    out
}

pub(crate) fn export_protocols(
    protocols: &[String],
    ctx: &mut ExportContext<'_>,
    map: &mut Map<String, Value>,
) {
    let (raml, other): (Vec<&String>, Vec<&String>) = protocols
        .iter()
        .partition(|p| p.as_str() == "http" || p.as_str() == "https");
    if !raml.is_empty() {
        map.insert(
            "protocols".into(),
            Value::Array(raml.iter().map(|p| Value::String(p.to_uppercase())).collect()),
        );
    }
    if !other.is_empty() {
        ctx.write_annotation(map, "oas-schemes", json!(other));
    }
}

/// Media types a body without one is written under.
fn fallback_media_types(
    preferred: &[String],
    ctx: &ExportContext<'_>,
    consuming: bool,
) -> Vec<String> {
    if !preferred.is_empty() {
        return preferred.to_vec();
    }
    if ctx.is_v10() {
        return Vec::new();
    }
    let document = ctx.root.media_type.as_ref().map(|m| {
        if consuming {
            m.consumes.clone()
        } else {
            m.produces.clone()
        }
    });
    match document {
        Some(types) if !types.is_empty() => types,
        _ => vec![DEFAULT_MEDIA_TYPE.to_string()],
    }
}

fn export_request_bodies(method: &Method, ctx: &mut ExportContext<'_>) -> AppResult<Option<Value>> {
    let mut bodies = Map::new();
    let root = ctx.root;
    let forms = resolve_parameters(&method.form_bodies, method, root)?;
    if !forms.is_empty() {
        let mime = form_media_type(method, &forms);
        let value = if ctx.is_v10() {
            export_type(&form_definition(&forms), ctx)
        } else {
            json!({"formParameters": export_parameters(&forms, ctx)})
        };
        bodies.insert(mime, value);
    }

    let declared = export_bodies(&method.bodies, &method.consumes, ctx, true)?;
    let mergeable = is_media_type_map(&declared) || declared.as_object().is_some_and(Map::is_empty);
    match declared {
        Value::Object(entries) if mergeable => {
            bodies.extend(entries);
        }
        bare if bodies.is_empty() => return Ok(Some(bare)),
        _ => log::warn!(
            "{} {} mixes form fields with an untyped body, dropping the body",
            method.method.as_str(),
            method.path
        ),
    }
    Ok(if bodies.is_empty() {
        None
    } else {
        Some(Value::Object(bodies))
    })
}

fn form_media_type(method: &Method, forms: &[Parameter]) -> String {
    if method.consumes.iter().any(|m| m == MULTIPART) {
        return MULTIPART.to_string();
    }
    if method.consumes.iter().any(|m| m == URLENCODED) {
        return URLENCODED.to_string();
    }
    let has_file = forms.iter().any(|p| {
        p.definition
            .as_ref()
            .map_or(false, |d| d.internal_type == Some(InternalType::File))
    });
    let mime = if has_file { MULTIPART } else { URLENCODED };
    mime.to_string()
}

/// Folds form fields into one object type.
fn form_definition(forms: &[Parameter]) -> Definition {
    let mut definition = Definition::of_type(InternalType::Object);
    for param in forms {
        let mut prop = param
            .definition
            .clone()
            .unwrap_or_else(|| Definition::of_type(InternalType::String));
        if prop.description.is_none() {
            prop.description = param.description.clone();
        }
        if param.required {
            definition.mark_required(&param.name);
        }
        definition.properties.insert(param.name.clone(), prop);
    }
    definition
}

/// Writes bodies keyed by media type, or a bare declaration when one body
/// has no media type and none can be inferred.
fn export_bodies(
    bodies: &[Body],
    preferred: &[String],
    ctx: &mut ExportContext<'_>,
    consuming: bool,
) -> AppResult<Value> {
    let mut out = Map::new();
    for body in bodies {
        let declaration = export_body(body, ctx)?;
        match &body.mime_type {
            Some(mime) => {
                out.insert(mime.clone(), declaration);
            }
            None => {
                let targets = fallback_media_types(preferred, ctx, consuming);
                if targets.is_empty() {
                    if bodies.len() == 1 {
                        return Ok(declaration);
                    }
                    out.insert(DEFAULT_MEDIA_TYPE.to_string(), declaration);
                    continue;
                }
                for mime in targets {
                    out.entry(mime).or_insert_with(|| declaration.clone());
                }
            }
        }
    }
    Ok(Value::Object(out))
}

fn export_body(body: &Body, ctx: &mut ExportContext<'_>) -> AppResult<Value> {
    if !ctx.is_v10() {
        return export_body_08(body, ctx.root);
    }
    let needs_map =
        body.description.is_some() || body.name.is_some() || !body.annotations.is_empty();
    let mut map = match &body.definition {
        None if !needs_map => return Ok(Value::Null),
        None => Map::new(),
        Some(definition) => match export_type(definition, ctx) {
            Value::Object(map) => map,
            compact if !needs_map => return Ok(compact),
            compact => {
                let mut map = Map::new();
                map.insert("type".into(), compact);
                map
            }
        },
    };
    insert_opt(&mut map, "description", body.description.clone());
    if let Some(name) = &body.name {
        ctx.write_annotation(&mut map, BODY_NAME, Value::String(name.clone()));
    }
    ctx.write_annotations(&mut map, &body.annotations);
    Ok(Value::Object(map))
}

fn export_body_08(body: &Body, root: &Root) -> AppResult<Value> {
    let mut map = Map::new();
    insert_opt(&mut map, "description", body.description.clone());
    if let Some(definition) = &body.definition {
        if definition.is_plain_reference() {
            insert_opt(&mut map, "schema", definition.reference.clone());
        } else {
            let mut schema = definition.clone();
            let example = schema.example.take();
            if schema != Definition::default() {
                map.insert("schema".into(), Value::String(export_schema_text(&schema, root)?));
            }
            if let Some(example) = example {
                map.insert("example".into(), Value::String(example_text(&example)));
            }
        }
    }
    Ok(if map.is_empty() { Value::Null } else { Value::Object(map) })
}

fn example_text(example: &Value) -> String {
    match example {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Writes a response node.
pub(crate) fn export_response(
    response: &Response,
    produces: &[String],
    ctx: &mut ExportContext<'_>,
) -> AppResult<Value> {
    let mut map = Map::new();
    insert_opt(&mut map, "description", response.description.clone());
    ctx.write_annotations(&mut map, &response.annotations);
    let root = ctx.root;
    let mut headers = Vec::new();
    for header in &response.headers {
        if let Some(resolved) = resolve_parameter_stub(header, &[], root)? {
            headers.push(resolved);
        }
    }
    insert_object(&mut map, "headers", export_parameters(&headers, ctx));
    if !response.bodies.is_empty() {
        let bodies = export_bodies(&response.bodies, produces, ctx, false)?;
        map.insert("body".into(), bodies);
    }
    Ok(if map.is_empty() { Value::Null } else { Value::Object(map) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MediaType, Trait};
    use pretty_assertions::assert_eq;

    fn import(value: Value, version: Format) -> Method {
        let mut ctx = ImportContext::new(version);
        import_method(HttpMethod::Post, "/pets", &value, &mut ctx).unwrap()
    }

    fn export(method: &Method, root: &Root, version: Format) -> AppResult<Value> {
        let mut ctx = ExportContext::new(version, root);
        export_method(method, &mut ctx)
    }

    #[test]
    fn test_import_raml10_method() {
        let method = import(
            json!({
                "displayName": "createPet",
                "(oas-summary)": "Create",
                "(oas-tags)": ["pets"],
                "is": ["paged", {"sorted": {"field": "name"}}],
                "body": {"application/json": {"type": "Pet", "description": "The pet"}},
                "responses": {"201": {"description": "Created", "headers": {"Location": "string"}}}
            }),
            Format::Raml10,
        );
        assert_eq!(method.name.as_deref(), Some("createPet"));
        assert_eq!(method.summary.as_deref(), Some("Create"));
        assert_eq!(method.tags, vec!["pets"]);
        assert!(method.annotations.is_empty());
        assert_eq!(method.is[1].parameters, vec![("field".to_string(), json!("name"))]);
        assert_eq!(method.bodies[0].description.as_deref(), Some("The pet"));
        assert_eq!(method.bodies[0].definition.as_ref().unwrap().reference.as_deref(), Some("Pet"));
        assert_eq!(method.responses[0].headers[0].name, "Location");
    }

    #[test]
    fn test_raml08_form_parameters() {
        let method = import(
            json!({"body": {"application/x-www-form-urlencoded": {
                "formParameters": {"name": {"type": "string", "required": true}}
            }}}),
            Format::Raml08,
        );
        assert_eq!(method.form_bodies[0].name, "name");
        assert_eq!(method.form_bodies[0].location, ParameterLocation::FormData);
        assert_eq!(method.consumes, vec![URLENCODED]);
        assert!(method.bodies.is_empty());
    }

    #[test]
    fn test_raml08_schema_body() {
        let method = import(
            json!({"body": {"application/json": {
                "schema": "Pet",
                "example": "{\"name\": \"Rex\"}"
            }}}),
            Format::Raml08,
        );
        let definition = method.bodies[0].definition.as_ref().unwrap();
        assert_eq!(definition.reference.as_deref(), Some("Pet"));
        assert_eq!(definition.example, Some(json!({"name": "Rex"})));
    }

    #[test]
    fn test_body_without_media_type_uses_consumes() {
        let mut method = Method::new(HttpMethod::Post, "/pets");
        method.consumes = vec!["application/json".into(), "application/xml".into()];
        method.bodies.push(Body {
            definition: Some(Definition::reference("Pet")),
            ..Default::default()
        });
        let exported = export(&method, &Root::default(), Format::Raml10).unwrap();
        assert_eq!(
            exported,
            json!({"body": {"application/json": "Pet", "application/xml": "Pet"}})
        );
    }

    #[test]
    fn test_bare_body_declaration_without_media_types() {
        let mut method = Method::new(HttpMethod::Post, "/pets");
        method.bodies.push(Body {
            definition: Some(Definition::reference("Pet")),
            ..Default::default()
        });
        let exported = export(&method, &Root::default(), Format::Raml10).unwrap();
        assert_eq!(exported, json!({"body": "Pet"}));

        let root = Root {
            media_type: Some(MediaType {
                consumes: vec!["application/xml".into()],
                produces: Vec::new(),
            }),
            ..Default::default()
        };
        assert_eq!(
            export(&method, &root, Format::Raml08).unwrap(),
            json!({"body": {"application/xml": {"schema": "Pet"}}})
        );
    }

    #[test]
    fn test_form_bodies_fold_into_object() {
        let mut method = Method::new(HttpMethod::Post, "/upload");
        method.form_bodies.push(Parameter::new(
            "file",
            ParameterLocation::FormData,
            Definition::of_type(InternalType::File),
            true,
        ));
        let exported = export(&method, &Root::default(), Format::Raml10).unwrap();
        assert_eq!(
            exported,
            json!({"body": {"multipart/form-data": {
                "type": "object",
                "properties": {"file": "file"}
            }}})
        );
    }

    #[test]
    fn test_stub_of_applied_trait_is_skipped() {
        let mut template = Method::new(HttpMethod::Get, "");
        let string = Definition::of_type(InternalType::String);
        template
            .parameters
            .push(Parameter::new("q", ParameterLocation::Query, string, false));
        let root = Root {
            traits: vec![Trait {
                name: "search".into(),
                usage: None,
                method: template,
                annotations: Vec::new(),
            }],
            ..Default::default()
        };
        let mut method = Method::new(HttpMethod::Get, "/pets");
        let stub = Parameter::reference_to("q", ParameterLocation::Query, "trait:search:q", false);
        method.parameters.push(stub);
        method.is.push(TemplateRef::named("search"));
        assert_eq!(export(&method, &root, Format::Raml10).unwrap(), json!({"is": ["search"]}));

        method.is.clear();
        assert_eq!(
            export(&method, &root, Format::Raml10).unwrap(),
            json!({"queryParameters": {"q": {"type": "string", "required": false}}})
        );
    }

    #[test]
    fn test_unresolved_stub_is_an_error() {
        let mut method = Method::new(HttpMethod::Get, "/pets");
        method.responses.push(Response {
            http_status_code: "404".into(),
            reference: Some("NotFound".into()),
            ..Default::default()
        });
        let err = export(&method, &Root::default(), Format::Raml10).unwrap_err();
        assert!(matches!(err, AppError::UnresolvedReference { kind: ReferenceKind::Response, .. }));
    }

    #[test]
    fn test_non_http_protocols_travel_as_annotation() {
        let mut method = Method::new(HttpMethod::Get, "/feed");
        method.protocols = vec!["https".into(), "wss".into()];
        let exported = export(&method, &Root::default(), Format::Raml10).unwrap();
        assert_eq!(exported, json!({"protocols": ["HTTPS"], "(oas-schemes)": ["wss"]}));
    }
}
