//! # Operation Converter
//!
//! Operations, their parameters and their responses. Shared parameter and
//! response `$ref`s resolve against the traits and shared components built
//! before the paths; a pointer that does not resolve fails the import.

use super::definition::{
    encode_pointer_segment, export_external_docs, export_schema, import_external_docs,
    import_schema, ref_name, DEFINITIONS_PREFIX,
};
use super::parameter::{
    export_body_parameter, export_header, export_parameter, import_body_parameter,
    import_header, import_parameter, parameter_ref_key,
};
use super::security::{export_requirements, import_requirements};
use super::{swagger_schemes, RESPONSES_PREFIX};
use crate::converters::annotations::{export_extensions, import_extensions};
use crate::converters::json::{get_bool, get_str, insert_list, insert_opt, string_list};
use crate::converters::naming::parse_trait_field_key;
use crate::error::{AppError, AppResult, ReferenceKind};
use crate::model::{
    AdditionalProperties, Body, Definition, HttpMethod, Method, Parameter, ParameterLocation,
    Response, Root, TemplateRef,
};
use serde_json::{json, Map, Value};

/// Media types whose bodies Swagger writes as `formData` parameters.
const FORM_MEDIA_TYPES: [&str; 2] = ["application/x-www-form-urlencoded", "multipart/form-data"];

/// What an import can resolve pointers against.
pub(crate) struct ImportScope<'a> {
    /// The raw document (shared body parameters are only kept raw).
    pub document: &'a Value,
    /// Traits and shared components imported so far.
    pub root: &'a Root,
}

/// What an export needs besides the method itself.
pub(crate) struct ExportScope<'a> {
    /// The model being written.
    pub root: &'a Root,
    /// Security schemes that made it into the document.
    pub security: &'a Map<String, Value>,
}

enum ImportedParameter {
    Param(Parameter),
    Body(Body),
}

fn resolve_parameter_ref(
    reference: &str,
    scope: &ImportScope<'_>,
    traits: &mut Vec<TemplateRef>,
) -> AppResult<ImportedParameter> {
    let key = parameter_ref_key(reference);
    let unresolved = || AppError::unresolved(ReferenceKind::Parameter, key.clone());

    if let Some((trait_name, field)) = parse_trait_field_key(&key) {
        let trait_ = scope.root.find_trait(&trait_name).ok_or_else(unresolved)?;
        let template = &trait_.method;
        let found = template
            .parameters
            .iter()
            .chain(template.headers.iter())
            .chain(template.form_bodies.iter())
            .find(|p| p.name == field);
        let imported = match found {
            Some(p) => ImportedParameter::Param(Parameter::reference_to(
                p.name.clone(),
                p.location,
                key.clone(),
                p.required,
            )),
            None => {
                let body = template
                    .bodies
                    .iter()
                    .find(|b| b.name.as_deref() == Some(field.as_str()))
                    .ok_or_else(unresolved)?;
                ImportedParameter::Body(body.clone())
            }
        };
        if !traits.iter().any(|t| t.name == trait_name) {
            traits.push(TemplateRef::named(trait_name));
        }
        return Ok(imported);
    }

    if let Some(shared) = scope.root.parameters.get(&key) {
        return Ok(ImportedParameter::Param(Parameter::reference_to(
            shared.name.clone(),
            shared.location,
            key.clone(),
            shared.required,
        )));
    }
    // Shared body parameters are inlined at each use site.
    match scope.document.get("parameters").and_then(|p| p.get(&key)) {
        Some(raw) if get_str(raw, "in").as_deref() == Some("body") => {
            Ok(ImportedParameter::Body(import_body_parameter(raw)?))
        }
        _ => Err(unresolved()),
    }
}

fn import_one_parameter(
    raw: &Value,
    scope: &ImportScope<'_>,
    traits: &mut Vec<TemplateRef>,
) -> AppResult<ImportedParameter> {
    if let Some(reference) = raw.get("$ref").and_then(Value::as_str) {
        return resolve_parameter_ref(reference, scope, traits);
    }
    if get_str(raw, "in").as_deref() == Some("body") {
        return Ok(ImportedParameter::Body(import_body_parameter(raw)?));
    }
    Ok(ImportedParameter::Param(import_parameter(raw)?))
}

/// Reads one operation. Returns the method and the path parameters it
/// declares, which belong to the resource.
pub(crate) fn import_operation(
    verb: HttpMethod,
    path: &str,
    operation: &Value,
    path_level: &[Value],
    scope: &ImportScope<'_>,
) -> AppResult<(Method, Vec<Parameter>)> {
    let mut method = Method::new(verb, path);
    method.name = get_str(operation, "operationId");
    method.summary = get_str(operation, "summary");
    method.description = get_str(operation, "description");
    method.tags = string_list(operation.get("tags"));
    method.deprecated = get_bool(operation, "deprecated").unwrap_or(false);
    method.consumes = string_list(operation.get("consumes"));
    method.produces = string_list(operation.get("produces"));
    method.protocols = string_list(operation.get("schemes"));
    method.external_docs = import_external_docs(operation.get("externalDocs"));
    method.secured_by = import_requirements(operation.get("security"));
    method.annotations = import_extensions(operation, &[]);

    let own: &[Value] = operation
        .get("parameters")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut imported: Vec<ImportedParameter> = Vec::new();
    for raw in path_level.iter().chain(own.iter()) {
        let next = import_one_parameter(raw, scope, &mut method.is)?;
        // Operation level declarations override path level ones.
        if let ImportedParameter::Param(p) = &next {
            imported.retain(|existing| match existing {
                ImportedParameter::Param(e) => e.name != p.name || e.location != p.location,
                _ => true,
            });
        }
        imported.push(next);
    }

    let mut path_params = Vec::new();
    for entry in imported {
        match entry {
            ImportedParameter::Body(body) => method.bodies.push(body),
            ImportedParameter::Param(p) => match p.location {
                ParameterLocation::Path => path_params.push(p),
                ParameterLocation::Header => method.headers.push(p),
                ParameterLocation::FormData => method.form_bodies.push(p),
                ParameterLocation::Query => method.parameters.push(p),
            },
        }
    }

    if let Some(Value::Object(responses)) = operation.get("responses") {
        for (code, raw) in responses {
            if code.starts_with("x-") {
                continue;
            }
            let response = match raw.get("$ref").and_then(Value::as_str) {
                Some(reference) => resolve_response_ref(code, reference, scope, &mut method.is)?,
                None => import_response(code, raw)?,
            };
            method.responses.push(response);
        }
    }
    Ok((method, path_params))
}

fn resolve_response_ref(
    code: &str,
    reference: &str,
    scope: &ImportScope<'_>,
    traits: &mut Vec<TemplateRef>,
) -> AppResult<Response> {
    let key = decode_response_key(reference);
    let stub = Response {
        http_status_code: code.to_string(),
        reference: Some(key.clone()),
        ..Default::default()
    };
    if let Some((trait_name, field)) = parse_trait_field_key(&key) {
        let known = scope
            .root
            .find_trait(&trait_name)
            .map_or(false, |t| t.method.find_response(&field).is_some());
        if !known {
            return Err(AppError::unresolved(ReferenceKind::Response, key));
        }
        if !traits.iter().any(|t| t.name == trait_name) {
            traits.push(TemplateRef::named(trait_name));
        }
        return Ok(stub);
    }
    if scope.root.responses.contains_key(&key) {
        return Ok(stub);
    }
    Err(AppError::unresolved(ReferenceKind::Response, key))
}

fn decode_response_key(reference: &str) -> String {
    match reference.strip_prefix(RESPONSES_PREFIX) {
        Some(rest) => super::definition::decode_pointer_segment(rest),
        None => ref_name(reference),
    }
}

/// Reads an inline Response Object.
pub(crate) fn import_response(code: &str, value: &Value) -> AppResult<Response> {
    let mut response = Response {
        http_status_code: code.to_string(),
        description: get_str(value, "description").filter(|d| !d.is_empty()),
        annotations: import_extensions(value, &[]),
        ..Default::default()
    };
    if let Some(Value::Object(headers)) = value.get("headers") {
        for (name, header) in headers {
            response.headers.push(import_header(name, header)?);
        }
    }
    let schema = match value.get("schema") {
        Some(schema) => Some(import_schema(schema)?),
        None => None,
    };
    match value.get("examples") {
        Some(Value::Object(examples)) if !examples.is_empty() => {
            for (mime, example) in examples {
                let mut def = schema.clone().unwrap_or_default();
                def.example = Some(example.clone());
                response.bodies.push(Body {
                    mime_type: Some(mime.clone()),
                    definition: Some(def),
                    ..Default::default()
                });
            }
        }
        _ => {
            if let Some(def) = schema {
                response.bodies.push(Body {
                    definition: Some(def),
                    ..Default::default()
                });
            }
        }
    }
    Ok(response)
}

/// Writes a Response Object, or a `$ref` to a shared one.
pub(crate) fn export_response(response: &Response, root: &Root) -> Value {
    if let Some(reference) = &response.reference {
        let pointer = format!("{}{}", RESPONSES_PREFIX, encode_pointer_segment(reference));
        return json!({ "$ref": pointer });
    }
    let mut map = Map::new();
    map.insert(
        "description".into(),
        Value::String(response.description.clone().unwrap_or_default()),
    );

    let with_examples: Vec<&Body> = response
        .bodies
        .iter()
        .filter(|b| {
            b.mime_type.is_some() && b.definition.as_ref().map_or(false, |d| d.example.is_some())
        })
        .collect();
    if let Some(def) = response.bodies.iter().find_map(|b| b.definition.as_ref()) {
        let mut schema_def = def.clone();
        if !with_examples.is_empty() {
            schema_def.example = None;
        }
        if schema_def != Definition::default() {
            map.insert("schema".into(), export_schema(&schema_def, DEFINITIONS_PREFIX));
        }
    }
    if !with_examples.is_empty() {
        let examples: Map<String, Value> = with_examples
            .iter()
            .filter_map(|b| {
                let mime = b.mime_type.clone()?;
                let example = b.definition.as_ref()?.example.clone()?;
                Some((mime, example))
            })
            .collect();
        map.insert("examples".into(), Value::Object(examples));
    }
    if !response.headers.is_empty() {
        let headers: Map<String, Value> = response
            .headers
            .iter()
            .map(|h| (h.name.clone(), export_header(h, root)))
            .collect();
        map.insert("headers".into(), Value::Object(headers));
    }
    export_extensions(&mut map, &response.annotations);
    Value::Object(map)
}

fn resolve_type<'a>(def: &'a Definition, root: &'a Root) -> &'a Definition {
    match &def.reference {
        Some(name) if def.properties.is_empty() => root.find_type(name).unwrap_or(def),
        _ => def,
    }
}

/// Spreads the properties of an object type into individual parameters.
fn spread_properties(
    def: &Definition,
    location: ParameterLocation,
    root: &Root,
    owner: &str,
) -> Vec<Parameter> {
    let def = resolve_type(def, root);
    if def.properties.is_empty() {
        log::warn!(
            "{} on {} has no properties to spread into {} parameters",
            owner,
            def.name.as_deref().unwrap_or("method"),
            location
        );
    }
    let mut out: Vec<Parameter> = def
        .properties
        .iter()
        .map(|(name, prop)| Parameter {
            description: prop.description.clone(),
            ..Parameter::new(name.clone(), location, prop.clone(), def.is_required(name))
        })
        .collect();
    if let Some(AdditionalProperties::Typed(_)) = &def.additional_properties {
        log::warn!("pattern properties of {} cannot become Swagger parameters", owner);
    }
    for p in &mut out {
        if let Some(d) = &mut p.definition {
            d.description = None;
        }
    }
    out
}

fn collect_mimes<'a>(bodies: impl Iterator<Item = &'a Body>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for mime in bodies.filter_map(|b| b.mime_type.clone()) {
        if !out.contains(&mime) {
            out.push(mime);
        }
    }
    out
}

/// Writes an Operation Object.
pub(crate) fn export_operation(method: &Method, scope: &ExportScope<'_>) -> Value {
    let root = scope.root;
    let mut map = Map::new();
    insert_list(&mut map, "tags", &method.tags);
    insert_opt(&mut map, "summary", method.summary.clone());
    insert_opt(&mut map, "description", method.description.clone());
    insert_opt(&mut map, "externalDocs", method.external_docs.as_ref().map(export_external_docs));
    insert_opt(&mut map, "operationId", method.name.clone());

    let (form_bodies, bodies): (Vec<&Body>, Vec<&Body>) = method.bodies.iter().partition(|b| {
        b.mime_type
            .as_deref()
            .map_or(false, |m| FORM_MEDIA_TYPES.contains(&m))
    });

    let mut consumes = method.consumes.clone();
    if consumes.is_empty() {
        consumes = collect_mimes(method.bodies.iter());
    }
    if !consumes.is_empty() && Some(&consumes) != root.media_type.as_ref().map(|m| &m.consumes) {
        insert_list(&mut map, "consumes", &consumes);
    }
    let mut produces = method.produces.clone();
    if produces.is_empty() {
        produces = collect_mimes(method.responses.iter().flat_map(|r| r.bodies.iter()));
    }
    if !produces.is_empty() && Some(&produces) != root.media_type.as_ref().map(|m| &m.produces) {
        insert_list(&mut map, "produces", &produces);
    }

    let mut params: Vec<Value> = Vec::new();
    for header in &method.headers {
        params.push(export_parameter(header, root));
    }
    for query in &method.parameters {
        params.push(export_parameter(query, root));
    }
    for query_string in &method.query_strings {
        if let Some(def) = &query_string.definition {
            for p in spread_properties(def, ParameterLocation::Query, root, "queryString") {
                params.push(export_parameter(&p, root));
            }
        }
    }
    for form in &method.form_bodies {
        params.push(export_parameter(form, root));
    }
    if let Some(form) = form_bodies.first() {
        if let Some(def) = &form.definition {
            for p in spread_properties(def, ParameterLocation::FormData, root, "form body") {
                params.push(export_parameter(&p, root));
            }
        }
    }
    if let Some(body) = bodies.first() {
        if bodies.iter().skip(1).any(|b| b.definition != body.definition) {
            log::warn!(
                "{} {} has several request body types, only the first is kept",
                method.method,
                method.path
            );
        }
        params.push(export_body_parameter(body));
    }
    if !params.is_empty() {
        map.insert("parameters".into(), Value::Array(params));
    }

    let responses: Map<String, Value> = method
        .responses
        .iter()
        .map(|r| (r.http_status_code.clone(), export_response(r, root)))
        .collect();
    if !responses.is_empty() {
        map.insert("responses".into(), Value::Object(responses));
    }

    let schemes = swagger_schemes(&method.protocols);
    insert_list(&mut map, "schemes", &schemes);
    if method.deprecated {
        map.insert("deprecated".into(), Value::Bool(true));
    }
    let security = export_requirements(&method.secured_by, scope.security);
    if !security.is_empty() {
        map.insert("security".into(), Value::Array(security));
    }
    export_extensions(&mut map, &method.annotations);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InternalType, Trait};
    use pretty_assertions::assert_eq;

    fn search_trait() -> Trait {
        let mut method = Method::new(HttpMethod::Get, "");
        method.responses.push(Response {
            http_status_code: "200".into(),
            description: Some("found".into()),
            ..Default::default()
        });
        method.parameters.push(Parameter::new(
            "q",
            ParameterLocation::Query,
            Definition::of_type(InternalType::String),
            false,
        ));
        Trait {
            name: "search".into(),
            usage: None,
            method,
            annotations: vec![],
        }
    }

    #[test]
    fn test_trait_response_ref_resolves() {
        let root = Root {
            traits: vec![search_trait()],
            ..Default::default()
        };
        let doc = json!({});
        let scope = ImportScope { document: &doc, root: &root };
        let op = json!({
            "parameters": [{"$ref": "#/parameters/trait:search:q"}],
            "responses": {"200": {"$ref": "#/responses/trait:search:200"}}
        });
        let (method, _) = import_operation(HttpMethod::Get, "/pets", &op, &[], &scope).unwrap();
        assert_eq!(method.responses[0].reference.as_deref(), Some("trait:search:200"));
        assert_eq!(method.parameters[0].reference.as_deref(), Some("trait:search:q"));
        assert_eq!(method.is, vec![TemplateRef::named("search")]);
    }

    #[test]
    fn test_unknown_trait_response_is_rejected() {
        let root = Root::default();
        let doc = json!({});
        let scope = ImportScope { document: &doc, root: &root };
        let op = json!({"responses": {"200": {"$ref": "#/responses/trait:search:200"}}});
        let err = import_operation(HttpMethod::Get, "/pets", &op, &[], &scope).unwrap_err();
        assert!(matches!(
            err,
            AppError::UnresolvedReference { kind: ReferenceKind::Response, .. }
        ));
    }

    #[test]
    fn test_operation_parameter_overrides_path_level() {
        let root = Root::default();
        let doc = json!({});
        let scope = ImportScope { document: &doc, root: &root };
        let path_level = vec![json!({"name": "id", "in": "path", "type": "string"})];
        let op = json!({"parameters": [{"name": "id", "in": "path", "type": "integer"}]});
        let (_, path_params) =
            import_operation(HttpMethod::Get, "/a/{id}", &op, &path_level, &scope).unwrap();
        assert_eq!(path_params.len(), 1);
        assert_eq!(
            path_params[0].definition.as_ref().unwrap().internal_type,
            Some(InternalType::Integer)
        );
    }

    #[test]
    fn test_shared_body_parameter_is_inlined() {
        let root = Root::default();
        let doc = json!({"parameters": {
            "petBody": {"name": "pet", "in": "body", "schema": {"type": "object"}}
        }});
        let scope = ImportScope { document: &doc, root: &root };
        let op = json!({"parameters": [{"$ref": "#/parameters/petBody"}]});
        let (method, _) = import_operation(HttpMethod::Post, "/pets", &op, &[], &scope).unwrap();
        assert_eq!(method.bodies.len(), 1);
        assert_eq!(method.bodies[0].name.as_deref(), Some("pet"));
    }

    #[test]
    fn test_response_examples_round_trip() {
        let raw = json!({
            "description": "ok",
            "schema": {"$ref": "#/definitions/Pet"},
            "examples": {"application/json": {"name": "rex"}}
        });
        let response = import_response("200", &raw).unwrap();
        assert_eq!(response.bodies[0].mime_type.as_deref(), Some("application/json"));
        assert_eq!(export_response(&response, &Root::default()), raw);
    }

    #[test]
    fn test_export_form_body_as_form_data() {
        let mut def = Definition::of_type(InternalType::Object);
        def.properties.insert("file".into(), Definition::of_type(InternalType::File));
        def.mark_required("file");
        let mut method = Method::new(HttpMethod::Post, "/upload");
        method.bodies.push(Body {
            mime_type: Some("multipart/form-data".into()),
            definition: Some(def),
            ..Default::default()
        });
        let security = Map::new();
        let root = Root::default();
        let op = export_operation(&method, &ExportScope { root: &root, security: &security });
        assert_eq!(
            op,
            json!({
                "consumes": ["multipart/form-data"],
                "parameters": [{"name": "file", "in": "formData", "required": true, "type": "file"}]
            })
        );
    }
}
