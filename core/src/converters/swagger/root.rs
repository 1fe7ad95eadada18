//! # Root Converter
//!
//! Info, base URI, media types, shared components and the RAML-only root
//! data Swagger carries in extensions (`x-documentation`,
//! `x-annotation-types`, `x-baseUri`, `x-baseUriParameters`).

use super::definition::{
    export_external_docs, export_schema, import_external_docs, import_schema, DEFINITIONS_PREFIX,
};
use super::method::{export_response, import_response, ExportScope, ImportScope};
use super::parameter::{export_parameter, import_body_parameter, import_parameter};
use super::resource::{export_paths, import_paths};
use super::security::{
    export_requirements, export_security_definitions, import_requirements,
    import_security_definitions,
};
use super::swagger_schemes;
use crate::converters::annotations::{
    declaration_value, export_extensions, import_annotation_type, import_extensions,
    SWAGGER_ANNOTATION_TYPES,
};
use crate::converters::json::{get_str, insert_list, insert_object, insert_opt, string_list};
use crate::converters::naming::{parse_trait_field_key, trait_field_key, TraitKeyStyle};
use crate::converters::placeholders::has_placeholders;
use crate::error::AppResult;
use crate::model::{
    BaseUri, Contact, Documentation, HttpMethod, Info, License, MediaType, Method,
    ParameterLocation, Root, Tag, Trait,
};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

const X_DOCUMENTATION: &str = "x-documentation";
const X_BASE_URI: &str = "x-baseUri";
const X_BASE_URI_PARAMETERS: &str = "x-baseUriParameters";

const ROOT_EXTENSIONS: [&str; 3] = [X_DOCUMENTATION, X_BASE_URI, X_BASE_URI_PARAMETERS];

fn uri_regex() -> &'static Regex {
    static URI_RE: OnceLock<Regex> = OnceLock::new();
    URI_RE.get_or_init(|| {
        Regex::new(r"^(?:([A-Za-z][A-Za-z0-9+.\-]*)://)?([^/]*)(/.*)?$").expect("Invalid regex")
    })
}

/// Splits a base URI into `(protocol, host, path)`.
pub(crate) fn split_uri(uri: &str) -> (Option<String>, Option<String>, Option<String>) {
    match uri_regex().captures(uri) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().to_lowercase()),
            caps.get(2).map(|m| m.as_str().to_string()).filter(|h| !h.is_empty()),
            caps.get(3).map(|m| m.as_str().to_string()),
        ),
        None => (None, None, Some(uri.to_string())),
    }
}

fn trait_entry<'a>(root: &'a mut Root, name: &str) -> &'a mut Trait {
    if let Some(idx) = root.traits.iter().position(|t| t.name == name) {
        return &mut root.traits[idx];
    }
    root.traits.push(Trait {
        name: name.to_string(),
        usage: None,
        method: Method::new(HttpMethod::Get, ""),
        annotations: Vec::new(),
    });
    let last = root.traits.len() - 1;
    &mut root.traits[last]
}

/// Reads a Swagger document.
pub(crate) fn import_root(doc: &Value) -> AppResult<Root> {
    let mut root = Root {
        info: import_info(doc.get("info")),
        protocols: string_list(doc.get("schemes"))
            .into_iter()
            .map(|s| s.to_lowercase())
            .collect(),
        ..Default::default()
    };
    root.base_uri = import_base_uri(doc, &root.protocols)?;

    let consumes = string_list(doc.get("consumes"));
    let produces = string_list(doc.get("produces"));
    if !consumes.is_empty() || !produces.is_empty() {
        root.media_type = Some(MediaType { consumes, produces });
    }

    root.security_definitions = import_security_definitions(doc.get("securityDefinitions"))?;
    root.secured_by = import_requirements(doc.get("security"));

    if let Some(Value::Object(definitions)) = doc.get("definitions") {
        for (name, schema) in definitions {
            let mut def = import_schema(schema)?;
            def.name = Some(name.clone());
            root.types.push(def);
        }
    }

    import_shared_parameters(doc, &mut root)?;
    import_shared_responses(doc, &mut root)?;

    let resources = {
        let scope = ImportScope { document: doc, root: &root };
        import_paths(doc.get("paths"), &scope)?
    };
    root.resources = resources;

    if let Some(Value::Array(tags)) = doc.get("tags") {
        root.tags = tags
            .iter()
            .map(|t| Tag {
                name: get_str(t, "name").unwrap_or_default(),
                description: get_str(t, "description"),
                external_docs: import_external_docs(t.get("externalDocs")),
            })
            .collect();
    }
    root.external_docs = import_external_docs(doc.get("externalDocs"));
    if let Some(Value::Array(pages)) = doc.get(X_DOCUMENTATION) {
        root.documentation = pages
            .iter()
            .map(|p| Documentation {
                title: get_str(p, "title").unwrap_or_default(),
                content: get_str(p, "content").unwrap_or_default(),
            })
            .collect();
    }
    if let Some(Value::Object(types)) = doc.get(SWAGGER_ANNOTATION_TYPES) {
        root.annotation_types = types
            .iter()
            .map(|(name, decl)| import_annotation_type(name, decl))
            .collect();
    }
    root.annotations = import_extensions(doc, &ROOT_EXTENSIONS);

    log::debug!(
        "imported Swagger document: {} types, {} traits, {} top level resources",
        root.types.len(),
        root.traits.len(),
        root.resources.len()
    );
    Ok(root)
}

fn import_info(value: Option<&Value>) -> Info {
    let Some(info) = value else {
        return Info::default();
    };
    Info {
        title: get_str(info, "title").unwrap_or_default(),
        description: get_str(info, "description"),
        version: get_str(info, "version").filter(|v| !v.is_empty()),
        terms_of_service: get_str(info, "termsOfService"),
        contact: info.get("contact").map(|c| Contact {
            name: get_str(c, "name"),
            url: get_str(c, "url"),
            email: get_str(c, "email"),
        }),
        license: info.get("license").map(|l| License {
            name: get_str(l, "name").unwrap_or_default(),
            url: get_str(l, "url"),
        }),
        annotations: import_extensions(info, &[]),
    }
}

fn import_base_uri(doc: &Value, protocols: &[String]) -> AppResult<Option<BaseUri>> {
    let host = get_str(doc, "host");
    let base_path = get_str(doc, "basePath");
    let template = get_str(doc, X_BASE_URI);
    if host.is_none() && base_path.is_none() && template.is_none() {
        return Ok(None);
    }
    let protocol = host.as_ref().map(|_| {
        protocols
            .first()
            .cloned()
            .unwrap_or_else(|| "http".to_string())
    });
    let uri = match (&template, &host, &protocol) {
        (Some(t), _, _) => t.clone(),
        (None, Some(h), Some(p)) => {
            format!("{}://{}{}", p, h, base_path.clone().unwrap_or_default())
        }
        _ => base_path.clone().unwrap_or_default(),
    };
    let mut parameters = Vec::new();
    if let Some(Value::Object(params)) = doc.get(X_BASE_URI_PARAMETERS) {
        for raw in params.values() {
            parameters.push(import_parameter(raw)?);
        }
    }
    Ok(Some(BaseUri {
        uri,
        host,
        base_path,
        protocol,
        parameters,
        annotations: Vec::new(),
    }))
}

/// Shared parameters; `trait:<t>:<f>` entries fold into trait `t`.
fn import_shared_parameters(doc: &Value, root: &mut Root) -> AppResult<()> {
    let Some(Value::Object(params)) = doc.get("parameters") else {
        return Ok(());
    };
    for (key, raw) in params {
        let is_body = get_str(raw, "in").as_deref() == Some("body");
        match parse_trait_field_key(key) {
            Some((trait_name, _)) => {
                let template = &mut trait_entry(root, &trait_name).method;
                if is_body {
                    template.bodies.push(import_body_parameter(raw)?);
                    continue;
                }
                let param = import_parameter(raw)?;
                match param.location {
                    ParameterLocation::Header => template.headers.push(param),
                    ParameterLocation::FormData => template.form_bodies.push(param),
                    ParameterLocation::Query | ParameterLocation::Path => {
                        template.parameters.push(param)
                    }
                }
            }
            // Shared body parameters are inlined at their use sites.
            None if is_body => {}
            None => {
                let param = import_parameter(raw)?;
                root.parameters.insert(key.clone(), param);
            }
        }
    }
    Ok(())
}

fn import_shared_responses(doc: &Value, root: &mut Root) -> AppResult<()> {
    let Some(Value::Object(responses)) = doc.get("responses") else {
        return Ok(());
    };
    for (key, raw) in responses {
        match parse_trait_field_key(key) {
            Some((trait_name, code)) => {
                let response = import_response(&code, raw)?;
                trait_entry(root, &trait_name).method.responses.push(response);
            }
            None => {
                let response = import_response(key, raw)?;
                root.responses.insert(key.clone(), response);
            }
        }
    }
    Ok(())
}

/// Writes a Swagger document.
pub(crate) fn export_root(root: &Root) -> AppResult<Value> {
    let mut doc = Map::new();
    doc.insert("swagger".into(), json!("2.0"));
    doc.insert("info".into(), export_info(&root.info));

    let mut protocols = swagger_schemes(&root.protocols);
    if let Some(base) = &root.base_uri {
        export_base_uri(base, root.info.version.as_deref(), &mut doc, root);
        if protocols.is_empty() {
            let (scheme, _, _) = split_uri(&base.uri);
            protocols = swagger_schemes(&scheme.into_iter().collect::<Vec<_>>());
        }
    }
    insert_list(&mut doc, "schemes", &protocols);
    if let Some(media) = &root.media_type {
        insert_list(&mut doc, "consumes", &media.consumes);
        insert_list(&mut doc, "produces", &media.produces);
    }

    let security = export_security_definitions(&root.security_definitions);
    let scope = ExportScope {
        root,
        security: &security,
    };
    doc.insert("paths".into(), Value::Object(export_paths(&root.resources, &scope)));

    let definitions: Map<String, Value> = root
        .types
        .iter()
        .filter_map(|def| {
            def.name
                .as_ref()
                .map(|name| (name.clone(), export_schema(def, DEFINITIONS_PREFIX)))
        })
        .collect();
    insert_object(&mut doc, "definitions", definitions);
    insert_object(&mut doc, "parameters", export_shared_parameters(root));
    insert_object(&mut doc, "responses", export_shared_responses(root));
    insert_object(&mut doc, "securityDefinitions", security.clone());
    let requirements = export_requirements(&root.secured_by, &security);
    if !requirements.is_empty() {
        doc.insert("security".into(), Value::Array(requirements));
    }

    if !root.tags.is_empty() {
        let tags: Vec<Value> = root
            .tags
            .iter()
            .map(|t| {
                let mut tag = Map::new();
                tag.insert("name".into(), Value::String(t.name.clone()));
                insert_opt(&mut tag, "description", t.description.clone());
                let docs = t.external_docs.as_ref().map(export_external_docs);
                insert_opt(&mut tag, "externalDocs", docs);
                Value::Object(tag)
            })
            .collect();
        doc.insert("tags".into(), Value::Array(tags));
    }
    insert_opt(&mut doc, "externalDocs", root.external_docs.as_ref().map(export_external_docs));
    if !root.documentation.is_empty() {
        let pages: Vec<Value> = root
            .documentation
            .iter()
            .map(|d| json!({"title": d.title, "content": d.content}))
            .collect();
        doc.insert(X_DOCUMENTATION.into(), Value::Array(pages));
    }
    if !root.annotation_types.is_empty() {
        let types: Map<String, Value> = root
            .annotation_types
            .iter()
            .map(|t| (t.name.clone(), declaration_value(t)))
            .collect();
        doc.insert(SWAGGER_ANNOTATION_TYPES.into(), Value::Object(types));
    }
    export_extensions(&mut doc, &root.annotations);
    Ok(Value::Object(doc))
}

fn export_info(info: &Info) -> Value {
    let mut map = Map::new();
    map.insert("title".into(), Value::String(info.title.clone()));
    insert_opt(&mut map, "description", info.description.clone());
    map.insert(
        "version".into(),
        Value::String(info.version.clone().unwrap_or_default()),
    );
    insert_opt(&mut map, "termsOfService", info.terms_of_service.clone());
    if let Some(contact) = &info.contact {
        let mut c = Map::new();
        insert_opt(&mut c, "name", contact.name.clone());
        insert_opt(&mut c, "url", contact.url.clone());
        insert_opt(&mut c, "email", contact.email.clone());
        map.insert("contact".into(), Value::Object(c));
    }
    if let Some(license) = &info.license {
        let mut l = Map::new();
        l.insert("name".into(), Value::String(license.name.clone()));
        insert_opt(&mut l, "url", license.url.clone());
        map.insert("license".into(), Value::Object(l));
    }
    export_extensions(&mut map, &info.annotations);
    Value::Object(map)
}

fn export_base_uri(
    base: &BaseUri,
    version: Option<&str>,
    doc: &mut Map<String, Value>,
    root: &Root,
) {
    let expanded = match version {
        Some(v) => base.uri.replace("{version}", v),
        None => base.uri.clone(),
    };
    let (_, host, path) = split_uri(&expanded);
    if let Some(host) = host.filter(|h| !h.contains('{')) {
        doc.insert("host".into(), Value::String(host));
    }
    if let Some(path) = path.filter(|p| !p.contains('{')) {
        doc.insert("basePath".into(), Value::String(path));
    }
    if base.uri.contains('{') {
        log::debug!("templated base URI '{}' kept in {}", base.uri, X_BASE_URI);
        doc.insert(X_BASE_URI.into(), Value::String(base.uri.clone()));
    }
    if !base.parameters.is_empty() {
        let params: Map<String, Value> = base
            .parameters
            .iter()
            .map(|p| {
                let mut path_param = p.clone();
                path_param.location = ParameterLocation::Path;
                (p.name.clone(), export_parameter(&path_param, root))
            })
            .collect();
        doc.insert(X_BASE_URI_PARAMETERS.into(), Value::Object(params));
    }
}

fn export_shared_parameters(root: &Root) -> Map<String, Value> {
    let mut out: Map<String, Value> = root
        .parameters
        .iter()
        .map(|(key, p)| (key.clone(), export_parameter(p, root)))
        .collect();
    for trait_ in &root.traits {
        if has_placeholders(&trait_.method) {
            continue;
        }
        let template = &trait_.method;
        let fields = template
            .headers
            .iter()
            .chain(template.parameters.iter())
            .chain(template.form_bodies.iter());
        for param in fields {
            out.insert(
                trait_field_key(TraitKeyStyle::Colon, &trait_.name, &param.name),
                export_parameter(param, root),
            );
        }
    }
    out
}

fn export_shared_responses(root: &Root) -> Map<String, Value> {
    let mut out: Map<String, Value> = root
        .responses
        .iter()
        .map(|(key, r)| (key.clone(), export_response(r, root)))
        .collect();
    for trait_ in &root.traits {
        if has_placeholders(&trait_.method) {
            continue;
        }
        for response in &trait_.method.responses {
            out.insert(
                trait_field_key(TraitKeyStyle::Colon, &trait_.name, &response.http_status_code),
                export_response(response, root),
            );
        }
    }
    out
}
