//! # Root Converter
//!
//! Document level RAML nodes. Swagger-only root data (`info` contact and
//! license, tag declarations, external docs, non-HTTP schemes) travels in
//! `(oas-*)` annotations.

use super::definition::{
    export_schema_text, export_type, import_schema_text, import_type, ImportContext,
};
use super::method::export_protocols;
use super::parameter::{export_parameters, import_parameters};
use super::resource::{export_resources, import_resources};
use super::security::{
    export_secured_by, export_security_schemes, import_secured_by, import_security_schemes,
};
use super::template::{
    export_resource_types, export_traits, import_resource_types, import_traits, named_collection,
};
use super::{split_annotations, version_value, ExportContext};
use crate::converters::annotations::{
    export_extensions, import_annotation_type, import_extensions, OAS_PREFIX,
};
use crate::converters::json::{
    get_str, insert_object, insert_opt, named_entries, scalar_to_string, string_list,
};
use crate::converters::swagger::definition::{export_external_docs, import_external_docs};
use crate::converters::swagger::root::split_uri;
use crate::error::AppResult;
use crate::formats::Format;
use crate::model::{
    BaseUri, Contact, Definition, Documentation, Info, License, MediaType, ParameterLocation, Root,
    Tag,
};
use serde_json::{json, Map, Value};

const LIFTED: [&str; 4] = ["oas-info", "oas-tags-definition", "oas-externalDocs", "oas-schemes"];

/// Reads a RAML document.
pub(crate) fn import_root(doc: &Value, version: Format) -> AppResult<Root> {
    let mut ctx = ImportContext::new(version);
    let (annotations, lifted) = split_annotations(doc, &LIFTED);

    let mut root = Root {
        info: import_info(doc, lifted[0].as_ref()),
        annotations,
        ..Default::default()
    };
    root.base_uri = import_base_uri(doc, &mut ctx)?;
    root.protocols = string_list(doc.get("protocols"))
        .into_iter()
        .map(|p| p.to_lowercase())
        .chain(string_list(lifted[3].as_ref()))
        .collect();
    let media_types = string_list(doc.get("mediaType"));
    if !media_types.is_empty() {
        root.media_type = Some(MediaType {
            consumes: media_types.clone(),
            produces: media_types,
        });
    }
    if let Some(Value::Array(pages)) = doc.get("documentation") {
        root.documentation = pages
            .iter()
            .map(|p| Documentation {
                title: get_str(p, "title").unwrap_or_default(),
                content: get_str(p, "content").unwrap_or_default(),
            })
            .collect();
    }
    if let Some(Value::Array(tags)) = &lifted[1] {
        root.tags = tags
            .iter()
            .map(|t| Tag {
                name: get_str(t, "name").unwrap_or_default(),
                description: get_str(t, "description"),
                external_docs: import_external_docs(t.get("externalDocs")),
            })
            .collect();
    }
    root.external_docs = import_external_docs(lifted[2].as_ref());

    root.security_definitions = import_security_schemes(doc.get("securitySchemes"), &mut ctx)?;
    root.secured_by = import_secured_by(doc.get("securedBy"));
    root.types = import_types(doc, &mut ctx)?;
    root.annotation_types = named_entries(doc.get("annotationTypes"))
        .into_iter()
        .filter(|(name, _)| !name.starts_with(OAS_PREFIX))
        .map(|(name, decl)| import_annotation_type(&name, &decl))
        .collect();
    root.resource_types = import_resource_types(doc.get("resourceTypes"), &mut ctx)?;
    root.traits = import_traits(doc.get("traits"), &mut ctx)?;
    root.resources = import_resources(doc, None, &mut ctx)?;

    for embedded in std::mem::take(&mut ctx.embedded) {
        let exists = root.types.iter().any(|t| t.name == embedded.name);
        if !exists {
            root.types.push(embedded);
        }
    }

    log::debug!(
        "imported {} document: {} types, {} traits, {} resource types, {} top level resources",
        version.display_name(),
        root.types.len(),
        root.traits.len(),
        root.resource_types.len(),
        root.resources.len()
    );
    Ok(root)
}

fn import_info(doc: &Value, carried: Option<&Value>) -> Info {
    let mut info = Info {
        title: get_str(doc, "title").unwrap_or_default(),
        description: get_str(doc, "description"),
        version: get_str(doc, "version"),
        ..Default::default()
    };
    if let Some(carried) = carried {
        info.terms_of_service = get_str(carried, "termsOfService");
        info.contact = carried.get("contact").map(|c| Contact {
            name: get_str(c, "name"),
            url: get_str(c, "url"),
            email: get_str(c, "email"),
        });
        info.license = carried.get("license").map(|l| License {
            name: get_str(l, "name").unwrap_or_default(),
            url: get_str(l, "url"),
        });
        info.annotations = import_extensions(carried, &[]);
    }
    info
}

fn import_base_uri(doc: &Value, ctx: &mut ImportContext) -> AppResult<Option<BaseUri>> {
    let (uri, annotations) = match doc.get("baseUri") {
        None => return Ok(None),
        Some(node) if node.is_object() => (
            get_str(node, "value").unwrap_or_default(),
            split_annotations(node, &[]).0,
        ),
        Some(other) => (scalar_to_string(other).unwrap_or_default(), Vec::new()),
    };
    let (protocol, host, base_path) = split_uri(&uri);
    let parameters = import_parameters(doc.get("baseUriParameters"), ParameterLocation::Path, ctx)?;
    Ok(Some(BaseUri {
        uri,
        host,
        base_path,
        protocol,
        parameters,
        annotations,
    }))
}

fn import_types(doc: &Value, ctx: &mut ImportContext) -> AppResult<Vec<Definition>> {
    let mut types = Vec::new();
    if ctx.version == Format::Raml08 {
        for (name, schema) in named_entries(doc.get("schemas")) {
            let mut def = match schema.as_str() {
                Some(text) => import_schema_text(text, ctx)?,
                None => import_type(&schema, ctx)?,
            };
            def.name = Some(name);
            types.push(def);
        }
        return Ok(types);
    }
    let declarations = named_entries(doc.get("types"))
        .into_iter()
        .chain(named_entries(doc.get("schemas")));
    for (name, decl) in declarations {
        let mut def = import_type(&decl, ctx)?;
        def.name = Some(name);
        types.push(def);
    }
    Ok(types)
}

/// Writes a RAML document.
pub(crate) fn export_root(root: &Root, version: Format) -> AppResult<Value> {
    let mut ctx = ExportContext::new(version, root);

    // Sections are built first so every annotation they use is declared
    // before `annotationTypes` is written.
    let mut head = Map::new();
    head.insert("title".into(), Value::String(root.info.title.clone()));
    insert_opt(&mut head, "description", root.info.description.clone());
    if let Some(v) = &root.info.version {
        head.insert("version".into(), version_value(v));
    }
    if let Some(base) = &root.base_uri {
        head.insert("baseUri".into(), Value::String(base.uri.clone()));
        let parameters = export_parameters(&base.parameters, &mut ctx);
        insert_object(&mut head, "baseUriParameters", parameters);
    }
    export_protocols(&root.protocols, &mut ctx, &mut head);
    if let Some(media) = &root.media_type {
        match media.merged().as_slice() {
            [] => {}
            [single] => {
                head.insert("mediaType".into(), Value::String(single.clone()));
            }
            many => {
                head.insert("mediaType".into(), json!(many));
            }
        }
    }
    if !root.documentation.is_empty() {
        head.insert(
            "documentation".into(),
            Value::Array(
                root.documentation
                    .iter()
                    .map(|d| json!({"title": d.title, "content": d.content}))
                    .collect(),
            ),
        );
    }

    let mut body = Map::new();
    let schemes = export_security_schemes(&root.security_definitions, &mut ctx)?;
    if !schemes.is_empty() {
        body.insert("securitySchemes".into(), named_collection(schemes, &ctx));
    }
    let types = export_types(root, &mut ctx)?;
    if !types.is_empty() {
        let key = if ctx.is_v10() { "types" } else { "schemas" };
        body.insert(key.into(), named_collection(types, &ctx));
    }
    if let Some(traits) = export_traits(&root.traits, &mut ctx)? {
        body.insert("traits".into(), traits);
    }
    if let Some(resource_types) = export_resource_types(&root.resource_types, &mut ctx)? {
        body.insert("resourceTypes".into(), resource_types);
    }
    if !root.secured_by.is_empty() {
        body.insert("securedBy".into(), export_secured_by(&root.secured_by));
    }

    let mut annotations = Map::new();
    if let Some(info) = info_annotation(&root.info) {
        ctx.write_annotation(&mut annotations, "oas-info", info);
    }
    if !root.tags.is_empty() {
        ctx.write_annotation(&mut annotations, "oas-tags-definition", tags_annotation(&root.tags));
    }
    if let Some(docs) = &root.external_docs {
        ctx.write_annotation(&mut annotations, "oas-externalDocs", export_external_docs(docs));
    }
    ctx.write_annotations(&mut annotations, &root.annotations);

    let resources = export_resources(&root.resources, &mut ctx)?;

    let mut doc = head;
    if ctx.is_v10() && !ctx.registry.is_empty() {
        doc.insert("annotationTypes".into(), ctx.registry.to_value());
    }
    doc.extend(body);
    doc.extend(annotations);
    doc.extend(resources);
    Ok(Value::Object(doc))
}

fn export_types(root: &Root, ctx: &mut ExportContext<'_>) -> AppResult<Map<String, Value>> {
    let mut out = Map::new();
    for def in &root.types {
        let Some(name) = &def.name else { continue };
        let value = if ctx.is_v10() {
            let unnamed = Definition {
                name: None,
                ..def.clone()
            };
            export_type(&unnamed, ctx)
        } else {
            Value::String(export_schema_text(def, root)?)
        };
        out.insert(name.clone(), value);
    }
    Ok(out)
}

fn info_annotation(info: &Info) -> Option<Value> {
    if info.terms_of_service.is_none()
        && info.contact.is_none()
        && info.license.is_none()
        && info.annotations.is_empty()
    {
        return None;
    }
    let mut map = Map::new();
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
    // Info-level extensions stay `x-*` keys inside the carrier.
    export_extensions(&mut map, &info.annotations);
    Some(Value::Object(map))
}

fn tags_annotation(tags: &[Tag]) -> Value {
    Value::Array(
        tags.iter()
            .map(|tag| {
                let mut map = Map::new();
                map.insert("name".into(), Value::String(tag.name.clone()));
                insert_opt(&mut map, "description", tag.description.clone());
                let docs = tag.external_docs.as_ref().map(export_external_docs);
                insert_opt(&mut map, "externalDocs", docs);
                Value::Object(map)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdditionalProperties, InternalType};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_import_types_and_annotations() {
        let doc = json!({
            "title": "Pets",
            "version": 1,
            "baseUri": "https://api.example.com/{version}",
            "protocols": ["HTTPS"],
            "mediaType": ["application/json", "application/xml"],
            "(oas-info)": {"termsOfService": "https://example.com/tos", "license": {"name": "MIT"}},
            "annotationTypes": {"oas-info": {"type": "object"}, "rating": "integer"},
            "(rating)": 5,
            "types": {
                "Pet": {"type": "object", "properties": {"name": "string", "tag?": "string"}},
                "Tags": {"type": "object", "properties": {"//": "string"}}
            }
        });
        let root = import_root(&doc, Format::Raml10).unwrap();
        assert_eq!(root.info.version.as_deref(), Some("1"));
        assert_eq!(root.info.terms_of_service.as_deref(), Some("https://example.com/tos"));
        assert_eq!(root.info.license.as_ref().unwrap().name, "MIT");
        assert_eq!(root.protocols, vec!["https"]);
        let base = root.base_uri.as_ref().unwrap();
        assert_eq!(base.host.as_deref(), Some("api.example.com"));
        assert_eq!(base.base_path.as_deref(), Some("/{version}"));
        assert_eq!(root.media_type.as_ref().unwrap().consumes.len(), 2);
        assert_eq!(root.annotation_types.len(), 1);
        assert_eq!(root.annotations[0].name, "rating");

        let pet = root.find_type("Pet").unwrap();
        assert_eq!(pet.internal_type, Some(InternalType::Object));
        assert_eq!(pet.props_required, vec!["name"]);
        let tags = root.find_type("Tags").unwrap();
        assert!(matches!(tags.additional_properties, Some(AdditionalProperties::Typed(_))));
    }

    #[test]
    fn test_raml08_schemas_merge_embedded_definitions() {
        let schema = r##"{
            "type": "object",
            "properties": {"owner": {"$ref": "#/definitions/Owner"}},
            "definitions": {"Owner": {"type": "string"}}
        }"##;
        let doc = json!({"title": "Pets", "schemas": [{"Pet": schema}]});
        let root = import_root(&doc, Format::Raml08).unwrap();
        let names: Vec<&str> = root.types.iter().filter_map(|t| t.name.as_deref()).collect();
        assert_eq!(names, vec!["Pet", "Owner"]);
    }

    #[test]
    fn test_export_declares_synthesized_annotations() {
        let root = Root {
            info: Info {
                title: "Pets".into(),
                version: Some("1".into()),
                terms_of_service: Some("https://example.com/tos".into()),
                ..Default::default()
            },
            protocols: vec!["https".into(), "ws".into()],
            ..Default::default()
        };
        let exported = export_root(&root, Format::Raml10).unwrap();
        assert_eq!(exported["version"], json!(1));
        assert_eq!(exported["protocols"], json!(["HTTPS"]));
        assert_eq!(exported["(oas-schemes)"], json!(["ws"]));
        assert_eq!(exported["(oas-info)"], json!({"termsOfService": "https://example.com/tos"}));
        let declared = exported["annotationTypes"].as_object().unwrap();
        assert!(declared.contains_key("oas-info"));
        assert!(declared.contains_key("oas-schemes"));

        let raml08 = export_root(&root, Format::Raml08).unwrap();
        assert!(raml08.get("annotationTypes").is_none());
        assert!(raml08.get("(oas-info)").is_none());
    }

    #[test]
    fn test_raml08_exports_schemas_as_json_text() {
        let mut pet = Definition::of_type(InternalType::Object);
        pet.name = Some("Pet".into());
        pet.properties.insert("name".into(), Definition::of_type(InternalType::String));
        let root = Root {
            info: Info {
                title: "Pets".into(),
                ..Default::default()
            },
            types: vec![pet],
            ..Default::default()
        };
        let exported = export_root(&root, Format::Raml08).unwrap();
        let text = exported["schemas"][0]["Pet"].as_str().unwrap();
        let schema: Value = serde_json::from_str(text).unwrap();
        assert_eq!(schema["$schema"], json!("http://json-schema.org/draft-04/schema#"));
        assert_eq!(schema["properties"]["name"], json!({"type": "string"}));
    }
}
