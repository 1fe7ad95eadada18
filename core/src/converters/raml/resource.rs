//! # Resource Converter
//!
//! RAML nests resources by relative path (`/pets: /{id}: ...`).

use super::definition::ImportContext;
use super::method::{export_method, import_method, resolve_parameter_stub};
use super::parameter::{export_parameters, import_parameters};
use super::security::{export_secured_by, import_secured_by};
use super::template::{
    export_template_ref, export_template_refs, import_template_ref, import_template_refs,
};
use super::{split_annotations, ExportContext};
use crate::converters::json::{get_str, insert_object, insert_opt};
use crate::error::AppResult;
use crate::model::{HttpMethod, ParameterLocation, Resource};
use serde_json::{Map, Value};

/// Reads the child resources (`/...` keys) of a node.
pub(crate) fn import_resources(
    node: &Value,
    parent: Option<&str>,
    ctx: &mut ImportContext,
) -> AppResult<Vec<Resource>> {
    let Some(map) = node.as_object() else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for (key, value) in map.iter().filter(|(k, _)| k.starts_with('/')) {
        let path = match parent {
            Some(parent) => format!("{}{}", parent.trim_end_matches('/'), key),
            None => key.clone(),
        };
        let mut resource = Resource::new(path.clone(), key.clone(), parent.map(str::to_string));
        import_resource_fields(&mut resource, value, ctx)?;
        resource.resources = import_resources(value, Some(&path), ctx)?;
        out.push(resource);
    }
    Ok(out)
}

/// Reads everything but nested resources. Returns the methods marked
/// optional (`get?`), which only resource types may declare.
pub(crate) fn import_resource_fields(
    resource: &mut Resource,
    value: &Value,
    ctx: &mut ImportContext,
) -> AppResult<Vec<String>> {
    let mut optional = Vec::new();
    let Some(map) = value.as_object() else {
        return Ok(optional);
    };
    resource.display_name = get_str(value, "displayName");
    resource.description = get_str(value, "description");
    resource.annotations = split_annotations(value, &[]).0;
    resource.resource_type = value.get("type").and_then(import_template_ref);
    resource.is = import_template_refs(value.get("is"));
    resource.secured_by = import_secured_by(value.get("securedBy"));
    resource.parameters =
        import_parameters(value.get("uriParameters"), ParameterLocation::Path, ctx)?;

    for (key, node) in map {
        let (verb_name, is_optional) = match key.strip_suffix('?') {
            Some(stripped) => (stripped, true),
            None => (key.as_str(), false),
        };
        let Ok(verb) = verb_name.parse::<HttpMethod>() else { continue };
        resource.methods.push(import_method(verb, &resource.path, node, ctx)?);
        if is_optional {
            optional.push(verb_name.to_string());
        }
    }
    Ok(optional)
}

/// Writes a resource list keyed by relative path.
pub(crate) fn export_resources(
    resources: &[Resource],
    ctx: &mut ExportContext<'_>,
) -> AppResult<Map<String, Value>> {
    let mut out = Map::new();
    for resource in resources {
        let mut map = export_resource_fields(resource, &[], ctx)?;
        map.extend(export_resources(&resource.resources, ctx)?);
        out.insert(resource.relative_path.clone(), Value::Object(map));
    }
    Ok(out)
}

/// Writes everything but nested resources.
pub(crate) fn export_resource_fields(
    resource: &Resource,
    optional_methods: &[String],
    ctx: &mut ExportContext<'_>,
) -> AppResult<Map<String, Value>> {
    let mut map = Map::new();
    insert_opt(&mut map, "displayName", resource.display_name.clone());
    insert_opt(&mut map, "description", resource.description.clone());
    ctx.write_annotations(&mut map, &resource.annotations);
    if let Some(resource_type) = &resource.resource_type {
        map.insert("type".into(), export_template_ref(resource_type));
    }
    if !resource.is.is_empty() {
        map.insert("is".into(), export_template_refs(&resource.is));
    }
    if !resource.secured_by.is_empty() {
        map.insert("securedBy".into(), export_secured_by(&resource.secured_by));
    }

    let mut uri_params = Vec::new();
    for param in &resource.parameters {
        if let Some(resolved) = resolve_parameter_stub(param, &[], ctx.root)? {
            uri_params.push(resolved);
        }
    }
    insert_object(&mut map, "uriParameters", export_parameters(&uri_params, ctx));

    for method in &resource.methods {
        let verb = method.method.as_str();
        let key = if optional_methods.iter().any(|m| m == verb) {
            format!("{}?", verb)
        } else {
            verb.to_string()
        };
        let exported = export_method(method, ctx)?;
        map.insert(key, exported);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::Format;
    use crate::model::{Root, TemplateRef};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_nested_resources() {
        let node = json!({
            "title": "API",
            "/pets": {
                "type": {"collection": {"item": "Pet"}},
                "get": {},
                "/{id}": {"uriParameters": {"id": "integer"}, "delete": {}}
            }
        });
        let mut ctx = ImportContext::new(Format::Raml10);
        let resources = import_resources(&node, None, &mut ctx).unwrap();
        assert_eq!(resources.len(), 1);
        let pets = &resources[0];
        assert_eq!(pets.resource_type.as_ref().unwrap().name, "collection");
        let item = &pets.resources[0];
        assert_eq!(item.path, "/pets/{id}");
        assert_eq!(item.relative_path, "/{id}");
        assert_eq!(item.parent_path.as_deref(), Some("/pets"));
        assert_eq!(item.parameters[0].name, "id");
        assert_eq!(item.methods[0].method, HttpMethod::Delete);
        assert_eq!(item.methods[0].path, "/pets/{id}");
    }

    #[test]
    fn test_export_nests_by_relative_path() {
        let mut pets = Resource::new("/pets", "/pets", None);
        pets.is.push(TemplateRef::named("paged"));
        pets.methods.push(crate::model::Method::new(HttpMethod::Get, "/pets"));
        let mut item = Resource::new("/pets/{id}", "/{id}", Some("/pets".into()));
        item.display_name = Some("Pet".into());
        pets.resources.push(item);

        let root = Root::default();
        let mut ctx = ExportContext::new(Format::Raml10, &root);
        let exported = export_resources(&[pets], &mut ctx).unwrap();
        assert_eq!(
            Value::Object(exported),
            json!({"/pets": {"is": ["paged"], "get": {}, "/{id}": {"displayName": "Pet"}}})
        );
    }
}
