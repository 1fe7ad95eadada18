//! # Trait / Resource Type Converter

use super::definition::ImportContext;
use super::method::{export_method, import_method};
use super::resource::{export_resource_fields, import_resource_fields};
use super::ExportContext;
use crate::converters::json::{get_str, named_entries};
use crate::error::AppResult;
use crate::model::{HttpMethod, Resource, ResourceType, TemplateRef, Trait};
use serde_json::{Map, Value};

/// Reads one `is` / `type` entry: `name` or `{name: {param: value}}`.
pub(crate) fn import_template_ref(value: &Value) -> Option<TemplateRef> {
    match value {
        Value::String(name) => Some(TemplateRef::named(name.clone())),
        Value::Object(map) => {
            let (name, params) = map.iter().next()?;
            let parameters = params
                .as_object()
                .map(|p| p.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default();
            Some(TemplateRef {
                name: name.clone(),
                parameters,
            })
        }
        _ => None,
    }
}

/// Reads an `is` list (a single entry is accepted too).
pub(crate) fn import_template_refs(value: Option<&Value>) -> Vec<TemplateRef> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(import_template_ref).collect(),
        Some(single) => import_template_ref(single).into_iter().collect(),
        None => Vec::new(),
    }
}

pub(crate) fn export_template_ref(template: &TemplateRef) -> Value {
    if template.parameters.is_empty() {
        return Value::String(template.name.clone());
    }
    let params: Map<String, Value> = template
        .parameters
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let mut map = Map::new();
    map.insert(template.name.clone(), Value::Object(params));
    Value::Object(map)
}

pub(crate) fn export_template_refs(templates: &[TemplateRef]) -> Value {
    Value::Array(templates.iter().map(export_template_ref).collect())
}

/// Reads `traits` (map, or RAML 0.8 list of maps).
pub(crate) fn import_traits(
    value: Option<&Value>,
    ctx: &mut ImportContext,
) -> AppResult<Vec<Trait>> {
    let mut out = Vec::new();
    for (name, body) in named_entries(value) {
        let mut method = import_method(HttpMethod::Get, "", &body, ctx)?;
        let annotations = std::mem::take(&mut method.annotations);
        out.push(Trait {
            name,
            usage: get_str(&body, "usage"),
            method,
            annotations,
        });
    }
    Ok(out)
}

/// Reads `resourceTypes`.
pub(crate) fn import_resource_types(
    value: Option<&Value>,
    ctx: &mut ImportContext,
) -> AppResult<Vec<ResourceType>> {
    let mut out = Vec::new();
    for (name, body) in named_entries(value) {
        let mut resource = Resource::new("", "", None);
        let optional_methods = import_resource_fields(&mut resource, &body, ctx)?;
        let annotations = std::mem::take(&mut resource.annotations);
        out.push(ResourceType {
            name,
            usage: get_str(&body, "usage"),
            resource,
            optional_methods,
            annotations,
        });
    }
    Ok(out)
}

/// RAML 1.0 writes named collections as a map, RAML 0.8 as a list of single entry maps.
pub(crate) fn named_collection(entries: Map<String, Value>, ctx: &ExportContext<'_>) -> Value {
    if ctx.is_v10() {
        return Value::Object(entries);
    }
    Value::Array(
        entries
            .into_iter()
            .map(|(k, v)| {
                let mut single = Map::new();
                single.insert(k, v);
                Value::Object(single)
            })
            .collect(),
    )
}

fn with_usage(value: Value, usage: Option<&String>) -> Value {
    let mut map = match value {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if let Some(usage) = usage {
        let mut ordered = Map::new();
        ordered.insert("usage".into(), Value::String(usage.clone()));
        ordered.extend(map);
        map = ordered;
    }
    Value::Object(map)
}

/// Writes `traits`.
pub(crate) fn export_traits(
    traits: &[Trait],
    ctx: &mut ExportContext<'_>,
) -> AppResult<Option<Value>> {
    if traits.is_empty() {
        return Ok(None);
    }
    let mut entries = Map::new();
    for trait_ in traits {
        let exported = export_method(&trait_.method, ctx)?;
        let mut value = with_usage(exported, trait_.usage.as_ref());
        if let Value::Object(map) = &mut value {
            ctx.write_annotations(map, &trait_.annotations);
        }
        entries.insert(trait_.name.clone(), value);
    }
    Ok(Some(named_collection(entries, ctx)))
}

/// Writes `resourceTypes`.
pub(crate) fn export_resource_types(
    types: &[ResourceType],
    ctx: &mut ExportContext<'_>,
) -> AppResult<Option<Value>> {
    if types.is_empty() {
        return Ok(None);
    }
    let mut entries = Map::new();
    for resource_type in types {
        let exported = export_resource_fields(
            &resource_type.resource,
            &resource_type.optional_methods,
            ctx,
        )?;
        let mut value = with_usage(Value::Object(exported), resource_type.usage.as_ref());
        if let Value::Object(map) = &mut value {
            ctx.write_annotations(map, &resource_type.annotations);
        }
        entries.insert(resource_type.name.clone(), value);
    }
    Ok(Some(named_collection(entries, ctx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::Format;
    use crate::model::Root;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_template_refs() {
        let value = json!(["paged", {"sorted": {"field": "name"}}, {"plain": null}]);
        let refs = import_template_refs(Some(&value));
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[2], TemplateRef::named("plain"));
        assert_eq!(
            export_template_refs(&refs),
            json!(["paged", {"sorted": {"field": "name"}}, "plain"])
        );
    }

    #[test]
    fn test_traits_round_trip() {
        let value = json!({"paged": {
            "usage": "Apply to lists",
            "queryParameters": {"page?": "integer"}
        }});
        let mut ctx = ImportContext::new(Format::Raml10);
        let traits = import_traits(Some(&value), &mut ctx).unwrap();
        assert_eq!(traits[0].usage.as_deref(), Some("Apply to lists"));
        assert!(!traits[0].method.parameters[0].required);

        let root = Root::default();
        let mut export_ctx = ExportContext::new(Format::Raml10, &root);
        let exported = export_traits(&traits, &mut export_ctx).unwrap().unwrap();
        assert_eq!(
            exported,
            json!({"paged": {
                "usage": "Apply to lists",
                "queryParameters": {"page": {"type": "integer", "required": false}}
            }})
        );
    }

    #[test]
    fn test_optional_methods_in_resource_type() {
        let value = json!([{"collection": {
            "get?": {},
            "post": {"description": "Create <<resourcePathName>>"}
        }}]);
        let mut ctx = ImportContext::new(Format::Raml08);
        let types = import_resource_types(Some(&value), &mut ctx).unwrap();
        assert_eq!(types[0].optional_methods, vec!["get"]);
        assert_eq!(types[0].resource.methods.len(), 2);

        let root = Root::default();
        let mut export_ctx = ExportContext::new(Format::Raml08, &root);
        let exported = export_resource_types(&types, &mut export_ctx).unwrap().unwrap();
        assert_eq!(exported, value);
    }
}
