//! # Paths Converter
//!
//! Swagger paths are flat; the model nests each path under the longest
//! other path that prefixes it. URI parameters move to the resource whose
//! relative path declares them.

use super::method::{export_operation, import_operation, ExportScope, ImportScope};
use super::parameter::export_parameter;
use crate::converters::annotations::{export_extensions, import_extensions};
use crate::converters::json::{get_str, insert_opt};
use crate::error::AppResult;
use crate::model::{
    Definition, HttpMethod, InternalType, Parameter, ParameterLocation, Resource,
};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

const X_DISPLAY_NAME: &str = "x-displayName";
const X_DESCRIPTION: &str = "x-description";

fn template_regex() -> &'static Regex {
    static TEMPLATE_RE: OnceLock<Regex> = OnceLock::new();
    TEMPLATE_RE.get_or_init(|| Regex::new(r"\{([^}]+)}").expect("Invalid regex"))
}

/// Names of the `{var}` placeholders of a path, in order.
pub(crate) fn template_variables(path: &str) -> Vec<String> {
    template_regex()
        .captures_iter(path)
        .map(|c| c[1].to_string())
        .collect()
}

/// The nearest other path that prefixes `path` at a segment boundary.
fn parent_of<'a>(path: &str, all: &'a [String]) -> Option<&'a String> {
    all.iter()
        .filter(|candidate| {
            candidate.as_str() != path
                && candidate.as_str() != "/"
                && path.starts_with(candidate.as_str())
                && path[candidate.len()..].starts_with('/')
        })
        .max_by_key(|candidate| candidate.len())
}

/// Reads `paths` into a resource tree.
pub(crate) fn import_paths(
    paths: Option<&Value>,
    scope: &ImportScope<'_>,
) -> AppResult<Vec<Resource>> {
    let Some(Value::Object(paths)) = paths else {
        return Ok(Vec::new());
    };
    let keys: Vec<String> = paths
        .keys()
        .filter(|k| !k.starts_with("x-"))
        .cloned()
        .collect();

    let mut flat: Vec<Resource> = Vec::new();
    for path in &keys {
        let item = &paths[path.as_str()];
        let parent = parent_of(path, &keys).cloned();
        let relative = match &parent {
            Some(p) => path[p.len()..].to_string(),
            None => path.clone(),
        };
        let mut resource = Resource::new(path.clone(), relative, parent);
        resource.display_name = get_str(item, X_DISPLAY_NAME);
        resource.description = get_str(item, X_DESCRIPTION);
        resource.annotations = import_extensions(item, &[X_DISPLAY_NAME, X_DESCRIPTION]);

        let path_level: Vec<Value> = item
            .get("parameters")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for verb in HttpMethod::ALL {
            let Some(operation) = item.get(verb.as_str()) else { continue };
            let (method, path_params) =
                import_operation(verb, path, operation, &path_level, scope)?;
            for p in path_params {
                if !resource.parameters.iter().any(|e| e.name == p.name) {
                    resource.parameters.push(p);
                }
            }
            resource.methods.push(method);
        }
        flat.push(resource);
    }

    hoist_uri_parameters(&mut flat);
    Ok(nest(flat, None))
}

/// Moves each URI parameter to the resource whose relative path declares it.
fn hoist_uri_parameters(flat: &mut [Resource]) {
    for idx in 0..flat.len() {
        let moving: Vec<Parameter> = flat[idx]
            .parameters
            .iter()
            .filter(|p| !flat[idx].relative_path.contains(&format!("{{{}}}", p.name)))
            .cloned()
            .collect();
        for param in moving {
            let placeholder = format!("{{{}}}", param.name);
            let mut parent = flat[idx].parent_path.clone();
            while let Some(parent_path) = parent {
                let Some(owner) = flat.iter_mut().find(|r| r.path == parent_path) else { break };
                if owner.relative_path.contains(&placeholder) {
                    if !owner.parameters.iter().any(|p| p.name == param.name) {
                        owner.parameters.push(param.clone());
                    }
                    flat[idx].parameters.retain(|p| p.name != param.name);
                    break;
                }
                parent = owner.parent_path.clone();
            }
        }
    }
}

fn nest(flat: Vec<Resource>, parent: Option<&str>) -> Vec<Resource> {
    let (mut mine, mut rest): (Vec<Resource>, Vec<Resource>) = flat
        .into_iter()
        .partition(|r| r.parent_path.as_deref() == parent);
    for resource in &mut mine {
        let prefix = format!("{}/", resource.path);
        let (children, others): (Vec<Resource>, Vec<Resource>) =
            rest.into_iter().partition(|r| r.path.starts_with(&prefix));
        resource.resources = nest(children, Some(resource.path.as_str()));
        rest = others;
    }
    mine
}

/// Writes the resource tree as `paths`.
pub(crate) fn export_paths(resources: &[Resource], scope: &ExportScope<'_>) -> Map<String, Value> {
    let mut paths = Map::new();
    for resource in resources {
        export_resource(resource, &[], scope, &mut paths);
    }
    paths
}

fn export_resource(
    resource: &Resource,
    inherited: &[Parameter],
    scope: &ExportScope<'_>,
    paths: &mut Map<String, Value>,
) {
    let mut uri_params: Vec<Parameter> = inherited.to_vec();
    for param in &resource.parameters {
        uri_params.retain(|p| p.name != param.name);
        uri_params.push(Parameter {
            location: ParameterLocation::Path,
            required: true,
            ..param.clone()
        });
    }

    let has_content = !resource.methods.is_empty()
        || resource.display_name.is_some()
        || resource.description.is_some()
        || !resource.annotations.is_empty();
    if has_content {
        let mut item = Map::new();
        insert_opt(&mut item, X_DISPLAY_NAME, resource.display_name.clone());
        insert_opt(&mut item, X_DESCRIPTION, resource.description.clone());

        let declared: Vec<Value> = template_variables(&resource.path)
            .into_iter()
            .map(|var| match uri_params.iter().find(|p| p.name == var) {
                Some(param) => export_parameter(param, scope.root),
                None => {
                    log::debug!("declaring implicit path parameter '{}' on {}", var, resource.path);
                    let string = Definition::of_type(InternalType::String);
                    let implicit = Parameter::new(var, ParameterLocation::Path, string, true);
                    export_parameter(&implicit, scope.root)
                }
            })
            .collect();
        if !declared.is_empty() {
            item.insert("parameters".into(), Value::Array(declared));
        }

        for verb in HttpMethod::ALL {
            if let Some(method) = resource.find_method(verb) {
                item.insert(verb.as_str().into(), export_operation(method, scope));
            }
        }
        export_extensions(&mut item, &resource.annotations);
        paths.insert(resource.path.clone(), Value::Object(item));
    }

    for child in &resource.resources {
        export_resource(child, &uri_params, scope, paths);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Root;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn import(doc: &Value) -> Vec<Resource> {
        let root = Root::default();
        let scope = ImportScope { document: doc, root: &root };
        import_paths(doc.get("paths"), &scope).unwrap()
    }

    #[test]
    fn test_paths_nest_by_prefix() {
        let doc = json!({"paths": {
            "/pets/{id}": {"get": {"parameters": [
                {"name": "id", "in": "path", "required": true, "type": "string"}
            ]}},
            "/pets": {"get": {}},
            "/users": {"get": {}}
        }});
        let resources = import(&doc);
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].path, "/pets");
        assert_eq!(resources[0].resources[0].relative_path, "/{id}");
        assert_eq!(resources[0].resources[0].parameters[0].name, "id");
        assert_eq!(resources[1].path, "/users");
    }

    #[test]
    fn test_uri_parameter_moves_to_declaring_resource() {
        let doc = json!({"paths": {
            "/a/{id}": {"get": {}},
            "/a/{id}/b": {"get": {"parameters": [
                {"name": "id", "in": "path", "required": true, "type": "integer"}
            ]}}
        }});
        let resources = import(&doc);
        assert_eq!(resources[0].parameters[0].name, "id");
        assert!(resources[0].resources[0].parameters.is_empty());
    }

    #[test]
    fn test_export_completes_path_parameters() {
        let mut resource = Resource::new("/a/{id}", "/a/{id}", None);
        resource.methods.push(crate::model::Method::new(HttpMethod::Get, "/a/{id}"));
        let root = Root::default();
        let security = Map::new();
        let paths = export_paths(&[resource], &ExportScope { root: &root, security: &security });
        assert_eq!(
            Value::Object(paths),
            json!({"/a/{id}": {
                "parameters": [{"name": "id", "in": "path", "required": true, "type": "string"}],
                "get": {}
            }})
        );
    }

    #[test]
    fn test_template_variables() {
        assert_eq!(template_variables("/a/{x}/b/{y}"), vec!["x", "y"]);
    }
}
