//! # Inheritance Fixup
//!
//! Materializes resource type and trait content onto the resources and
//! methods that reference them, for targets that cannot express either.
//!
//! Precedence is own declaration > trait > resource type. Traits without
//! placeholders contribute reference stubs (`trait:<trait>:<field>`)
//! pointing at the shared components the exporter writes for them; templated
//! traits and resource types are inlined after `<<param>>` substitution.

use crate::converters::naming::{trait_field_key, TraitKeyStyle};
use crate::converters::placeholders::{has_placeholders, Substitute, TemplateParams};
use crate::error::{AppError, AppResult, ReferenceKind};
use crate::model::{Method, Parameter, Resource, Response, Root, TemplateRef};

/// Resource type chains longer than this are treated as cycles.
const MAX_TYPE_DEPTH: usize = 16;

/// Returns a copy of `root` with every inherited field materialized.
pub fn resolve_inheritance(root: &Root, style: TraitKeyStyle) -> AppResult<Root> {
    let mut resolved = root.clone();
    for resource in &mut resolved.resources {
        resolve_resource(root, resource, style)?;
    }
    log::debug!(
        "inheritance fixup done for {} resource types, {} traits",
        root.resource_types.len(),
        root.traits.len()
    );
    Ok(resolved)
}

fn resolve_resource(root: &Root, resource: &mut Resource, style: TraitKeyStyle) -> AppResult<()> {
    let type_template = match &resource.resource_type {
        Some(reference) => Some(expand_resource_type(root, reference, &resource.path, 0)?),
        None => None,
    };

    if let Some(template) = &type_template {
        merge_resource_fields(resource, template);
        for template_method in &template.methods {
            let present = resource.methods.iter().any(|m| m.method == template_method.method);
            if !present && !is_optional(root, resource, template_method) {
                let mut added = Method::new(template_method.method, resource.path.clone());
                added.is = template_method.is.clone();
                resource.methods.push(added);
            }
        }
    }

    let resource_traits = resource.is.clone();
    let path = resource.path.clone();
    for method in &mut resource.methods {
        let type_method = type_template
            .as_ref()
            .and_then(|t| t.methods.iter().find(|m| m.method == method.method));

        let mut applied: Vec<TemplateRef> = Vec::new();
        let candidates = method
            .is
            .iter()
            .chain(resource_traits.iter())
            .chain(type_method.into_iter().flat_map(|m| m.is.iter()));
        for reference in candidates {
            if !applied.iter().any(|t| t.name == reference.name) {
                applied.push(reference.clone());
            }
        }

        for reference in &applied {
            apply_trait(root, method, reference, &path, style)?;
        }
        if let Some(template) = type_method {
            merge_method(method, template, None);
        }
        method.is = applied;
    }

    for child in &mut resource.resources {
        resolve_resource(root, child, style)?;
    }
    Ok(())
}

/// Resolves a resource type reference into a substituted template, following
/// nested `type:` references.
fn expand_resource_type(
    root: &Root,
    reference: &TemplateRef,
    resource_path: &str,
    depth: usize,
) -> AppResult<Resource> {
    if depth > MAX_TYPE_DEPTH {
        return Err(AppError::General(format!(
            "resource type '{}' inherits from itself",
            reference.name
        )));
    }
    let resource_type = root
        .find_resource_type(&reference.name)
        .ok_or_else(|| AppError::unresolved(ReferenceKind::ResourceType, &reference.name))?;
    let params = TemplateParams::new(resource_path, None, &reference.parameters);
    let mut template = resource_type.resource.clone();
    template.substitute(&params);

    if let Some(parent) = template.resource_type.take() {
        let parent_template = expand_resource_type(root, &parent, resource_path, depth + 1)?;
        merge_resource_fields(&mut template, &parent_template);
        for parent_method in parent_template.methods {
            match template.methods.iter_mut().find(|m| m.method == parent_method.method) {
                Some(own) => merge_method(own, &parent_method, None),
                None => template.methods.push(parent_method),
            }
        }
    }
    Ok(template)
}

fn is_optional(root: &Root, resource: &Resource, method: &Method) -> bool {
    resource
        .resource_type
        .as_ref()
        .and_then(|r| root.find_resource_type(&r.name))
        .map_or(false, |t| {
            t.optional_methods
                .iter()
                .any(|m| m == method.method.as_str())
        })
}

fn apply_trait(
    root: &Root,
    method: &mut Method,
    reference: &TemplateRef,
    resource_path: &str,
    style: TraitKeyStyle,
) -> AppResult<()> {
    let trait_ = root
        .find_trait(&reference.name)
        .ok_or_else(|| AppError::unresolved(ReferenceKind::Trait, &reference.name))?;
    let params = TemplateParams::new(
        resource_path,
        Some(method.method.as_str()),
        &reference.parameters,
    );
    let mut template = trait_.method.clone();
    template.substitute(&params);

    // Only placeholder-free traits are written as shared components.
    let shared = reference.parameters.is_empty() && !has_placeholders(&trait_.method);
    let stub_for = if shared {
        Some((trait_.name.as_str(), style))
    } else {
        log::debug!("inlining parameterized trait '{}' at {}", trait_.name, resource_path);
        None
    };
    merge_method(method, &template, stub_for);
    Ok(())
}

fn merge_resource_fields(resource: &mut Resource, template: &Resource) {
    if resource.description.is_none() {
        resource.description = template.description.clone();
    }
    if resource.display_name.is_none() {
        resource.display_name = template.display_name.clone();
    }
    for param in &template.parameters {
        if !resource.parameters.iter().any(|p| p.name == param.name) {
            resource.parameters.push(param.clone());
        }
    }
    for reference in &template.is {
        if !resource.is.iter().any(|t| t.name == reference.name) {
            resource.is.push(reference.clone());
        }
    }
    if resource.secured_by.is_empty() {
        resource.secured_by = template.secured_by.clone();
    }
    for annotation in &template.annotations {
        if !resource.annotations.iter().any(|a| a.name == annotation.name) {
            resource.annotations.push(annotation.clone());
        }
    }
}

/// Adds every field of `source` that `target` does not declare itself.
///
/// With `stub_for` set, parameters, headers and responses become reference
/// stubs to the trait's shared components instead of copies.
fn merge_method(target: &mut Method, source: &Method, stub_for: Option<(&str, TraitKeyStyle)>) {
    if target.description.is_none() {
        target.description = source.description.clone();
    }
    if target.summary.is_none() {
        target.summary = source.summary.clone();
    }

    let stub = |param: &Parameter| match stub_for {
        Some((trait_name, style)) => Parameter::reference_to(
            param.name.clone(),
            param.location,
            trait_field_key(style, trait_name, &param.name),
            param.required,
        ),
        None => param.clone(),
    };
    merge_parameters(&mut target.headers, &source.headers, &stub);
    merge_parameters(&mut target.parameters, &source.parameters, &stub);
    merge_parameters(&mut target.form_bodies, &source.form_bodies, &|p: &Parameter| p.clone());
    merge_parameters(&mut target.query_strings, &source.query_strings, &|p: &Parameter| p.clone());

    for body in &source.bodies {
        if !target.bodies.iter().any(|b| b.mime_type == body.mime_type) {
            target.bodies.push(body.clone());
        }
    }

    for response in &source.responses {
        match target
            .responses
            .iter_mut()
            .find(|r| r.http_status_code == response.http_status_code)
        {
            Some(own) if own.reference.is_none() => merge_response(own, response),
            Some(_) => {}
            None => target.responses.push(match stub_for {
                Some((trait_name, style)) => Response {
                    http_status_code: response.http_status_code.clone(),
                    reference: Some(trait_field_key(style, trait_name, &response.http_status_code)),
                    ..Default::default()
                },
                None => response.clone(),
            }),
        }
    }

    if target.protocols.is_empty() {
        target.protocols = source.protocols.clone();
    }
    if target.secured_by.is_empty() {
        target.secured_by = source.secured_by.clone();
    }
    if target.produces.is_empty() {
        target.produces = source.produces.clone();
    }
    if target.consumes.is_empty() {
        target.consumes = source.consumes.clone();
    }
    for annotation in &source.annotations {
        if !target.annotations.iter().any(|a| a.name == annotation.name) {
            target.annotations.push(annotation.clone());
        }
    }
}

fn merge_parameters(
    target: &mut Vec<Parameter>,
    source: &[Parameter],
    make: &dyn Fn(&Parameter) -> Parameter,
) {
    for param in source {
        if !target.iter().any(|p| p.name == param.name) {
            target.push(make(param));
        }
    }
}

fn merge_response(target: &mut Response, source: &Response) {
    if target.description.is_none() {
        target.description = source.description.clone();
    }
    for header in &source.headers {
        if !target.headers.iter().any(|h| h.name == header.name) {
            target.headers.push(header.clone());
        }
    }
    for body in &source.bodies {
        if !target.bodies.iter().any(|b| b.mime_type == body.mime_type) {
            target.bodies.push(body.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Definition, HttpMethod, InternalType, ParameterLocation, ResourceType, Trait,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn query(name: &str, t: InternalType) -> Parameter {
        Parameter::new(name, ParameterLocation::Query, Definition::of_type(t), false)
    }

    fn paged_trait() -> Trait {
        let mut method = Method::new(HttpMethod::Get, "");
        method.parameters.push(query("page", InternalType::Integer));
        method.responses.push(Response {
            http_status_code: "400".into(),
            description: Some("bad page".into()),
            ..Default::default()
        });
        Trait {
            name: "paged".into(),
            usage: None,
            method,
            annotations: vec![],
        }
    }

    fn pets_root() -> Root {
        let mut resource = Resource::new("/pets", "/pets", None);
        let mut get = Method::new(HttpMethod::Get, "/pets");
        get.is.push(TemplateRef::named("paged"));
        resource.methods.push(get);
        Root {
            resources: vec![resource],
            traits: vec![paged_trait()],
            ..Default::default()
        }
    }

    #[test]
    fn test_trait_fields_become_reference_stubs() {
        let resolved = resolve_inheritance(&pets_root(), TraitKeyStyle::Colon).unwrap();
        let get = &resolved.resources[0].methods[0];
        assert_eq!(get.parameters.len(), 1);
        assert_eq!(get.parameters[0].name, "page");
        assert_eq!(get.parameters[0].reference.as_deref(), Some("trait:paged:page"));
        assert!(get.parameters[0].definition.is_none());
        assert_eq!(get.responses[0].reference.as_deref(), Some("trait:paged:400"));
    }

    #[test]
    fn test_underscore_style() {
        let resolved = resolve_inheritance(&pets_root(), TraitKeyStyle::Underscore).unwrap();
        let get = &resolved.resources[0].methods[0];
        assert_eq!(get.parameters[0].reference.as_deref(), Some("trait_paged_page"));
    }

    #[test]
    fn test_own_declaration_wins() {
        let mut root = pets_root();
        root.resources[0].methods[0]
            .parameters
            .push(query("page", InternalType::String));
        let resolved = resolve_inheritance(&root, TraitKeyStyle::Colon).unwrap();
        let params = &resolved.resources[0].methods[0].parameters;
        assert_eq!(params.len(), 1);
        assert!(params[0].reference.is_none());
    }

    #[test]
    fn test_trait_wins_over_resource_type() {
        let mut root = pets_root();
        let mut template = Resource::new("", "", None);
        let mut get = Method::new(HttpMethod::Get, "");
        get.parameters.push(query("page", InternalType::String));
        get.parameters.push(query("sort", InternalType::String));
        template.methods.push(get);
        root.resource_types.push(ResourceType {
            name: "collection".into(),
            usage: None,
            resource: template,
            optional_methods: vec![],
            annotations: vec![],
        });
        root.resources[0].resource_type = Some(TemplateRef::named("collection"));

        let resolved = resolve_inheritance(&root, TraitKeyStyle::Colon).unwrap();
        let params = &resolved.resources[0].methods[0].parameters;
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].reference.as_deref(), Some("trait:paged:page"));
        assert_eq!(params[1].name, "sort");
        assert!(params[1].definition.is_some());
    }

    #[test]
    fn test_resource_type_adds_methods_except_optional() {
        let mut template = Resource::new("", "", None);
        template.methods.push(Method::new(HttpMethod::Post, ""));
        template.methods.push(Method::new(HttpMethod::Delete, ""));
        let root = Root {
            resources: vec![Resource {
                resource_type: Some(TemplateRef::named("coll")),
                ..Resource::new("/a", "/a", None)
            }],
            resource_types: vec![ResourceType {
                name: "coll".into(),
                usage: None,
                resource: template,
                optional_methods: vec!["delete".into()],
                annotations: vec![],
            }],
            ..Default::default()
        };
        let resolved = resolve_inheritance(&root, TraitKeyStyle::Colon).unwrap();
        let verbs: Vec<HttpMethod> = resolved.resources[0]
            .methods
            .iter()
            .map(|m| m.method)
            .collect();
        assert_eq!(verbs, vec![HttpMethod::Post]);
    }

    #[test]
    fn test_parameterized_trait_is_inlined() {
        let mut method = Method::new(HttpMethod::Get, "");
        method.parameters.push(Parameter {
            description: Some("at most <<max>>".into()),
            ..query("limit", InternalType::Integer)
        });
        let mut root = pets_root();
        root.traits = vec![Trait {
            name: "limited".into(),
            usage: None,
            method,
            annotations: vec![],
        }];
        root.resources[0].methods[0].is = vec![TemplateRef {
            name: "limited".into(),
            parameters: vec![("max".into(), json!(50))],
        }];
        let resolved = resolve_inheritance(&root, TraitKeyStyle::Colon).unwrap();
        let param = &resolved.resources[0].methods[0].parameters[0];
        assert!(param.reference.is_none());
        assert_eq!(param.description.as_deref(), Some("at most 50"));
    }

    #[test]
    fn test_unparameterized_use_of_template_trait_is_inlined() {
        let mut method = Method::new(HttpMethod::Get, "");
        method.parameters.push(Parameter {
            description: Some("at most <<max>>".into()),
            ..query("limit", InternalType::Integer)
        });
        let mut root = pets_root();
        root.traits = vec![Trait {
            name: "limited".into(),
            usage: None,
            method,
            annotations: vec![],
        }];
        root.resources[0].methods[0].is = vec![TemplateRef::named("limited")];
        let resolved = resolve_inheritance(&root, TraitKeyStyle::Colon).unwrap();
        let param = &resolved.resources[0].methods[0].parameters[0];
        assert!(param.reference.is_none());
        assert!(param.definition.is_some());
    }

    #[test]
    fn test_missing_trait_is_an_error() {
        let mut root = pets_root();
        root.traits.clear();
        let err = resolve_inheritance(&root, TraitKeyStyle::Colon).unwrap_err();
        assert_eq!(err.to_string(), "Unresolved trait reference 'paged'");
    }
}
