//! # Resource Model
//!
//! Resources form a tree keyed by path; each owns its methods.

use crate::model::security::SecurityRequirement;
use crate::model::{Annotation, Definition, ExternalDocs};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// HTTP verbs supported by every format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET.
    Get,
    /// PUT.
    Put,
    /// POST.
    Post,
    /// DELETE.
    Delete,
    /// OPTIONS.
    Options,
    /// HEAD.
    Head,
    /// PATCH.
    Patch,
}

impl HttpMethod {
    /// Every verb in the order exporters write them.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
    ];

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown HTTP method '{}'", s))
    }
}

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    /// Query string.
    Query,
    /// Header.
    Header,
    /// URI template variable.
    Path,
    /// Form field.
    FormData,
}

impl ParameterLocation {
    /// Swagger `in` value.
    pub fn as_str(self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Path => "path",
            ParameterLocation::FormData => "formData",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParameterLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(ParameterLocation::Query),
            "header" => Ok(ParameterLocation::Header),
            "path" => Ok(ParameterLocation::Path),
            "formData" => Ok(ParameterLocation::FormData),
            other => Err(format!("unknown parameter location '{}'", other)),
        }
    }
}

/// A named parameter or header.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Name.
    pub name: String,
    /// Location.
    pub location: ParameterLocation,
    /// Display name.
    pub display_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Inline type. `None` when `reference` is set.
    pub definition: Option<Definition>,
    /// Whether the parameter must be sent.
    pub required: bool,
    /// Pointer to a shared or trait-provided parameter.
    pub reference: Option<String>,
    /// Swagger `collectionFormat`.
    pub collection_format: Option<String>,
    /// Swagger `allowEmptyValue`.
    pub allow_empty_value: Option<bool>,
    /// RAML 0.8 `repeat`.
    pub repeat: Option<bool>,
    /// Annotations.
    pub annotations: Vec<Annotation>,
}

/// Headers share the parameter shape.
pub type Header = Parameter;

impl Parameter {
    /// Creates a parameter with an inline definition.
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        definition: Definition,
        required: bool,
    ) -> Self {
        Parameter {
            name: name.into(),
            location,
            display_name: None,
            description: None,
            definition: Some(definition),
            required,
            reference: None,
            collection_format: None,
            allow_empty_value: None,
            repeat: None,
            annotations: Vec::new(),
        }
    }

    /// Creates a stub that points at a shared parameter.
    pub fn reference_to(
        name: impl Into<String>,
        location: ParameterLocation,
        reference: impl Into<String>,
        required: bool,
    ) -> Self {
        Parameter {
            definition: None,
            reference: Some(reference.into()),
            ..Parameter::new(name, location, Definition::default(), required)
        }
    }
}

/// A request or response payload for one media type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    /// Media type; `None` means "the document default".
    pub mime_type: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Payload type.
    pub definition: Option<Definition>,
    /// Whether the body must be sent.
    pub required: bool,
    /// Swagger body parameter name.
    pub name: Option<String>,
    /// Annotations.
    pub annotations: Vec<Annotation>,
}

/// A response for one status code.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Response {
    /// Status code, or `default`.
    pub http_status_code: String,
    /// Description.
    pub description: Option<String>,
    /// Response headers.
    pub headers: Vec<Header>,
    /// Response bodies.
    pub bodies: Vec<Body>,
    /// Pointer to a shared or trait-provided response.
    pub reference: Option<String>,
    /// Annotations.
    pub annotations: Vec<Annotation>,
}

/// A reference to a trait or resource type, with template parameter values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateRef {
    /// Name of the trait / resource type.
    pub name: String,
    /// Values for `<<placeholder>>` substitution.
    pub parameters: Vec<(String, Value)>,
}

impl TemplateRef {
    /// A reference without parameters.
    pub fn named(name: impl Into<String>) -> Self {
        TemplateRef {
            name: name.into(),
            parameters: Vec::new(),
        }
    }
}

/// An operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Copy of the owning resource's path.
    pub path: String,
    /// Operation identifier (Swagger `operationId`, RAML `displayName`).
    pub name: Option<String>,
    /// Swagger `summary`.
    pub summary: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Request headers.
    pub headers: Vec<Header>,
    /// Request bodies.
    pub bodies: Vec<Body>,
    /// Form fields (Swagger `formData`).
    pub form_bodies: Vec<Parameter>,
    /// Query parameters.
    pub parameters: Vec<Parameter>,
    /// RAML `queryString`.
    pub query_strings: Vec<Parameter>,
    /// Responses.
    pub responses: Vec<Response>,
    /// Applied traits.
    pub is: Vec<TemplateRef>,
    /// Security requirements.
    pub secured_by: Vec<SecurityRequirement>,
    /// Produced media types.
    pub produces: Vec<String>,
    /// Consumed media types.
    pub consumes: Vec<String>,
    /// Protocols, lowercase.
    pub protocols: Vec<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Deprecated flag.
    pub deprecated: bool,
    /// External documentation.
    pub external_docs: Option<ExternalDocs>,
    /// Annotations.
    pub annotations: Vec<Annotation>,
}

impl Method {
    /// Creates an empty method.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Method {
            method,
            path: path.into(),
            name: None,
            summary: None,
            description: None,
            headers: Vec::new(),
            bodies: Vec::new(),
            form_bodies: Vec::new(),
            parameters: Vec::new(),
            query_strings: Vec::new(),
            responses: Vec::new(),
            is: Vec::new(),
            secured_by: Vec::new(),
            produces: Vec::new(),
            consumes: Vec::new(),
            protocols: Vec::new(),
            tags: Vec::new(),
            deprecated: false,
            external_docs: None,
            annotations: Vec::new(),
        }
    }

    /// Finds a response by status code.
    pub fn find_response(&self, code: &str) -> Option<&Response> {
        self.responses.iter().find(|r| r.http_status_code == code)
    }

    /// Returns true when the method applies the named trait.
    pub fn applies_trait(&self, name: &str) -> bool {
        self.is.iter().any(|t| t.name == name)
    }
}

/// A node of the path tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Absolute path.
    pub path: String,
    /// Path relative to the parent resource.
    pub relative_path: String,
    /// Absolute path of the parent, `None` at top level.
    pub parent_path: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Methods.
    pub methods: Vec<Method>,
    /// Nested resources.
    pub resources: Vec<Resource>,
    /// URI parameters.
    pub parameters: Vec<Parameter>,
    /// Applied resource type.
    pub resource_type: Option<TemplateRef>,
    /// Traits applied to every method.
    pub is: Vec<TemplateRef>,
    /// Security requirements for every method.
    pub secured_by: Vec<SecurityRequirement>,
    /// Annotations.
    pub annotations: Vec<Annotation>,
}

impl Resource {
    /// Creates an empty resource.
    pub fn new(
        path: impl Into<String>,
        relative_path: impl Into<String>,
        parent_path: Option<String>,
    ) -> Self {
        Resource {
            path: path.into(),
            relative_path: relative_path.into(),
            parent_path,
            display_name: None,
            description: None,
            methods: Vec::new(),
            resources: Vec::new(),
            parameters: Vec::new(),
            resource_type: None,
            is: Vec::new(),
            secured_by: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Finds a method by verb.
    pub fn find_method(&self, verb: HttpMethod) -> Option<&Method> {
        self.methods.iter().find(|m| m.method == verb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_round_trip() {
        for verb in HttpMethod::ALL {
            assert_eq!(verb.as_str().parse::<HttpMethod>().unwrap(), verb);
        }
        assert!("trace".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_parameter_location_parse() {
        assert_eq!(
            "formData".parse::<ParameterLocation>().unwrap(),
            ParameterLocation::FormData
        );
        assert!("cookie".parse::<ParameterLocation>().is_err());
    }

    #[test]
    fn test_reference_stub_has_no_definition() {
        let p =
            Parameter::reference_to("page", ParameterLocation::Query, "trait:paged:page", false);
        assert!(p.definition.is_none());
        assert_eq!(p.reference.as_deref(), Some("trait:paged:page"));
    }
}
