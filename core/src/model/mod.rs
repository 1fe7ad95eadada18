//! # Intermediate Model
//!
//! Plain data entities shared by every format converter. Importers build a
//! fresh `Root` per conversion; exporters only read it.
//!
//! - **definition**: types / schemas.
//! - **resource**: resources, methods, parameters, bodies and responses.
//! - **security**: security schemes and requirements.
//! - **template**: traits and resource types.

pub mod definition;
pub mod resource;
pub mod security;
pub mod template;

pub use definition::{AdditionalProperties, Definition, InternalType};
pub use resource::{
    Body, Header, HttpMethod, Method, Parameter, ParameterLocation, Resource, Response,
    TemplateRef,
};
pub use security::{SecurityDefinition, SecurityRequirement, SecurityScope, SecurityType};
pub use template::{ResourceType, Trait};

use indexmap::IndexMap;
use serde_json::Value;

/// The document root. Owns every other entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Root {
    /// API metadata.
    pub info: Info,
    /// Transfer protocols, lowercase (`http`, `https`, ...).
    pub protocols: Vec<String>,
    /// Base URI.
    pub base_uri: Option<BaseUri>,
    /// Default media types.
    pub media_type: Option<MediaType>,
    /// Security schemes.
    pub security_definitions: Vec<SecurityDefinition>,
    /// Security applied to every method.
    pub secured_by: Vec<SecurityRequirement>,
    /// Top level resources; children nest inside them.
    pub resources: Vec<Resource>,
    /// Named types.
    pub types: Vec<Definition>,
    /// Resource types.
    pub resource_types: Vec<ResourceType>,
    /// Traits.
    pub traits: Vec<Trait>,
    /// Shared parameters that are not part of a trait, by component key.
    pub parameters: IndexMap<String, Parameter>,
    /// Shared responses that are not part of a trait, by component key.
    pub responses: IndexMap<String, Response>,
    /// Tag declarations.
    pub tags: Vec<Tag>,
    /// External documentation.
    pub external_docs: Option<ExternalDocs>,
    /// RAML `documentation` pages.
    pub documentation: Vec<Documentation>,
    /// Annotation type declarations.
    pub annotation_types: Vec<AnnotationType>,
    /// Root annotations.
    pub annotations: Vec<Annotation>,
}

impl Root {
    /// Finds a trait by name.
    pub fn find_trait(&self, name: &str) -> Option<&Trait> {
        self.traits.iter().find(|t| t.name == name)
    }

    /// Finds a resource type by name.
    pub fn find_resource_type(&self, name: &str) -> Option<&ResourceType> {
        self.resource_types.iter().find(|t| t.name == name)
    }

    /// Finds a named type.
    pub fn find_type(&self, name: &str) -> Option<&Definition> {
        self.types.iter().find(|t| t.name.as_deref() == Some(name))
    }

    /// Finds a security scheme by name.
    pub fn find_security_definition(&self, name: &str) -> Option<&SecurityDefinition> {
        self.security_definitions
            .iter()
            .find(|s| s.schema_name == name)
    }

    /// Depth-first walk over every resource of the tree.
    pub fn all_resources(&self) -> Vec<&Resource> {
        fn walk<'a>(resources: &'a [Resource], out: &mut Vec<&'a Resource>) {
            for resource in resources {
                out.push(resource);
                walk(&resource.resources, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.resources, &mut out);
        out
    }
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Info {
    /// Title (required by every format).
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Version, always kept as a string.
    pub version: Option<String>,
    /// Terms of service URL.
    pub terms_of_service: Option<String>,
    /// Contact.
    pub contact: Option<Contact>,
    /// License.
    pub license: Option<License>,
    /// Annotations attached to the info block.
    pub annotations: Vec<Annotation>,
}

/// Contact information.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contact {
    /// Name.
    pub name: Option<String>,
    /// URL.
    pub url: Option<String>,
    /// Email.
    pub email: Option<String>,
}

/// License information.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct License {
    /// Name.
    pub name: String,
    /// URL.
    pub url: Option<String>,
}

/// Base URI. `uri` is the source of truth.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseUri {
    /// Full templated URI, e.g. `https://{host}/api/{version}`.
    pub uri: String,
    /// Host part.
    pub host: Option<String>,
    /// Path part.
    pub base_path: Option<String>,
    /// Scheme part.
    pub protocol: Option<String>,
    /// `baseUriParameters`.
    pub parameters: Vec<Parameter>,
    /// Annotations.
    pub annotations: Vec<Annotation>,
}

/// Default media types.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaType {
    /// Request media types.
    pub consumes: Vec<String>,
    /// Response media types.
    pub produces: Vec<String>,
}

impl MediaType {
    /// Media types in order of first appearance across both lists.
    pub fn merged(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for mime in self.consumes.iter().chain(self.produces.iter()) {
            if !out.contains(mime) {
                out.push(mime.clone());
            }
        }
        out
    }
}

/// Tag declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tag {
    /// Name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// External documentation.
    pub external_docs: Option<ExternalDocs>,
}

/// External documentation link.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExternalDocs {
    /// URL.
    pub url: String,
    /// Description.
    pub description: Option<String>,
}

/// A RAML documentation page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Documentation {
    /// Page title.
    pub title: String,
    /// Page content.
    pub content: String,
}

/// A generic extension value (`x-*` / `(name)`).
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Model name; `oas-` prefixed when it came from a Swagger extension.
    pub name: String,
    /// Arbitrary value.
    pub definition: Value,
    /// Nested annotations carried by the value.
    pub annotations: Vec<Annotation>,
}

impl Annotation {
    /// Creates an annotation without nested annotations.
    pub fn new(name: impl Into<String>, definition: Value) -> Self {
        Annotation {
            name: name.into(),
            definition,
            annotations: Vec::new(),
        }
    }
}

/// Declaration of an annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationType {
    /// Name, without parentheses.
    pub name: String,
    /// The declaration body as written (a RAML type declaration).
    pub definition: Value,
    /// `allowedTargets`.
    pub allowed_targets: Vec<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Description.
    pub description: Option<String>,
}

/// Finds an annotation by name.
pub fn find_annotation<'a>(annotations: &'a [Annotation], name: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.name == name)
}

/// Removes and returns an annotation by name.
pub fn take_annotation(annotations: &mut Vec<Annotation>, name: &str) -> Option<Annotation> {
    let idx = annotations.iter().position(|a| a.name == name)?;
    Some(annotations.remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_type_merged_dedupes() {
        let media = MediaType {
            consumes: vec!["application/json".into(), "application/xml".into()],
            produces: vec!["application/json".into()],
        };
        assert_eq!(media.merged(), vec!["application/json", "application/xml"]);
    }

    #[test]
    fn test_take_annotation() {
        let mut list = vec![
            Annotation::new("a", json!(1)),
            Annotation::new("b", json!(2)),
        ];
        let taken = take_annotation(&mut list, "b").unwrap();
        assert_eq!(taken.definition, json!(2));
        assert_eq!(list.len(), 1);
        assert!(take_annotation(&mut list, "b").is_none());
    }

    #[test]
    fn test_all_resources_depth_first() {
        let mut parent = Resource::new("/a", "/a", None);
        parent
            .resources
            .push(Resource::new("/a/b", "/b", Some("/a".into())));
        let root = Root {
            resources: vec![parent, Resource::new("/c", "/c", None)],
            ..Default::default()
        };
        let paths: Vec<&str> = root.all_resources().iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/a", "/a/b", "/c"]);
    }
}
