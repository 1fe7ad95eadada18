//! # Security Model
//!
//! Security schemes are kept in a shape close to Swagger 2.0; grant names use
//! the Swagger vocabulary (`accessCode`, `implicit`, `password`, `application`).

use crate::model::resource::{Method, ParameterLocation};
use crate::model::Annotation;
use serde_json::Value;

/// The kind of security scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityType {
    /// HTTP basic authentication.
    Basic,
    /// HTTP digest authentication.
    Digest,
    /// An API key carried in a header or query parameter.
    ApiKey,
    /// OAuth 2.0.
    OAuth2,
    /// OAuth 1.0.
    OAuth1,
    /// RAML `Pass Through`.
    PassThrough,
    /// `x-<name>` custom schemes.
    Other(String),
}

/// One OAuth scope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SecurityScope {
    /// Scope name.
    pub value: String,
    /// Description.
    pub description: Option<String>,
}

/// A security scheme declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityDefinition {
    /// Name the scheme is declared under.
    pub schema_name: String,
    /// Kind.
    pub type_: SecurityType,
    /// Description.
    pub description: Option<String>,
    /// OAuth 2.0 grants (Swagger vocabulary).
    pub authorization: Vec<String>,
    /// OAuth authorization URL.
    pub authorization_url: Option<String>,
    /// OAuth token URL.
    pub token_url: Option<String>,
    /// OAuth 1.0 request token URL.
    pub request_token_url: Option<String>,
    /// OAuth 1.0 signature methods.
    pub signatures: Vec<String>,
    /// OAuth scopes.
    pub scopes: Vec<SecurityScope>,
    /// Headers / query parameters / responses the scheme adds to a method.
    pub described_by: Option<Method>,
    /// Key name for API key schemes.
    pub name: Option<String>,
    /// Key location for API key schemes.
    pub location: Option<ParameterLocation>,
    /// Settings of custom schemes, verbatim.
    pub settings: Option<Value>,
    /// Annotations.
    pub annotations: Vec<Annotation>,
}

impl SecurityDefinition {
    /// Creates a scheme with no settings.
    pub fn new(schema_name: impl Into<String>, type_: SecurityType) -> Self {
        SecurityDefinition {
            schema_name: schema_name.into(),
            type_,
            description: None,
            authorization: Vec::new(),
            authorization_url: None,
            token_url: None,
            request_token_url: None,
            signatures: Vec::new(),
            scopes: Vec::new(),
            described_by: None,
            name: None,
            location: None,
            settings: None,
            annotations: Vec::new(),
        }
    }
}

/// One entry of `securedBy` / `security`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SecurityRequirement {
    /// Scheme name; `None` means anonymous access is allowed.
    pub scheme: Option<String>,
    /// Required scopes.
    pub scopes: Vec<String>,
}

impl SecurityRequirement {
    /// A requirement without scopes.
    pub fn named(scheme: impl Into<String>) -> Self {
        SecurityRequirement {
            scheme: Some(scheme.into()),
            scopes: Vec::new(),
        }
    }
}
