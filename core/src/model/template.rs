//! # Templates
//!
//! Traits and resource types carry a partial method / resource that gets
//! merged onto whatever references them.

use crate::model::resource::{Method, Resource};
use crate::model::Annotation;

/// A reusable method fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Trait {
    /// Name.
    pub name: String,
    /// RAML `usage`.
    pub usage: Option<String>,
    /// The template. Its `path` is empty.
    pub method: Method,
    /// Annotations.
    pub annotations: Vec<Annotation>,
}

/// A reusable resource fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceType {
    /// Name.
    pub name: String,
    /// RAML `usage`.
    pub usage: Option<String>,
    /// The template. Its `path` is empty.
    pub resource: Resource,
    /// Method names declared optional (`get?`).
    pub optional_methods: Vec<String>,
    /// Annotations.
    pub annotations: Vec<Annotation>,
}
