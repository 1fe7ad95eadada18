//! # Definition Model
//!
//! The type/schema entity shared by every format. A `Definition` is either a
//! pointer to a named type (`reference`), an inline type (`internal_type` plus
//! facets), a composition of other definitions, or a union.

use crate::model::{Annotation, ExternalDocs};
use indexmap::IndexMap;
use serde_json::{Number, Value};
use std::fmt;

/// Canonical, format independent scalar / structural type.
///
/// Each format maps its own `(type, format)` pairs onto this enumeration on
/// import and expands it back on export (see `converters::types`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalType {
    /// Integer without a width.
    Integer,
    /// Number without a width.
    Number,
    /// RAML `format: int`.
    Int,
    /// 8 bit integer.
    Int8,
    /// 16 bit integer.
    Int16,
    /// 32 bit integer.
    Int32,
    /// 64 bit integer.
    Int64,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Boolean.
    Boolean,
    /// Plain string.
    String,
    /// Base64 encoded bytes.
    Byte,
    /// Arbitrary octets.
    Binary,
    /// A string that should be obscured.
    Password,
    /// File upload.
    File,
    /// `YYYY-MM-DD`.
    DateOnly,
    /// Date and time with offset.
    DateTime,
    /// `hh:mm:ss`.
    TimeOnly,
    /// Date and time without offset.
    DateTimeOnly,
    /// Object.
    Object,
    /// Array.
    Array,
    /// The null / nil type.
    Null,
}

impl InternalType {
    /// Returns true for every numeric variant.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            InternalType::Integer
                | InternalType::Number
                | InternalType::Int
                | InternalType::Int8
                | InternalType::Int16
                | InternalType::Int32
                | InternalType::Int64
                | InternalType::Float
                | InternalType::Double
        )
    }

    /// Returns true for variants carried as strings on the wire.
    pub fn is_string_like(self) -> bool {
        matches!(
            self,
            InternalType::String
                | InternalType::Byte
                | InternalType::Binary
                | InternalType::Password
                | InternalType::DateOnly
                | InternalType::DateTime
                | InternalType::TimeOnly
                | InternalType::DateTimeOnly
        )
    }
}

impl fmt::Display for InternalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InternalType::Integer => "integer",
            InternalType::Number => "number",
            InternalType::Int => "int",
            InternalType::Int8 => "int8",
            InternalType::Int16 => "int16",
            InternalType::Int32 => "int32",
            InternalType::Int64 => "int64",
            InternalType::Float => "float",
            InternalType::Double => "double",
            InternalType::Boolean => "boolean",
            InternalType::String => "string",
            InternalType::Byte => "byte",
            InternalType::Binary => "binary",
            InternalType::Password => "password",
            InternalType::File => "file",
            InternalType::DateOnly => "dateonly",
            InternalType::DateTime => "datetime",
            InternalType::TimeOnly => "timeonly",
            InternalType::DateTimeOnly => "datetimeonly",
            InternalType::Object => "object",
            InternalType::Array => "array",
            InternalType::Null => "null",
        };
        write!(f, "{}", name)
    }
}

/// `additionalProperties`: free-form (`true`/`false`) or typed free-form.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    /// `additionalProperties: true|false`.
    Allowed(bool),
    /// `additionalProperties: {schema}` / RAML `//` property.
    Typed(Box<Definition>),
}

/// A type declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Definition {
    /// Declared name (named types and properties).
    pub name: Option<String>,
    /// JSON-Schema `title` / RAML `displayName`.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Canonical type; `None` means "any".
    pub internal_type: Option<InternalType>,
    /// Wire `format` that the internal type did not absorb.
    pub format: Option<String>,
    /// Pointer to a named type. Mutually exclusive with `internal_type`.
    pub reference: Option<String>,
    /// Ordered properties.
    pub properties: IndexMap<String, Definition>,
    /// Names of required properties (parent-level representation).
    pub props_required: Vec<String>,
    /// Item type for arrays.
    pub items: Option<Box<Definition>>,
    /// Free-form / typed free-form map.
    pub additional_properties: Option<AdditionalProperties>,
    /// Members of an intersection (`allOf` / RAML multiple inheritance).
    pub composition_type: Vec<Definition>,
    /// Members of a union (`A | B`).
    pub union_type: Vec<Definition>,
    /// RAML user defined facet declarations.
    pub facets: IndexMap<String, Value>,
    /// RAML values for facets declared by a parent type.
    pub fixed_facets: IndexMap<String, Value>,
    /// Single example.
    pub example: Option<Value>,
    /// Named examples.
    pub examples: Option<Value>,
    /// Default value.
    pub default: Option<Value>,
    /// Enumeration.
    pub enum_values: Vec<Value>,
    /// Numeric lower bound.
    pub minimum: Option<Number>,
    /// Numeric upper bound.
    pub maximum: Option<Number>,
    /// JSON-Schema draft 4 `exclusiveMinimum`.
    pub exclusive_minimum: Option<bool>,
    /// JSON-Schema draft 4 `exclusiveMaximum`.
    pub exclusive_maximum: Option<bool>,
    /// Multiple of.
    pub multiple_of: Option<Number>,
    /// String lower bound.
    pub min_length: Option<u64>,
    /// String upper bound.
    pub max_length: Option<u64>,
    /// String pattern.
    pub pattern: Option<String>,
    /// Array lower bound.
    pub min_items: Option<u64>,
    /// Array upper bound.
    pub max_items: Option<u64>,
    /// Array uniqueness.
    pub unique_items: Option<bool>,
    /// Object lower bound.
    pub min_properties: Option<u64>,
    /// Object upper bound.
    pub max_properties: Option<u64>,
    /// Property used to tell subtypes apart.
    pub discriminator: Option<String>,
    /// RAML `discriminatorValue`.
    pub discriminator_value: Option<Value>,
    /// Swagger `readOnly`.
    pub read_only: Option<bool>,
    /// Swagger `xml` object.
    pub xml: Option<Value>,
    /// RAML `fileTypes`.
    pub file_types: Vec<String>,
    /// Raw schema text that is not JSON (e.g. XML Schema).
    pub schema_source: Option<String>,
    /// External documentation.
    pub external_docs: Option<ExternalDocs>,
    /// Annotations.
    pub annotations: Vec<Annotation>,
}

impl Definition {
    /// A definition that only points at a named type.
    pub fn reference(name: impl Into<String>) -> Self {
        Definition {
            reference: Some(name.into()),
            ..Default::default()
        }
    }

    /// A definition of a bare canonical type.
    pub fn of_type(internal_type: InternalType) -> Self {
        Definition {
            internal_type: Some(internal_type),
            ..Default::default()
        }
    }

    /// Returns true when the property is listed in `props_required`.
    pub fn is_required(&self, property: &str) -> bool {
        self.props_required.iter().any(|p| p == property)
    }

    /// Adds a property name to `props_required` once.
    pub fn mark_required(&mut self, property: &str) {
        if !self.is_required(property) {
            self.props_required.push(property.to_string());
        }
    }

    /// Returns true when nothing but a reference is set.
    pub fn is_plain_reference(&self) -> bool {
        self.reference.is_some()
            && Definition {
                reference: None,
                name: None,
                ..self.clone()
            } == Definition::default()
    }

    /// Returns true when nothing but a canonical type is set.
    pub fn is_plain_type(&self) -> bool {
        self.internal_type.is_some()
            && Definition {
                internal_type: self.internal_type,
                name: None,
                ..Default::default()
            } == Definition {
                name: None,
                ..self.clone()
            }
    }

    /// Names of every type this definition points at, transitively through
    /// its own structure (not through the referenced types).
    pub fn referenced_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references(&self, out: &mut Vec<String>) {
        if let Some(name) = &self.reference {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
        for prop in self.properties.values() {
            prop.collect_references(out);
        }
        if let Some(items) = &self.items {
            items.collect_references(out);
        }
        if let Some(AdditionalProperties::Typed(def)) = &self.additional_properties {
            def.collect_references(out);
        }
        for member in self.composition_type.iter().chain(self.union_type.iter()) {
            member.collect_references(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_reference() {
        let mut def = Definition::reference("Pet");
        assert!(def.is_plain_reference());
        def.description = Some("a pet".into());
        assert!(!def.is_plain_reference());
    }

    #[test]
    fn test_plain_type_ignores_name() {
        let mut def = Definition::of_type(InternalType::String);
        def.name = Some("a".into());
        assert!(def.is_plain_type());
        def.pattern = Some("^a".into());
        assert!(!def.is_plain_type());
    }

    #[test]
    fn test_referenced_names_are_unique_and_ordered() {
        let mut def = Definition::of_type(InternalType::Object);
        def.properties
            .insert("a".into(), Definition::reference("Dog"));
        let mut arr = Definition::of_type(InternalType::Array);
        arr.items = Some(Box::new(Definition::reference("Cat")));
        def.properties.insert("b".into(), arr);
        def.composition_type.push(Definition::reference("Dog"));
        assert_eq!(def.referenced_names(), vec!["Dog", "Cat"]);
    }

    #[test]
    fn test_mark_required_once() {
        let mut def = Definition::default();
        def.mark_required("a");
        def.mark_required("a");
        assert_eq!(def.props_required, vec!["a"]);
    }
}
