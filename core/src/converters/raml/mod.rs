//! # RAML 0.8 / 1.0
//!
//! Both versions share one implementation set; the differences (type
//! declarations vs JSON Schema strings, named parameter defaults, grant
//! vocabulary, annotations) are switched on the [`Format`] carried by the
//! import / export context.

pub(crate) mod definition;
pub(crate) mod method;
pub(crate) mod parameter;
pub(crate) mod resource;
pub(crate) mod root;
pub(crate) mod security;
pub(crate) mod template;

use crate::converters::annotations::{
    annotation_to_value, import_raml_annotations, AnnotationTypeRegistry,
};
use crate::converters::FormatConverter;
use crate::error::AppResult;
use crate::formats::Format;
use crate::model::{Annotation, Root};
use serde_json::{Map, Value};

/// RAML converter for one version.
#[derive(Debug, Clone, Copy)]
pub struct RamlConverter {
    version: Format,
}

impl RamlConverter {
    /// Creates a converter for `Format::Raml08` or `Format::Raml10`.
    pub fn new(version: Format) -> Self {
        let version = if version == Format::Raml08 {
            Format::Raml08
        } else {
            Format::Raml10
        };
        RamlConverter { version }
    }
}

impl FormatConverter for RamlConverter {
    fn format(&self) -> Format {
        self.version
    }

    fn import(&self, document: &Value) -> AppResult<Root> {
        root::import_root(document, self.version)
    }

    fn export(&self, root: &Root) -> AppResult<Value> {
        root::export_root(root, self.version)
    }
}

/// State shared by the exporters of one document.
pub(crate) struct ExportContext<'a> {
    /// Target version.
    pub version: Format,
    /// The model being written.
    pub root: &'a Root,
    /// Annotation types the document needs.
    pub registry: AnnotationTypeRegistry,
}

impl<'a> ExportContext<'a> {
    pub(crate) fn new(version: Format, root: &'a Root) -> Self {
        ExportContext {
            version,
            root,
            registry: AnnotationTypeRegistry::from_declared(&root.annotation_types),
        }
    }

    /// RAML 1.0 target.
    pub(crate) fn is_v10(&self) -> bool {
        self.version == Format::Raml10
    }

    /// Writes annotations as `(name)` keys and declares their types.
    /// RAML 0.8 has no annotations; they are dropped.
    pub(crate) fn write_annotations(
        &mut self,
        map: &mut Map<String, Value>,
        annotations: &[Annotation],
    ) {
        if annotations.is_empty() {
            return;
        }
        if !self.is_v10() {
            log::debug!(
                "RAML 0.8 has no annotations, dropping {}",
                annotations.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ")
            );
            return;
        }
        for annotation in annotations {
            map.insert(format!("({})", annotation.name), annotation_to_value(annotation));
        }
        self.registry.ensure_all(annotations);
    }

    /// Writes one synthesized annotation.
    pub(crate) fn write_annotation(
        &mut self,
        map: &mut Map<String, Value>,
        name: &str,
        value: Value,
    ) {
        self.write_annotations(map, &[Annotation::new(name, value)]);
    }
}

/// Reads the `(name)` annotations of a node, lifting out the ones listed in
/// `lifted` (returned separately, in the same order as `lifted`).
pub(crate) fn split_annotations(
    node: &Value,
    lifted: &[&str],
) -> (Vec<Annotation>, Vec<Option<Value>>) {
    let mut annotations = import_raml_annotations(node);
    let picked = lifted
        .iter()
        .map(|name| {
            let idx = annotations.iter().position(|a| a.name == *name)?;
            Some(annotation_to_value(&annotations.remove(idx)))
        })
        .collect();
    (annotations, picked)
}

/// Formats a version for RAML: integer-looking versions stay integers.
pub(crate) fn version_value(version: &str) -> Value {
    match version.parse::<i64>() {
        Ok(n) if n.to_string() == version => Value::from(n),
        _ => Value::String(version.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_version_value() {
        assert_eq!(version_value("1"), json!(1));
        assert_eq!(version_value("v1"), json!("v1"));
        assert_eq!(version_value("01"), json!("01"));
        assert_eq!(version_value("1.0"), json!("1.0"));
    }

    #[test]
    fn test_split_annotations() {
        let node = json!({"(oas-summary)": "s", "(rating)": 3, "description": "d"});
        let (rest, picked) = split_annotations(&node, &["oas-summary", "oas-tags"]);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].name, "rating");
        assert_eq!(picked, vec![Some(json!("s")), None]);
    }

    #[test]
    fn test_annotations_dropped_for_raml08() {
        let root = Root::default();
        let mut ctx = ExportContext::new(Format::Raml08, &root);
        let mut map = Map::new();
        ctx.write_annotation(&mut map, "oas-summary", json!("s"));
        assert!(map.is_empty());
        assert!(ctx.registry.is_empty());
    }
}
