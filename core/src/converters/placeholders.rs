//! # Template Parameters
//!
//! `<<name>>` substitution inside trait / resource type templates, including
//! the RAML transform functions (`<<resourcePathName | !singularize>>`).

use crate::model::{
    AdditionalProperties, Body, Definition, Method, Parameter, Resource, Response,
};
use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::OnceLock;

/// Values available to a template: explicit ones plus the reserved
/// `resourcePath`, `resourcePathName` and `methodName`.
#[derive(Debug, Clone, Default)]
pub struct TemplateParams {
    values: IndexMap<String, String>,
    wildcard: bool,
}

impl TemplateParams {
    /// Builds the parameter set for a template applied at `resource_path`.
    pub fn new(
        resource_path: &str,
        method_name: Option<&str>,
        explicit: &[(String, Value)],
    ) -> Self {
        let mut values = IndexMap::new();
        values.insert("resourcePath".to_string(), resource_path.to_string());
        values.insert("resourcePathName".to_string(), resource_path_name(resource_path));
        if let Some(method) = method_name {
            values.insert("methodName".to_string(), method.to_string());
        }
        for (name, value) in explicit {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            values.insert(name.clone(), text);
        }
        TemplateParams {
            values,
            wildcard: false,
        }
    }

    /// Parameters that erase every placeholder, known or not.
    fn wildcard() -> Self {
        TemplateParams {
            values: IndexMap::new(),
            wildcard: true,
        }
    }

    /// Returns a copy with `methodName` set.
    pub fn with_method(&self, method_name: &str) -> Self {
        let mut copy = self.clone();
        copy.values
            .insert("methodName".to_string(), method_name.to_string());
        copy
    }

    /// Replaces every known placeholder in `text`. Unknown ones are left as is.
    pub fn apply(&self, text: &str) -> String {
        if !text.contains("<<") {
            return text.to_string();
        }
        placeholder_regex()
            .replace_all(text, |caps: &Captures<'_>| {
                let name = &caps[1];
                match self.values.get(name) {
                    Some(value) => caps
                        .get(2)
                        .map(|m| m.as_str())
                        .unwrap_or_default()
                        .split('|')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .fold(value.clone(), |acc, function| transform(&acc, function)),
                    None if self.wildcard => String::new(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r"<<\s*([A-Za-z0-9_\-]+)\s*((?:\|\s*![A-Za-z]+\s*)*)>>").expect("Invalid regex")
    })
}

/// The last path segment that is not a URI parameter.
fn resource_path_name(path: &str) -> String {
    path.split('/')
        .rev()
        .find(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .unwrap_or_default()
        .to_string()
}

fn transform(value: &str, function: &str) -> String {
    match function.trim_start_matches('!') {
        "singularize" => singularize(value),
        "pluralize" => pluralize(value),
        "uppercase" => value.to_uppercase(),
        "lowercase" => value.to_lowercase(),
        "lowercamelcase" => value.to_lower_camel_case(),
        "uppercamelcase" => value.to_upper_camel_case(),
        "lowerunderscorecase" => value.to_snake_case(),
        "upperunderscorecase" => value.to_shouty_snake_case(),
        "lowerhyphencase" => value.to_kebab_case(),
        "upperhyphencase" => value.to_shouty_kebab_case(),
        other => {
            log::warn!("unknown template function '!{}' ignored", other);
            value.to_string()
        }
    }
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        format!("{}y", stem)
    } else if word.ends_with("sses") || word.ends_with("xes") || word.ends_with("ches") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

fn pluralize(word: &str) -> String {
    let vowel_before_y = word
        .chars()
        .rev()
        .nth(1)
        .map_or(false, |c| "aeiou".contains(c));
    if word.ends_with('y') && !vowel_before_y {
        format!("{}ies", &word[..word.len() - 1])
    } else if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}

/// Returns true when the entity carries at least one `<<placeholder>>`.
pub fn has_placeholders<T: Substitute + Clone + PartialEq>(value: &T) -> bool {
    let mut probe = value.clone();
    probe.substitute(&TemplateParams::wildcard());
    probe != *value
}

/// In-place placeholder substitution over model entities.
pub trait Substitute {
    /// Replaces placeholders in every string the entity carries.
    fn substitute(&mut self, params: &TemplateParams);
}

impl Substitute for String {
    fn substitute(&mut self, params: &TemplateParams) {
        if self.contains("<<") {
            *self = params.apply(self);
        }
    }
}

impl<T: Substitute> Substitute for Option<T> {
    fn substitute(&mut self, params: &TemplateParams) {
        if let Some(inner) = self {
            inner.substitute(params);
        }
    }
}

impl<T: Substitute> Substitute for Vec<T> {
    fn substitute(&mut self, params: &TemplateParams) {
        for item in self {
            item.substitute(params);
        }
    }
}

impl Substitute for Value {
    fn substitute(&mut self, params: &TemplateParams) {
        match self {
            Value::String(s) => s.substitute(params),
            Value::Array(items) => items.substitute(params),
            Value::Object(map) => {
                let entries: Vec<(String, Value)> = std::mem::take(map)
                    .into_iter()
                    .map(|(k, mut v)| {
                        v.substitute(params);
                        (params.apply(&k), v)
                    })
                    .collect();
                map.extend(entries);
            }
            _ => {}
        }
    }
}

impl Substitute for Definition {
    fn substitute(&mut self, params: &TemplateParams) {
        self.name.substitute(params);
        self.title.substitute(params);
        self.description.substitute(params);
        self.reference.substitute(params);
        self.pattern.substitute(params);
        self.default.substitute(params);
        self.example.substitute(params);
        self.examples.substitute(params);
        self.enum_values.substitute(params);
        self.props_required.substitute(params);
        let properties = std::mem::take(&mut self.properties);
        for (name, mut prop) in properties {
            prop.substitute(params);
            self.properties.insert(params.apply(&name), prop);
        }
        if let Some(items) = &mut self.items {
            items.substitute(params);
        }
        if let Some(AdditionalProperties::Typed(typed)) = &mut self.additional_properties {
            typed.substitute(params);
        }
        self.composition_type.substitute(params);
        self.union_type.substitute(params);
    }
}

impl Substitute for Parameter {
    fn substitute(&mut self, params: &TemplateParams) {
        self.name.substitute(params);
        self.display_name.substitute(params);
        self.description.substitute(params);
        self.definition.substitute(params);
    }
}

impl Substitute for Body {
    fn substitute(&mut self, params: &TemplateParams) {
        self.mime_type.substitute(params);
        self.description.substitute(params);
        self.definition.substitute(params);
    }
}

impl Substitute for Response {
    fn substitute(&mut self, params: &TemplateParams) {
        self.description.substitute(params);
        self.headers.substitute(params);
        self.bodies.substitute(params);
    }
}

impl Substitute for Method {
    fn substitute(&mut self, params: &TemplateParams) {
        let params = params.with_method(self.method.as_str());
        self.name.substitute(&params);
        self.summary.substitute(&params);
        self.description.substitute(&params);
        self.headers.substitute(&params);
        self.bodies.substitute(&params);
        self.form_bodies.substitute(&params);
        self.parameters.substitute(&params);
        self.query_strings.substitute(&params);
        self.responses.substitute(&params);
        for template in &mut self.is {
            for (_, value) in &mut template.parameters {
                value.substitute(&params);
            }
        }
    }
}

impl Substitute for Resource {
    fn substitute(&mut self, params: &TemplateParams) {
        self.display_name.substitute(params);
        self.description.substitute(params);
        self.parameters.substitute(params);
        self.methods.substitute(params);
        for template in self.is.iter_mut().chain(self.resource_type.iter_mut()) {
            for (_, value) in &mut template.parameters {
                value.substitute(params);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpMethod, InternalType};
    use serde_json::json;

    #[test]
    fn test_reserved_parameters() {
        let params = TemplateParams::new("/users/{id}/books", Some("get"), &[]);
        assert_eq!(params.apply("<<resourcePath>>"), "/users/{id}/books");
        assert_eq!(params.apply("<<resourcePathName>>"), "books");
        assert_eq!(params.apply("<< methodName >>"), "get");
    }

    #[test]
    fn test_transform_functions() {
        let params = TemplateParams::new("/user-accounts", None, &[]);
        assert_eq!(
            params.apply("<<resourcePathName | !singularize | !uppercamelcase>>"),
            "UserAccount"
        );
        assert_eq!(params.apply("<<resourcePathName | !upperunderscorecase>>"), "USER_ACCOUNTS");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(singularize("boxes"), "box");
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        let params = TemplateParams::new("/a", None, &[]);
        assert_eq!(params.apply("x <<missing>> y"), "x <<missing>> y");
    }

    #[test]
    fn test_has_placeholders() {
        let mut method = Method::new(HttpMethod::Get, "");
        assert!(!has_placeholders(&method));
        method.description = Some("sorted by <<field>>".into());
        assert!(has_placeholders(&method));
    }

    #[test]
    fn test_explicit_values_are_stringified() {
        let params = TemplateParams::new("/a", None, &[("max".into(), json!(10))]);
        assert_eq!(params.apply("up to <<max>>"), "up to 10");
    }

    #[test]
    fn test_method_substitution_reaches_definitions() {
        let mut method = Method::new(HttpMethod::Get, "");
        let mut def = Definition::reference("<<item>>");
        def.description = Some("a <<methodName>>".into());
        method.bodies.push(Body {
            definition: Some(def),
            ..Default::default()
        });
        method.parameters.push(Parameter::new(
            "<<name>>",
            crate::model::ParameterLocation::Query,
            Definition::of_type(InternalType::String),
            false,
        ));
        let params = TemplateParams::new(
            "/pets",
            None,
            &[("item".into(), json!("Pet")), ("name".into(), json!("q"))],
        );
        method.substitute(&params);
        let body_def = method.bodies[0].definition.as_ref().unwrap();
        assert_eq!(body_def.reference.as_deref(), Some("Pet"));
        assert_eq!(body_def.description.as_deref(), Some("a get"));
        assert_eq!(method.parameters[0].name, "q");
    }
}
