//! # Security Scheme Converter
//!
//! `securitySchemes` and `securedBy`. Grant names are translated between
//! each RAML version's vocabulary and the Swagger one the model uses.

use super::definition::ImportContext;
use super::method::{export_method, import_method};
use super::ExportContext;
use crate::converters::annotations::import_raml_annotations;
use crate::converters::json::{
    get_str, insert_list, insert_object, insert_opt, named_entries, string_list,
};
use crate::error::AppResult;
use crate::formats::Format;
use crate::model::{
    Definition, HttpMethod, InternalType, Method, Parameter, ParameterLocation,
    SecurityDefinition, SecurityRequirement, SecurityScope, SecurityType,
};
use serde_json::{json, Map, Value};

/// `(model grant, RAML 1.0 grant, RAML 0.8 grant)`.
const GRANTS: [(&str, &str, &str); 4] = [
    ("accessCode", "authorization_code", "code"),
    ("implicit", "implicit", "token"),
    ("password", "password", "owner"),
    ("application", "client_credentials", "credentials"),
];

fn grant_from_raml(grant: &str) -> String {
    GRANTS
        .iter()
        .find(|(_, v10, v08)| *v10 == grant || *v08 == grant)
        .map_or_else(|| grant.to_string(), |(model, _, _)| model.to_string())
}

fn grant_to_raml(grant: &str, version: Format) -> String {
    GRANTS
        .iter()
        .find(|(model, _, _)| *model == grant)
        .map_or_else(
            || grant.to_string(),
            |(_, v10, v08)| (if version == Format::Raml08 { v08 } else { v10 }).to_string(),
        )
}

fn scheme_type(name: &str) -> SecurityType {
    match name {
        "OAuth 2.0" => SecurityType::OAuth2,
        "OAuth 1.0" => SecurityType::OAuth1,
        "Basic Authentication" => SecurityType::Basic,
        "Digest Authentication" => SecurityType::Digest,
        "Pass Through" => SecurityType::PassThrough,
        other => SecurityType::Other(other.to_string()),
    }
}

fn scheme_type_name(type_: &SecurityType) -> String {
    match type_ {
        SecurityType::OAuth2 => "OAuth 2.0".into(),
        SecurityType::OAuth1 => "OAuth 1.0".into(),
        SecurityType::Basic => "Basic Authentication".into(),
        SecurityType::Digest => "Digest Authentication".into(),
        SecurityType::ApiKey | SecurityType::PassThrough => "Pass Through".into(),
        SecurityType::Other(name) if name.starts_with("x-") => name.clone(),
        SecurityType::Other(name) => format!("x-{}", name),
    }
}

/// Settings keys the model gives a field of its own.
const KNOWN_SETTINGS: [&str; 7] = [
    "authorizationUri",
    "accessTokenUri",
    "authorizationGrants",
    "scopes",
    "requestTokenUri",
    "tokenCredentialsUri",
    "signatures",
];

/// Reads `securitySchemes` (map, or RAML 0.8 list of maps).
pub(crate) fn import_security_schemes(
    value: Option<&Value>,
    ctx: &mut ImportContext,
) -> AppResult<Vec<SecurityDefinition>> {
    let mut out = Vec::new();
    for (name, scheme) in named_entries(value) {
        out.push(import_security_scheme(&name, &scheme, ctx)?);
    }
    Ok(out)
}

fn import_security_scheme(
    name: &str,
    value: &Value,
    ctx: &mut ImportContext,
) -> AppResult<SecurityDefinition> {
    let type_name = get_str(value, "type").unwrap_or_default();
    let mut def = SecurityDefinition::new(name, scheme_type(&type_name));
    def.description = get_str(value, "description");
    def.annotations = import_raml_annotations(value);
    if let Some(described) = value.get("describedBy") {
        def.described_by = Some(import_method(HttpMethod::Get, "", described, ctx)?);
    }

    let settings = value.get("settings").cloned().unwrap_or(Value::Null);
    match def.type_ {
        SecurityType::OAuth2 => {
            def.authorization_url = get_str(&settings, "authorizationUri");
            def.token_url = get_str(&settings, "accessTokenUri");
            def.authorization = string_list(settings.get("authorizationGrants"))
                .iter()
                .map(|g| grant_from_raml(g))
                .collect();
            def.scopes = string_list(settings.get("scopes"))
                .into_iter()
                .map(|value| SecurityScope {
                    value,
                    description: None,
                })
                .collect();
        }
        SecurityType::OAuth1 => {
            def.request_token_url = get_str(&settings, "requestTokenUri");
            def.authorization_url = get_str(&settings, "authorizationUri");
            def.token_url = get_str(&settings, "tokenCredentialsUri");
            def.signatures = string_list(settings.get("signatures"));
        }
        _ => {}
    }
    if let Value::Object(map) = &settings {
        let extra: Map<String, Value> = map
            .iter()
            .filter(|(k, _)| !KNOWN_SETTINGS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        if !extra.is_empty() {
            def.settings = Some(Value::Object(extra));
        }
    }
    Ok(def)
}

/// Writes `securitySchemes`.
pub(crate) fn export_security_schemes(
    definitions: &[SecurityDefinition],
    ctx: &mut ExportContext<'_>,
) -> AppResult<Map<String, Value>> {
    let mut out = Map::new();
    for def in definitions {
        out.insert(def.schema_name.clone(), export_security_scheme(def, ctx)?);
    }
    Ok(out)
}

fn export_security_scheme(
    def: &SecurityDefinition,
    ctx: &mut ExportContext<'_>,
) -> AppResult<Value> {
    let mut map = Map::new();
    map.insert("type".into(), Value::String(scheme_type_name(&def.type_)));
    insert_opt(&mut map, "description", def.description.clone());

    let described_by = match (&def.type_, &def.described_by) {
        (_, Some(method)) => Some(method.clone()),
        (SecurityType::ApiKey, None) => api_key_fragment(def),
        _ => None,
    };
    if let Some(method) = described_by {
        let mut fragment = export_method(&method, ctx)?;
        if let Value::Object(obj) = &mut fragment {
            obj.shift_remove("is");
        }
        if fragment.as_object().map_or(false, |o| !o.is_empty()) {
            map.insert("describedBy".into(), fragment);
        }
    }

    let mut settings = Map::new();
    match def.type_ {
        SecurityType::OAuth2 => {
            insert_opt(&mut settings, "authorizationUri", def.authorization_url.clone());
            insert_opt(&mut settings, "accessTokenUri", def.token_url.clone());
            let grants: Vec<String> = def
                .authorization
                .iter()
                .map(|g| grant_to_raml(g, ctx.version))
                .collect();
            insert_list(&mut settings, "authorizationGrants", &grants);
            let scopes: Vec<String> = def.scopes.iter().map(|s| s.value.clone()).collect();
            insert_list(&mut settings, "scopes", &scopes);
        }
        SecurityType::OAuth1 => {
            insert_opt(&mut settings, "requestTokenUri", def.request_token_url.clone());
            insert_opt(&mut settings, "authorizationUri", def.authorization_url.clone());
            insert_opt(&mut settings, "tokenCredentialsUri", def.token_url.clone());
            insert_list(&mut settings, "signatures", &def.signatures);
        }
        _ => {}
    }
    if let Some(Value::Object(extra)) = &def.settings {
        for (k, v) in extra {
            settings.insert(k.clone(), v.clone());
        }
    }
    insert_object(&mut map, "settings", settings);
    ctx.write_annotations(&mut map, &def.annotations);
    Ok(Value::Object(map))
}

/// An API key is a pass-through scheme that documents its one header or
/// query parameter.
fn api_key_fragment(def: &SecurityDefinition) -> Option<Method> {
    let name = def.name.clone()?;
    let param = Parameter::new(
        name,
        def.location.unwrap_or(ParameterLocation::Header),
        Definition::of_type(InternalType::String),
        true,
    );
    let mut method = Method::new(HttpMethod::Get, "");
    match param.location {
        ParameterLocation::Query => method.parameters.push(param),
        _ => method.headers.push(Parameter {
            location: ParameterLocation::Header,
            ..param
        }),
    }
    Some(method)
}

/// Reads `securedBy`.
pub(crate) fn import_secured_by(value: Option<&Value>) -> Vec<SecurityRequirement> {
    let items: Vec<Value> = match value {
        None => return Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    };
    let mut out = Vec::new();
    for item in items {
        match item {
            Value::Null => out.push(SecurityRequirement::default()),
            Value::String(name) => out.push(SecurityRequirement::named(name)),
            Value::Object(map) => {
                for (name, params) in map {
                    out.push(SecurityRequirement {
                        scheme: Some(name),
                        scopes: string_list(params.get("scopes")),
                    });
                }
            }
            other => log::warn!("ignoring securedBy entry {}", other),
        }
    }
    out
}

/// Writes `securedBy`.
pub(crate) fn export_secured_by(requirements: &[SecurityRequirement]) -> Value {
    Value::Array(
        requirements
            .iter()
            .map(|req| match &req.scheme {
                None => Value::Null,
                Some(name) if req.scopes.is_empty() => Value::String(name.clone()),
                Some(name) => {
                    let mut entry = Map::new();
                    entry.insert(name.clone(), json!({"scopes": req.scopes}));
                    Value::Object(entry)
                }
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Root;
    use pretty_assertions::assert_eq;

    fn import(value: Value, version: Format) -> Vec<SecurityDefinition> {
        let mut ctx = ImportContext::new(version);
        import_security_schemes(Some(&value), &mut ctx).unwrap()
    }

    #[test]
    fn test_oauth2_grants_use_model_vocabulary() {
        let schemes = import(
            json!({"oauth_2_0": {
                "type": "OAuth 2.0",
                "settings": {
                    "authorizationUri": "https://auth.example.com/authorize",
                    "accessTokenUri": "https://auth.example.com/token",
                    "authorizationGrants": ["authorization_code"],
                    "scopes": ["read"]
                }
            }}),
            Format::Raml10,
        );
        let oauth = &schemes[0];
        assert_eq!(oauth.type_, SecurityType::OAuth2);
        assert_eq!(oauth.authorization, vec!["accessCode"]);
        assert_eq!(oauth.token_url.as_deref(), Some("https://auth.example.com/token"));
        assert_eq!(oauth.scopes[0].value, "read");
    }

    #[test]
    fn test_raml08_grant_names() {
        let schemes = import(
            json!([{"oauth": {
                "type": "OAuth 2.0",
                "settings": {"authorizationGrants": ["code", "token"]}
            }}]),
            Format::Raml08,
        );
        assert_eq!(schemes[0].authorization, vec!["accessCode", "implicit"]);

        let root = Root::default();
        let mut ctx = ExportContext::new(Format::Raml08, &root);
        let exported = export_security_schemes(&schemes, &mut ctx).unwrap();
        assert_eq!(
            exported["oauth"]["settings"]["authorizationGrants"],
            json!(["code", "token"])
        );
    }

    #[test]
    fn test_described_by_is_read_as_method() {
        let schemes = import(
            json!({"token": {
                "type": "Pass Through",
                "describedBy": {"headers": {"X-Token": "string"}}
            }}),
            Format::Raml10,
        );
        let described = schemes[0].described_by.as_ref().unwrap();
        assert_eq!(described.headers[0].name, "X-Token");
    }

    #[test]
    fn test_api_key_becomes_pass_through() {
        let mut def = SecurityDefinition::new("key", SecurityType::ApiKey);
        def.name = Some("api_key".into());
        def.location = Some(ParameterLocation::Query);
        let root = Root::default();
        let mut ctx = ExportContext::new(Format::Raml10, &root);
        let exported = export_security_schemes(&[def], &mut ctx).unwrap();
        assert_eq!(
            Value::Object(exported),
            json!({"key": {
                "type": "Pass Through",
                "describedBy": {"queryParameters": {"api_key": "string"}}
            }})
        );
    }

    #[test]
    fn test_secured_by_forms() {
        let value = json!([null, "basic", {"oauth": {"scopes": ["read"]}}]);
        let reqs = import_secured_by(Some(&value));
        assert_eq!(reqs[0], SecurityRequirement::default());
        assert_eq!(reqs[1], SecurityRequirement::named("basic"));
        assert_eq!(reqs[2].scopes, vec!["read"]);
        assert_eq!(export_secured_by(&reqs), value);
    }

    #[test]
    fn test_custom_scheme_keeps_settings() {
        let schemes = import(
            json!({"hmac": {"type": "x-hmac", "settings": {"algorithm": "sha256"}}}),
            Format::Raml10,
        );
        assert_eq!(schemes[0].type_, SecurityType::Other("x-hmac".into()));
        assert_eq!(schemes[0].settings, Some(json!({"algorithm": "sha256"})));
        assert_eq!(scheme_type_name(&schemes[0].type_), "x-hmac");
    }
}
