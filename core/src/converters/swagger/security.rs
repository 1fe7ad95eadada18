//! # Security Converter
//!
//! `securityDefinitions` and `security` requirements. The model already uses
//! the Swagger grant vocabulary, so OAuth flows copy straight through; extra
//! flows of a multi-grant scheme travel in `x-flows`.

use crate::converters::annotations::{export_extensions, import_extensions};
use crate::converters::json::{get_str, insert_opt, string_list};
use crate::error::AppResult;
use crate::model::{
    ParameterLocation, SecurityDefinition, SecurityRequirement, SecurityScope, SecurityType,
};
use serde_json::{json, Map, Value};

const X_FLOWS: &str = "x-flows";

/// Reads `securityDefinitions`.
pub(crate) fn import_security_definitions(
    value: Option<&Value>,
) -> AppResult<Vec<SecurityDefinition>> {
    let Some(Value::Object(map)) = value else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for (name, scheme) in map {
        match import_security_definition(name, scheme) {
            Some(def) => out.push(def),
            None => log::warn!("security scheme '{}' has an unknown type and was skipped", name),
        }
    }
    Ok(out)
}

fn import_security_definition(name: &str, value: &Value) -> Option<SecurityDefinition> {
    let type_ = match get_str(value, "type")?.as_str() {
        "basic" => SecurityType::Basic,
        "apiKey" => SecurityType::ApiKey,
        "oauth2" => SecurityType::OAuth2,
        _ => return None,
    };
    let mut def = SecurityDefinition::new(name, type_);
    def.description = get_str(value, "description");
    def.annotations = import_extensions(value, &[X_FLOWS]);
    match def.type_ {
        SecurityType::ApiKey => {
            def.name = get_str(value, "name");
            def.location = get_str(value, "in").and_then(|l| l.parse().ok());
        }
        SecurityType::OAuth2 => {
            def.authorization = get_str(value, "flow").into_iter().collect();
            for flow in string_list(value.get(X_FLOWS)) {
                if !def.authorization.contains(&flow) {
                    def.authorization.push(flow);
                }
            }
            def.authorization_url = get_str(value, "authorizationUrl");
            def.token_url = get_str(value, "tokenUrl");
            if let Some(Value::Object(scopes)) = value.get("scopes") {
                def.scopes = scopes
                    .iter()
                    .map(|(scope, desc)| SecurityScope {
                        value: scope.clone(),
                        description: desc.as_str().map(str::to_string),
                    })
                    .collect();
            }
        }
        _ => {}
    }
    Some(def)
}

/// Reads a `security` list.
pub(crate) fn import_requirements(value: Option<&Value>) -> Vec<SecurityRequirement> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for item in items {
        let Some(map) = item.as_object() else { continue };
        if map.is_empty() {
            out.push(SecurityRequirement::default());
        }
        for (scheme, scopes) in map {
            out.push(SecurityRequirement {
                scheme: Some(scheme.clone()),
                scopes: string_list(Some(scopes)),
            });
        }
    }
    out
}

/// Writes `securityDefinitions`; schemes Swagger cannot express are dropped.
pub(crate) fn export_security_definitions(
    definitions: &[SecurityDefinition],
) -> Map<String, Value> {
    let mut out = Map::new();
    for def in definitions {
        match export_security_definition(def) {
            Some(value) => {
                out.insert(def.schema_name.clone(), value);
            }
            None => log::warn!(
                "security scheme '{}' ({:?}) has no Swagger 2.0 equivalent and was dropped",
                def.schema_name,
                def.type_
            ),
        }
    }
    out
}

/// An API key carried by a custom scheme's single header or query parameter.
fn described_api_key(def: &SecurityDefinition) -> Option<(String, ParameterLocation)> {
    let described = def.described_by.as_ref()?;
    match (described.headers.as_slice(), described.parameters.as_slice()) {
        ([header], []) => Some((header.name.clone(), ParameterLocation::Header)),
        ([], [query]) => Some((query.name.clone(), ParameterLocation::Query)),
        _ => None,
    }
}

fn export_security_definition(def: &SecurityDefinition) -> Option<Value> {
    let mut map = Map::new();
    match &def.type_ {
        SecurityType::Basic => {
            map.insert("type".into(), json!("basic"));
        }
        SecurityType::ApiKey => {
            map.insert("type".into(), json!("apiKey"));
            map.insert("name".into(), json!(def.name.clone().unwrap_or_default()));
            let location = def.location.unwrap_or(ParameterLocation::Header);
            map.insert("in".into(), json!(location.as_str()));
        }
        SecurityType::OAuth2 => {
            map.insert("type".into(), json!("oauth2"));
            let flow = def
                .authorization
                .first()
                .cloned()
                .unwrap_or_else(|| "implicit".to_string());
            if matches!(flow.as_str(), "implicit" | "accessCode") {
                map.insert(
                    "authorizationUrl".into(),
                    json!(def.authorization_url.clone().unwrap_or_default()),
                );
            }
            if matches!(flow.as_str(), "password" | "application" | "accessCode") {
                map.insert("tokenUrl".into(), json!(def.token_url.clone().unwrap_or_default()));
            }
            map.insert("flow".into(), json!(flow));
            let scopes: Map<String, Value> = def
                .scopes
                .iter()
                .map(|s| (s.value.clone(), json!(s.description.clone().unwrap_or_default())))
                .collect();
            map.insert("scopes".into(), Value::Object(scopes));
            if def.authorization.len() > 1 {
                map.insert(X_FLOWS.into(), json!(def.authorization[1..].to_vec()));
            }
        }
        SecurityType::PassThrough | SecurityType::Other(_) => {
            let (name, location) = described_api_key(def)?;
            map.insert("type".into(), json!("apiKey"));
            map.insert("name".into(), json!(name));
            map.insert("in".into(), json!(location.as_str()));
        }
        SecurityType::Digest | SecurityType::OAuth1 => return None,
    }
    insert_opt(&mut map, "description", def.description.clone());
    export_extensions(&mut map, &def.annotations);
    Some(Value::Object(map))
}

/// Writes a `security` list, keeping only schemes that were exported.
pub(crate) fn export_requirements(
    requirements: &[SecurityRequirement],
    exported: &Map<String, Value>,
) -> Vec<Value> {
    requirements
        .iter()
        .filter_map(|req| match &req.scheme {
            None => Some(json!({})),
            Some(scheme) if exported.contains_key(scheme) => {
                Some(json!({ scheme.clone(): req.scopes }))
            }
            Some(scheme) => {
                log::warn!("security requirement on dropped scheme '{}' removed", scheme);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_oauth2_round_trip() {
        let raw = json!({
            "petstore_auth": {
                "type": "oauth2",
                "authorizationUrl": "http://example.com/oauth/dialog",
                "flow": "implicit",
                "scopes": {"write:pets": "modify pets"}
            }
        });
        let defs = import_security_definitions(Some(&raw)).unwrap();
        assert_eq!(defs[0].authorization, vec!["implicit"]);
        assert_eq!(defs[0].scopes[0].value, "write:pets");
        assert_eq!(Value::Object(export_security_definitions(&defs)), raw);
    }

    #[test]
    fn test_extra_flows_travel_in_extension() {
        let mut def = SecurityDefinition::new("oauth", SecurityType::OAuth2);
        def.authorization = vec!["accessCode".into(), "implicit".into()];
        def.authorization_url = Some("https://a".into());
        def.token_url = Some("https://t".into());
        let exported = export_security_definitions(&[def.clone()]);
        assert_eq!(exported["oauth"]["flow"], json!("accessCode"));
        assert_eq!(exported["oauth"][X_FLOWS], json!(["implicit"]));
        let back = import_security_definitions(Some(&Value::Object(exported))).unwrap();
        assert_eq!(back[0].authorization, def.authorization);
    }

    #[test]
    fn test_digest_is_dropped_with_its_requirements() {
        let digest = SecurityDefinition::new("digest", SecurityType::Digest);
        let exported = export_security_definitions(&[digest]);
        assert!(exported.is_empty());
        let reqs = vec![SecurityRequirement::named("digest"), SecurityRequirement::default()];
        assert_eq!(export_requirements(&reqs, &exported), vec![json!({})]);
    }

    #[test]
    fn test_requirements_with_anonymous() {
        let raw = json!([{"api_key": []}, {}]);
        let reqs = import_requirements(Some(&raw));
        assert_eq!(reqs[0].scheme.as_deref(), Some("api_key"));
        assert!(reqs[1].scheme.is_none());
    }
}
