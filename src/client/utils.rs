//! Helpers shared by builders, clients and requests.
//!
//! - Identifier validation and sub-client identifier composition
//! - URL resolution against a base URL, with `{name}` template interpolation
//! - Header merging and authentication header values

use crate::error::{FluentError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::{HeaderMap, HeaderValue};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use url::Url;

/// Fail with `InvalidArgument` when the identifier is empty or blank.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    if identifier.trim().is_empty() {
        return Err(FluentError::InvalidArgument(
            "client identifier must not be empty".into(),
        ));
    }
    Ok(())
}

/// Identifier of a sub-client: `parent.sub`.
///
/// ```
/// use fluently_http::client::join_identifier;
///
/// assert_eq!(join_identifier("sketch7", "subclient"), "sketch7.subclient");
/// ```
pub fn join_identifier(parent: &str, sub: &str) -> String {
    format!("{parent}.{sub}")
}

fn template_param() -> &'static Regex {
    static PARAM: OnceLock<Regex> = OnceLock::new();
    PARAM.get_or_init(|| Regex::new(r"\{([A-Za-z0-9_\-]+)\}").expect("static regex is valid"))
}

/// Replace `{name}` placeholders in `template` with values from `params`.
///
/// ```
/// use fluently_http::client::interpolate_uri;
/// use std::collections::BTreeMap;
///
/// let params = BTreeMap::from([("hero".to_string(), "azmodan".to_string())]);
/// assert_eq!(interpolate_uri("api/heroes/{hero}", &params).unwrap(), "api/heroes/azmodan");
/// assert!(interpolate_uri("api/heroes/{missing}", &params).is_err());
/// ```
pub fn interpolate_uri(template: &str, params: &BTreeMap<String, String>) -> Result<String> {
    let mut missing = None;
    let interpolated = template_param().replace_all(template, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match params.get(name) {
            Some(value) => value.clone(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(FluentError::InvalidArgument(format!(
            "uri template parameter '{name}' has no value"
        ))),
        None => Ok(interpolated.into_owned()),
    }
}

/// Resolve a request URI against the client's base URL.
///
/// Absolute URIs are used as-is; relative ones are joined onto `base` with
/// [`Url::join`] semantics. Query pairs are appended in order.
pub fn resolve_url(
    base: Option<&Url>,
    uri: Option<&str>,
    params: &BTreeMap<String, String>,
    query: &[(String, String)],
) -> Result<Url> {
    let uri = uri
        .map(|uri| interpolate_uri(uri, params))
        .transpose()?
        .filter(|uri| !uri.is_empty());

    let mut url = match (base, uri) {
        (Some(base), None) => base.clone(),
        (base, Some(uri)) => match Url::parse(&uri) {
            Ok(absolute) => absolute,
            Err(url::ParseError::RelativeUrlWithoutBase) => match base {
                Some(base) => base.join(&uri)?,
                None => {
                    return Err(FluentError::InvalidArgument(format!(
                        "relative uri '{uri}' requires a base url"
                    )))
                }
            },
            Err(err) => return Err(err.into()),
        },
        (None, None) => {
            return Err(FluentError::InvalidArgument(
                "request has neither a uri nor a base url".into(),
            ))
        }
    };

    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }

    Ok(url)
}

/// Copy `base` and replace every header named in `overrides` with the override values.
pub fn merge_headers(base: &HeaderMap, overrides: &HeaderMap) -> HeaderMap {
    let mut merged = base.clone();
    for name in overrides.keys() {
        merged.remove(name);
        for value in overrides.get_all(name) {
            merged.append(name.clone(), value.clone());
        }
    }
    merged
}

/// `Authorization` value for HTTP basic authentication.
pub fn basic_auth_value(username: &str, password: &str) -> Result<HeaderValue> {
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    let mut value = HeaderValue::try_from(format!("Basic {encoded}"))?;
    value.set_sensitive(true);
    Ok(value)
}

/// `Authorization` value for a bearer token.
pub fn bearer_auth_value(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::try_from(format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}
