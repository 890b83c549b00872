//! Request objects and the per-client request template.

use crate::client::{basic_auth_value, bearer_auth_value};
use crate::error::Result;
use crate::types::Items;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use http::{HeaderMap, Method};
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;
use uuid::Uuid;

/// Body attached to a [`Request`].
///
/// JSON bodies are encoded by the client's formatters when the request is sent.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// Structured value, encoded by the negotiated formatter.
    Json(serde_json::Value),
    /// Raw, already encoded bytes.
    Bytes(Bytes),
}

/// Partial request specification applied to every request a client creates.
///
/// Received by the hook passed to
/// [`ClientBuilder::with_request_defaults`](crate::ClientBuilder::with_request_defaults).
/// When a sub-client is derived the template is copied, so the hook only changes
/// the keys it touches.
///
/// # Examples
///
/// ```
/// use fluently_http::RequestTemplate;
/// use http::Method;
///
/// let mut template = RequestTemplate::default();
/// template
///     .with_method(Method::POST)
///     .with_uri("api/graphql")
///     .with_item("context", "user");
///
/// assert_eq!(template.method(), &Method::POST);
/// assert_eq!(template.uri(), Some("api/graphql"));
/// ```
#[derive(Clone, Debug)]
pub struct RequestTemplate {
    method: Method,
    uri: Option<String>,
    items: Items,
}

impl Default for RequestTemplate {
    fn default() -> Self {
        Self {
            method: Method::GET,
            uri: None,
            items: Items::new(),
        }
    }
}

impl RequestTemplate {
    /// Set the HTTP method.
    pub fn with_method(&mut self, method: Method) -> &mut Self {
        self.method = method;
        self
    }

    /// Set the URI (may contain `{name}` placeholders).
    pub fn with_uri(&mut self, uri: impl Into<String>) -> &mut Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set or overwrite a single item.
    pub fn with_item<V>(&mut self, key: impl Into<String>, value: V) -> &mut Self
    where
        V: std::any::Any + Send + Sync,
    {
        self.items.insert(key, value);
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URI, possibly with `{name}` placeholders.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Template items.
    pub fn items(&self) -> &Items {
        &self.items
    }

    /// Mutable access to the template items.
    pub fn items_mut(&mut self) -> &mut Items {
        &mut self.items
    }
}

/// A single HTTP request created from a [`Client`](crate::Client).
///
/// Requests start from the client's [`RequestTemplate`]; every setter overrides one
/// value and leaves the rest of the template in place.
///
/// # Examples
///
/// ```
/// use fluently_http::Request;
/// use http::Method;
///
/// let request = Request::new()
///     .with_method(Method::GET)
///     .with_uri("/api/heroes/{hero}")
///     .with_uri_param("hero", "azmodan")
///     .with_query("include", "title");
///
/// assert_eq!(request.uri(), Some("/api/heroes/{hero}"));
/// ```
#[derive(Clone, Debug)]
pub struct Request {
    id: Uuid,
    method: Method,
    uri: Option<String>,
    uri_params: BTreeMap<String, String>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<RequestBody>,
    items: Items,
    success_check: bool,
    url: Option<Url>,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Create a bare GET request with no URI.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            method: Method::GET,
            uri: None,
            uri_params: BTreeMap::new(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            items: Items::new(),
            success_check: true,
            url: None,
        }
    }

    /// Seed a request from a template. Client items come first and template items
    /// override them per key.
    pub fn from_template(template: &RequestTemplate, client_items: &Items) -> Self {
        let mut items = client_items.clone();
        items.merge(&template.items);

        Self {
            method: template.method.clone(),
            uri: template.uri.clone(),
            items,
            ..Self::new()
        }
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the URI, absolute or relative to the client's base URL. May contain `{name}` placeholders.
    #[must_use]
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Value for a `{name}` placeholder in the URI.
    #[must_use]
    pub fn with_uri_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.uri_params.insert(name.into(), value.to_string());
        self
    }

    /// Append a query string pair.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a header value. Request headers replace client headers of the same name.
    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self> {
        let name = HeaderName::try_from(key)?;
        let value = HeaderValue::try_from(value)?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Set `Authorization: Bearer` with the given token.
    pub fn with_bearer_authentication(mut self, token: &str) -> Result<Self> {
        self.headers
            .insert(AUTHORIZATION, bearer_auth_value(token)?);
        Ok(self)
    }

    /// Set `Authorization: Basic` from a username and password.
    pub fn with_basic_authentication(mut self, username: &str, password: &str) -> Result<Self> {
        self.headers
            .insert(AUTHORIZATION, basic_auth_value(username, password)?);
        Ok(self)
    }

    /// Attach a body that is encoded by the client's formatters.
    pub fn with_json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Attach an already encoded body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Bytes(body.into()));
        self
    }

    /// Set or overwrite a single item.
    #[must_use]
    pub fn with_item<V>(mut self, key: impl Into<String>, value: V) -> Self
    where
        V: std::any::Any + Send + Sync,
    {
        self.items.insert(key, value);
        self
    }

    /// Whether a non-success status fails the send (default `true`).
    #[must_use]
    pub fn with_success_check(mut self, enabled: bool) -> Self {
        self.success_check = enabled;
        self
    }

    /// Unique id of this request.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// URI as set, before resolution.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Values for `{name}` placeholders.
    pub fn uri_params(&self) -> &BTreeMap<String, String> {
        &self.uri_params
    }

    /// Query pairs, in order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the request headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Body as attached.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Encoded body, available once the client has prepared the request.
    pub fn body_bytes(&self) -> Option<&Bytes> {
        match &self.body {
            Some(RequestBody::Bytes(bytes)) => Some(bytes),
            _ => None,
        }
    }

    /// Request items.
    pub fn items(&self) -> &Items {
        &self.items
    }

    /// Mutable access to the request items.
    pub fn items_mut(&mut self) -> &mut Items {
        &mut self.items
    }

    /// Whether a non-success status fails the send.
    pub fn success_check(&self) -> bool {
        self.success_check
    }

    /// Absolute URL resolved by the client before the request enters the pipeline.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub(crate) fn set_url(&mut self, url: Url) {
        self.url = Some(url);
    }

    pub(crate) fn set_body(&mut self, body: RequestBody) {
        self.body = Some(body);
    }
}
