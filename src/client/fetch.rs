//! The built client: request creation, sending and sub-client derivation.
//!
//! # Examples
//!
//! ## Typed GET against a mock transport
//!
//! ```
//! use fluently_http::transport::{MockRoute, MockTransport};
//! use fluently_http::Registry;
//! use http::Method;
//! use serde::Deserialize;
//! use std::sync::Arc;
//!
//! #[derive(Deserialize)]
//! struct Hero {
//!     name: String,
//! }
//!
//! # tokio_test::block_on(async {
//! let mock = MockTransport::new();
//! mock.route(
//!     MockRoute::new(Method::GET, "https://sketch7.com/api/heroes/azmodan")
//!         .respond("application/json", r#"{ "name": "Azmodan" }"#),
//! );
//!
//! let registry = Registry::default();
//! let client = registry
//!     .create_builder("sketch7")?
//!     .with_base_url("https://sketch7.com")?
//!     .with_transport(Arc::new(mock))
//!     .build()?;
//!
//! let hero: Hero = client.get("/api/heroes/azmodan").await?;
//! assert_eq!(hero.name, "Azmodan");
//! # Ok::<(), fluently_http::FluentError>(())
//! # }).unwrap();
//! ```
//!
//! ## Deriving a sub-client
//!
//! ```
//! use fluently_http::Registry;
//!
//! # fn main() -> fluently_http::Result<()> {
//! let registry = Registry::default();
//! let parent = registry
//!     .create_builder("sketch7")?
//!     .with_header("locale", "en-GB")?
//!     .build()?;
//!
//! let sub = parent
//!     .create_client("subclient")?
//!     .with_header("locale", "de")?
//!     .build()?;
//!
//! assert_eq!(sub.identifier(), "sketch7.subclient");
//! assert_eq!(parent.headers()["locale"], "en-GB");
//! assert_eq!(sub.headers()["locale"], "de");
//! assert_eq!(registry.count(), 2);
//! # Ok(())
//! # }
//! ```

use super::config::ClientConfig;
use super::utils;
use super::ClientBuilder;
use crate::error::{FluentError, Result};
use crate::formatter::Formatters;
use crate::middleware::Next;
use crate::registry::{Registry, WeakRegistry};
use crate::transport::{NativeTransport, TransportHandle};
use crate::types::{Items, Request, RequestBody, Response};
use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A configured HTTP client.
///
/// Cloning is cheap and yields a handle to the same client. The configuration is
/// frozen, so handles can be used concurrently without locking.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    transport: Arc<TransportHandle>,
    /// Cleared once by dispose (or drop).
    attached: AtomicBool,
    registry: WeakRegistry,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        if let Err(err) = self.transport.detach(&self.attached) {
            tracing::warn!(client = %self.config.identifier, error = %err, "transport release failed on drop");
        }
    }
}

impl Client {
    /// Wrap a frozen configuration and attach to its transport. Without a transport
    /// override a dedicated [`NativeTransport`] is created.
    pub(crate) fn new(config: ClientConfig, registry: Option<&Registry>) -> Result<Self> {
        let transport = match &config.transport {
            Some(handle) => Arc::clone(handle),
            None => Arc::new(TransportHandle::new(Arc::new(NativeTransport::new(
                config.timeout,
            )?))),
        };
        let attached = transport.attach();

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                attached,
                registry: registry.map(Registry::downgrade).unwrap_or_default(),
            }),
        })
    }

    /// Identifier the client is registered under.
    pub fn identifier(&self) -> &str {
        &self.inner.config.identifier
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.config.headers
    }

    /// Formatters in negotiation order.
    pub fn formatters(&self) -> &Formatters {
        &self.inner.config.formatters
    }

    /// Base URL relative URIs are resolved against.
    pub fn base_url(&self) -> Option<&Url> {
        self.inner.config.base_url.as_ref()
    }

    /// Timeout applied to each send.
    pub fn timeout(&self) -> Duration {
        self.inner.config.timeout
    }

    /// Client-level items copied into every request.
    pub fn items(&self) -> &Items {
        &self.inner.config.items
    }

    /// Number of middleware in the pipeline.
    pub fn middleware_count(&self) -> usize {
        self.inner.config.middleware.len()
    }

    /// The frozen configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Whether both handles point at the same client.
    pub fn ptr_eq(&self, other: &Client) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        !self.inner.attached.load(Ordering::SeqCst)
    }

    /// New request seeded from the request defaults.
    pub fn create_request(&self) -> Request {
        Request::from_template(&self.inner.config.request_defaults, &self.inner.config.items)
    }

    /// Builder for a sub-client identified as `"{identifier}.{sub_identifier}"`.
    ///
    /// The builder starts from a copy of this client's configuration, including a
    /// transport override (also after this client is disposed), and belongs to the
    /// same registry (while it is alive); it is not registered until built.
    pub fn create_client(&self, sub_identifier: &str) -> Result<ClientBuilder> {
        utils::validate_identifier(sub_identifier)?;

        let mut builder = ClientBuilder::from_config(&self.inner.config);
        builder.with_identifier(utils::join_identifier(self.identifier(), sub_identifier));

        if let Some(registry) = self.inner.registry.upgrade() {
            builder.attach_registry(registry);
        }
        Ok(builder)
    }

    /// Send a request through the middleware pipeline and the transport.
    ///
    /// Fails with `RequestFailed` on a non-success status unless the request
    /// disabled the check, with `Timeout` when the client timeout elapses, and with
    /// `Disposed` after [`dispose`](Self::dispose).
    pub async fn send(&self, request: Request) -> Result<Response> {
        let in_flight = self
            .inner
            .transport
            .begin(&self.inner.attached)
            .ok_or_else(|| FluentError::Disposed(self.identifier().to_string()))?;

        let request = self.prepare(request)?;
        let items = request.items().clone();
        let success_check = request.success_check();

        tracing::trace!(
            client = %self.identifier(),
            request_id = %request.id(),
            "sending [{}] {}",
            request.method(),
            request.url().map(Url::as_str).unwrap_or_default()
        );

        let next = Next::new(&self.inner.config.middleware, in_flight.transport());
        let mut response = tokio::time::timeout(self.timeout(), next.run(request))
            .await
            .map_err(|_| FluentError::Timeout)??;

        response.items_mut().merge_missing(&items);

        if success_check {
            response.ensure_success()
        } else {
            Ok(response)
        }
    }

    /// Send and deserialize the response body into `T`.
    pub async fn send_as<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        let response = self.send(request).await?;
        self.deserialize(&response)
    }

    /// Deserialize a response body with the formatter negotiated from its content type.
    pub fn deserialize<T: DeserializeOwned>(&self, response: &Response) -> Result<T> {
        let media_type = response.media_type();
        let formatter = self.formatters().negotiate(media_type.as_deref())?;
        let value = formatter.deserialize(response.body())?;
        Ok(serde_json::from_value(value)?)
    }

    /// GET `uri` and deserialize the response body.
    pub async fn get<T: DeserializeOwned>(&self, uri: &str) -> Result<T> {
        self.send_as(self.verb_request(Method::GET, uri)).await
    }

    /// POST `body` to `uri` and deserialize the response body.
    pub async fn post<T, B>(&self, uri: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.verb_request(Method::POST, uri).with_json_body(body)?;
        self.send_as(request).await
    }

    /// PUT `body` to `uri` and deserialize the response body.
    pub async fn put<T, B>(&self, uri: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.verb_request(Method::PUT, uri).with_json_body(body)?;
        self.send_as(request).await
    }

    /// PATCH `uri` with `body` and deserialize the response body.
    pub async fn patch<T, B>(&self, uri: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.verb_request(Method::PATCH, uri).with_json_body(body)?;
        self.send_as(request).await
    }

    /// DELETE `uri` and deserialize the response body.
    pub async fn delete<T: DeserializeOwned>(&self, uri: &str) -> Result<T> {
        self.send_as(self.verb_request(Method::DELETE, uri)).await
    }

    /// Detach from the transport. Idempotent.
    ///
    /// New sends fail with `Disposed`; requests already in flight complete
    /// normally. When this was the last client on the transport and nothing is in
    /// flight, [`Transport::dispose`](crate::Transport::dispose) runs here and its
    /// error is returned. Otherwise the last in-flight request releases it when it
    /// finishes and logs a failure, as there is no caller left to return it to.
    pub fn dispose(&self) -> Result<()> {
        let released = self.inner.transport.detach(&self.inner.attached)?;
        tracing::debug!(client = %self.identifier(), released, "client disposed");
        Ok(())
    }

    fn verb_request(&self, method: Method, uri: &str) -> Request {
        self.create_request().with_method(method).with_uri(uri)
    }

    /// Resolve the URL, merge client headers and encode the body.
    fn prepare(&self, mut request: Request) -> Result<Request> {
        let config = &self.inner.config;

        let url = utils::resolve_url(
            config.base_url.as_ref(),
            request.uri(),
            request.uri_params(),
            request.query(),
        )?;
        request.set_url(url);

        let headers = utils::merge_headers(&config.headers, request.headers());
        *request.headers_mut() = headers;

        if !request.headers().contains_key(ACCEPT) && !config.formatters.is_empty() {
            let accept = config
                .formatters
                .iter()
                .map(|formatter| formatter.media_type())
                .collect::<Vec<_>>()
                .join(", ");
            request
                .headers_mut()
                .insert(ACCEPT, HeaderValue::try_from(accept)?);
        }

        if let Some(RequestBody::Json(value)) = request.body().cloned() {
            let content_type = request
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.split(';').next().unwrap_or(value).trim().to_ascii_lowercase());

            let formatter = config.formatters.negotiate(content_type.as_deref())?;
            let body = formatter.serialize(&value)?;

            if content_type.is_none() {
                request
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::try_from(formatter.media_type())?);
            }
            request.set_body(RequestBody::Bytes(body));
        }

        Ok(request)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("clients_on_transport", &self.inner.transport.clients())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
