//! Fluent accumulator that freezes into a [`Client`].
//!
//! Builders come from three places:
//!
//! - [`Registry::create_builder`](crate::Registry::create_builder): seeded with the
//!   registry defaults and hook, and auto-registers on [`build`](ClientBuilder::build)
//! - [`Client::create_client`]: seeded with a copy of the parent's configuration
//! - [`ClientBuilder::new`]: standalone, never registered
//!
//! A builder can be built any number of times. Each build freezes a fresh copy of
//! the accumulated state, so clients built from the same builder never share
//! mutable containers.
//!
//! # Examples
//!
//! ```
//! use fluently_http::ClientBuilder;
//!
//! # fn main() -> fluently_http::Result<()> {
//! let client = ClientBuilder::new("sketch7")
//!     .with_base_url("https://sketch7.com")?
//!     .with_header("locale", "en-GB")?
//!     .use_timer()
//!     .with_request_defaults(|defaults| {
//!         defaults.with_item("context", "user");
//!     })
//!     .build()?;
//!
//! assert_eq!(client.identifier(), "sketch7");
//! assert_eq!(client.headers()["locale"], "en-GB");
//! # Ok(())
//! # }
//! ```

use super::config::{ClientConfig, ClientSettings, DEFAULT_TIMEOUT};
use super::utils;
use super::Client;
use crate::error::{FluentError, Result};
use crate::formatter::Formatters;
use crate::middleware::{LoggerOptions, LoggingMiddleware, Middleware, TimerMiddleware, TimerOptions};
use crate::registry::Registry;
use crate::transport::{Transport, TransportHandle};
use crate::types::{Items, RequestTemplate};
use http::header::{HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use http::HeaderMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Mutable client configuration with chainable setters.
///
/// Not synchronized: one builder belongs to one construction sequence.
pub struct ClientBuilder {
    identifier: String,
    base_url: Option<Url>,
    headers: HeaderMap,
    /// Header names copied from a parent and not yet set on this builder.
    inherited_headers: HashSet<HeaderName>,
    timeout: Duration,
    items: Items,
    formatters: Formatters,
    middleware: Vec<Arc<dyn Middleware>>,
    request_defaults: RequestTemplate,
    transport: Option<Arc<TransportHandle>>,
    registry: Option<Registry>,
}

impl ClientBuilder {
    /// Standalone builder with the default timeout and JSON formatting.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            base_url: None,
            headers: HeaderMap::new(),
            inherited_headers: HashSet::new(),
            timeout: DEFAULT_TIMEOUT,
            items: Items::new(),
            formatters: Formatters::default(),
            middleware: Vec::new(),
            request_defaults: RequestTemplate::default(),
            transport: None,
            registry: None,
        }
    }

    /// Builder seeded with a copy of `config`.
    ///
    /// Headers copied here are treated as inherited: the first
    /// [`with_header`](Self::with_header) for one of these names replaces the
    /// inherited values instead of appending to them.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            identifier: config.identifier.clone(),
            base_url: config.base_url.clone(),
            headers: config.headers.clone(),
            inherited_headers: config.headers.keys().cloned().collect(),
            timeout: config.timeout,
            items: config.items.clone(),
            formatters: config.formatters.clone(),
            middleware: config.middleware.clone(),
            request_defaults: config.request_defaults.clone(),
            transport: config.transport.clone(),
            registry: None,
        }
    }

    pub(crate) fn attach_registry(&mut self, registry: Registry) -> &mut Self {
        self.registry = Some(registry);
        self
    }

    /// Set the identifier the client is registered under.
    pub fn with_identifier(&mut self, identifier: impl Into<String>) -> &mut Self {
        self.identifier = identifier.into();
        self
    }

    /// Base URL relative request URIs are resolved against.
    pub fn with_base_url(&mut self, url: &str) -> Result<&mut Self> {
        self.base_url = Some(Url::parse(url)?);
        Ok(self)
    }

    /// Replace the `User-Agent` header.
    pub fn with_user_agent(&mut self, value: &str) -> Result<&mut Self> {
        self.inherited_headers.remove(&USER_AGENT);
        self.headers.insert(USER_AGENT, HeaderValue::try_from(value)?);
        Ok(self)
    }

    /// Fails with `InvalidArgument` for a zero timeout.
    pub fn with_timeout(&mut self, timeout: Duration) -> Result<&mut Self> {
        if timeout.is_zero() {
            return Err(FluentError::InvalidArgument(
                "timeout must be greater than zero".into(),
            ));
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Set the timeout in whole seconds, see [`with_timeout`](Self::with_timeout).
    pub fn with_timeout_secs(&mut self, seconds: u64) -> Result<&mut Self> {
        self.with_timeout(Duration::from_secs(seconds))
    }

    /// Append a header value.
    ///
    /// Values set on this builder accumulate. Values inherited from a parent are
    /// dropped the first time the same name is set here.
    pub fn with_header(&mut self, key: &str, value: &str) -> Result<&mut Self> {
        let name = HeaderName::try_from(key)?;
        let value = HeaderValue::try_from(value)?;

        if self.inherited_headers.remove(&name) {
            self.headers.remove(&name);
        }
        self.headers.append(name, value);
        Ok(self)
    }

    /// Append several headers, see [`with_header`](Self::with_header).
    pub fn with_headers<I, K, V>(&mut self, headers: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in headers {
            self.with_header(key.as_ref(), value.as_ref())?;
        }
        Ok(self)
    }

    /// Replace every value of a header with `value`.
    pub fn set_header(&mut self, key: &str, value: &str) -> Result<&mut Self> {
        let name = HeaderName::try_from(key)?;
        self.inherited_headers.remove(&name);
        self.headers.insert(name, HeaderValue::try_from(value)?);
        Ok(self)
    }

    /// Remove every value of a header. Invalid names are ignored.
    pub fn remove_header(&mut self, key: &str) -> &mut Self {
        if let Ok(name) = HeaderName::try_from(key) {
            self.inherited_headers.remove(&name);
            self.headers.remove(&name);
        }
        self
    }

    /// Set `Authorization: Basic` from a username and password.
    pub fn with_basic_authentication(&mut self, username: &str, password: &str) -> Result<&mut Self> {
        self.inherited_headers.remove(&AUTHORIZATION);
        self.headers
            .insert(AUTHORIZATION, utils::basic_auth_value(username, password)?);
        Ok(self)
    }

    /// Set `Authorization: Bearer` with the given token.
    pub fn with_bearer_authentication(&mut self, token: &str) -> Result<&mut Self> {
        self.inherited_headers.remove(&AUTHORIZATION);
        self.headers
            .insert(AUTHORIZATION, utils::bearer_auth_value(token)?);
        Ok(self)
    }

    /// Client-level context item, visible to every request of the client.
    pub fn with_item<V>(&mut self, key: impl Into<String>, value: V) -> &mut Self
    where
        V: std::any::Any + Send + Sync,
    {
        self.items.insert(key, value);
        self
    }

    /// Manipulate the formatter sequence directly (add, remove, reorder).
    pub fn configure_formatters<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut Formatters),
    {
        configure(&mut self.formatters);
        self
    }

    /// Append a middleware at the end of the pipeline.
    pub fn use_middleware(&mut self, middleware: Arc<dyn Middleware>) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// Append a [`LoggingMiddleware`] with default options.
    pub fn use_logging(&mut self) -> &mut Self {
        self.use_logging_with(LoggerOptions::default())
    }

    /// Append a [`LoggingMiddleware`] with the given options.
    pub fn use_logging_with(&mut self, options: LoggerOptions) -> &mut Self {
        self.use_middleware(Arc::new(LoggingMiddleware::new(options)))
    }

    /// Append a [`TimerMiddleware`] with default options.
    pub fn use_timer(&mut self) -> &mut Self {
        self.use_timer_with(TimerOptions::default())
    }

    /// Append a [`TimerMiddleware`] with the given options.
    pub fn use_timer_with(&mut self, options: TimerOptions) -> &mut Self {
        self.use_middleware(Arc::new(TimerMiddleware::new(options)))
    }

    /// Manipulate the request template in place.
    ///
    /// On a derived builder the template already holds the parent's defaults, so
    /// only the keys touched here change.
    pub fn with_request_defaults<F>(&mut self, configure: F) -> &mut Self
    where
        F: FnOnce(&mut RequestTemplate),
    {
        configure(&mut self.request_defaults);
        self
    }

    /// Replace the network transport, e.g. with a [`MockTransport`](crate::transport::MockTransport).
    ///
    /// Every client built from this builder, and every sub-client derived from
    /// them, shares the transport. It is disposed once all of those clients are
    /// disposed or dropped; the builder's own reference does not keep it alive.
    pub fn with_transport(&mut self, transport: Arc<dyn Transport>) -> &mut Self {
        self.transport = Some(Arc::new(TransportHandle::new(transport)));
        self
    }

    /// Apply every field set in `settings`.
    pub fn with_settings(&mut self, settings: &ClientSettings) -> Result<&mut Self> {
        if let Some(identifier) = &settings.identifier {
            self.with_identifier(identifier.clone());
        }
        if let Some(base_url) = &settings.base_url {
            self.with_base_url(base_url)?;
        }
        if let Some(user_agent) = &settings.user_agent {
            self.with_user_agent(user_agent)?;
        }
        if let Some(seconds) = settings.timeout_secs {
            self.with_timeout_secs(seconds)?;
        }
        for (key, values) in &settings.headers {
            for value in values {
                self.with_header(key, value)?;
            }
        }
        Ok(self)
    }

    /// Identifier the client will be built with.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Configured base URL, if any.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Headers accumulated so far.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Formatter sequence, in negotiation order.
    pub fn formatters(&self) -> &Formatters {
        &self.formatters
    }

    /// Number of middleware registered so far.
    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }

    /// Request template every request of the built client starts from.
    pub fn request_defaults(&self) -> &RequestTemplate {
        &self.request_defaults
    }

    /// Freeze a copy of the current state.
    pub fn build_config(&self) -> Result<ClientConfig> {
        utils::validate_identifier(&self.identifier)?;

        Ok(ClientConfig {
            identifier: self.identifier.clone(),
            base_url: self.base_url.clone(),
            headers: self.headers.clone(),
            timeout: self.timeout,
            items: self.items.clone(),
            formatters: self.formatters.clone(),
            middleware: self.middleware.clone(),
            request_defaults: self.request_defaults.clone(),
            transport: self.transport.clone(),
        })
    }

    /// Build the client and register it with the owning registry, if any.
    ///
    /// Fails with `AlreadyRegistered` when the identifier is taken; nothing is
    /// registered in that case.
    pub fn build(&self) -> Result<Client> {
        let client = self.build_unregistered()?;
        match &self.registry {
            Some(registry) => registry.add(client),
            None => Ok(client),
        }
    }

    /// Build the client without registering it.
    pub fn build_unregistered(&self) -> Result<Client> {
        let config = self.build_config()?;
        tracing::debug!(
            identifier = %config.identifier,
            middleware = config.middleware.len(),
            formatters = config.formatters.len(),
            "building client"
        );
        Client::new(config, self.registry.as_ref())
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("identifier", &self.identifier)
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("items", &self.items)
            .field("formatters", &self.formatters)
            .field("middleware", &self.middleware.len())
            .field("request_defaults", &self.request_defaults)
            .field("registered", &self.registry.is_some())
            .finish()
    }
}
