//! Frozen client configuration and its serializable settings form.
//!
//! [`ClientConfig`] is what a [`ClientBuilder`](super::ClientBuilder) freezes on
//! build. Every container it holds is an owned copy, so nothing done to a builder
//! or to a derived sub-client afterwards is visible through it.
//!
//! [`ClientSettings`] is the subset of the configuration that can live in a config
//! file.
//!
//! # Examples
//!
//! ```
//! use fluently_http::client::ClientSettings;
//!
//! let settings: ClientSettings = serde_json::from_str(r#"{
//!     "identifier": "sketch7",
//!     "base_url": "https://sketch7.com",
//!     "timeout_secs": 30,
//!     "headers": { "locale": ["en-GB"] }
//! }"#).unwrap();
//!
//! assert_eq!(settings.timeout_secs, Some(30));
//! assert!(settings.user_agent.is_none());
//! ```

use crate::formatter::Formatters;
use crate::middleware::Middleware;
use crate::transport::{Transport, TransportHandle};
use crate::types::{Items, RequestTemplate};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// User agent applied to every builder a registry creates.
pub const DEFAULT_USER_AGENT: &str = "fluently";

/// Timeout applied to every builder a registry creates.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Immutable configuration of one client.
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) identifier: String,
    pub(crate) base_url: Option<Url>,
    pub(crate) headers: HeaderMap,
    pub(crate) timeout: Duration,
    pub(crate) items: Items,
    pub(crate) formatters: Formatters,
    pub(crate) middleware: Vec<Arc<dyn Middleware>>,
    pub(crate) request_defaults: RequestTemplate,
    /// Shared by every client built from this configuration or derived from them.
    pub(crate) transport: Option<Arc<TransportHandle>>,
}

impl ClientConfig {
    /// Identifier of the client.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Base URL relative URIs are resolved against.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Timeout applied to each send.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Client-level items copied into every request.
    pub fn items(&self) -> &Items {
        &self.items
    }

    /// Formatters in negotiation order.
    pub fn formatters(&self) -> &Formatters {
        &self.formatters
    }

    /// Middleware in execution order, outermost first.
    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    /// Template every request starts from.
    pub fn request_defaults(&self) -> &RequestTemplate {
        &self.request_defaults
    }

    /// Transport override, `None` when the default network transport is used.
    pub fn transport(&self) -> Option<&Arc<dyn Transport>> {
        self.transport.as_deref().map(TransportHandle::transport)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("identifier", &self.identifier)
            .field("base_url", &self.base_url.as_ref().map(Url::as_str))
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("items", &self.items)
            .field("formatters", &self.formatters)
            .field(
                "middleware",
                &self.middleware.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("request_defaults", &self.request_defaults)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

/// Serializable client settings, e.g. loaded from a JSON config file.
///
/// Unset fields leave the builder untouched when applied with
/// [`ClientBuilder::with_settings`](super::ClientBuilder::with_settings).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Client identifier; required by `Registry::create_builder_from_settings`.
    pub identifier: Option<String>,
    /// Absolute base URL.
    pub base_url: Option<String>,
    /// `User-Agent` header value.
    pub user_agent: Option<String>,
    /// Request timeout in seconds, must be greater than zero.
    pub timeout_secs: Option<u64>,
    /// Header name → values, appended in order.
    pub headers: BTreeMap<String, Vec<String>>,
}
