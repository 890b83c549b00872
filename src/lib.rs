#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # fluently_http: Named HTTP Clients
//!
//! A registry of named HTTP clients configured through fluent builders. Clients
//! share registry-wide defaults, carry their own headers, formatters, middleware
//! and request defaults, and can derive sub-clients that inherit a copy of all of
//! it.
//!
//! ## Overview
//!
//! 1. **Registry** - identifier → client map with defaults applied to every builder
//! 2. **Builders** - chainable configuration, re-buildable, optionally seeded from a parent
//! 3. **Clients** - frozen, shareable handles that create and send requests
//! 4. **Pipeline** - ordered middleware wrapped around a pluggable transport
//!
//! ## Key Features
//!
//! - **Sub-clients**: `parent.create_client("sub")` yields a builder for `parent.sub`
//!   starting from a copy of the parent's configuration
//! - **Formatters**: media-type keyed (de)serialization, negotiated per response
//! - **Request defaults**: a request template every new request starts from
//! - **Items**: typed context values flowing from client to request to response
//! - **Mock transport**: route-based canned responses for tests
//!
//! ## Usage
//!
//! ```
//! use fluently_http::transport::{MockRoute, MockTransport};
//! use fluently_http::Registry;
//! use http::Method;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let mock = Arc::new(MockTransport::new());
//! mock.route(
//!     MockRoute::new(Method::GET, "https://sketch7.com/api/heroes/azmodan")
//!         .respond("application/json", r#"{ "name": "Azmodan" }"#),
//! );
//!
//! let registry = Registry::default();
//! registry.configure_defaults(|builder| {
//!     builder.use_timer();
//!     Ok(())
//! });
//!
//! let client = registry
//!     .create_builder("sketch7")?
//!     .with_base_url("https://sketch7.com")?
//!     .with_header("locale", "en-GB")?
//!     .with_transport(mock.clone())
//!     .build()?;
//!
//! let sub = client
//!     .create_client("subclient")?
//!     .with_header("locale", "de")?
//!     .build()?;
//!
//! let hero: serde_json::Value = sub.get("/api/heroes/azmodan").await?;
//! assert_eq!(hero["name"], "Azmodan");
//! assert_eq!(registry.count(), 2);
//! assert_eq!(mock.received()[0].headers()["locale"], "de");
//! # Ok::<(), fluently_http::FluentError>(())
//! # }).unwrap();
//! ```
//!
//! ## Module Structure
//!
//! - **[registry]** - Client registry and registry options
//! - **[client]** - Builders, clients, configuration and GraphQL helpers
//! - **[types]** - Requests, responses, request templates and items
//! - **[formatter]** - Body formatters and negotiation
//! - **[middleware]** - Request pipeline, logging and timing middleware
//! - **[transport]** - Network and mock transports
//! - **[error]** - Error types and result handling

pub mod client;
pub mod error;
pub mod formatter;
pub mod middleware;
pub mod registry;
pub mod transport;
pub mod types;

pub use client::{Client, ClientBuilder, ClientConfig, ClientSettings, GqlRequest, GqlResponse};
pub use error::{FluentError, Result};
pub use formatter::{Formatter, Formatters};
pub use middleware::{Middleware, Next};
pub use registry::{Registry, RegistryOptions};
pub use transport::Transport;
pub use types::{Items, Request, RequestBody, RequestTemplate, Response};

#[cfg(test)]
mod tests;
