//! Client builders, built clients and their configuration.
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── builder - ClientBuilder, the fluent accumulator
//! ├── config  - ClientConfig (frozen snapshot) and ClientSettings
//! ├── fetch   - Client: requests, verbs, sub-client derivation, disposal
//! ├── gql     - GraphQL requests on top of the request template
//! └── utils   - identifiers, URL resolution, header helpers
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ClientBuilder`] | Chainable configuration, optionally seeded from a parent |
//! | [`Client`] | Frozen, shareable client handle |
//! | [`ClientConfig`] | Immutable snapshot owned by one client |
//! | [`ClientSettings`] | Serializable subset of the configuration |
//!
//! # Inheritance
//!
//! [`Client::create_client`] seeds a new builder with a copy of the parent's
//! configuration. Headers and items are copied; formatter and middleware
//! sequences are copied with their entries shared. Nothing done to the derived
//! builder reaches the parent, and nothing done to the parent's builder afterwards
//! reaches the sub-client.

mod builder;
mod config;
mod fetch;
mod gql;
mod utils;

pub use builder::ClientBuilder;
pub use config::{ClientConfig, ClientSettings, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use fetch::Client;
pub use gql::{GqlError, GqlRequest, GqlResponse};
pub use utils::{interpolate_uri, join_identifier, merge_headers, resolve_url, validate_identifier};

pub(crate) use utils::{basic_auth_value, bearer_auth_value};
