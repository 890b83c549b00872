//! Registry of named clients.
//!
//! The registry owns the identifier → [`Client`] map, hands out builders seeded
//! with shop-wide defaults, and disposes clients it removes.
//!
//! # Thread Safety
//!
//! The map lives behind a `parking_lot::RwLock`. `add` and `remove` take the write
//! lock, so they exclude each other and every read; `get`, `has`, `count` and
//! `identifiers` share the read lock. Cloning a `Registry` yields another handle to
//! the same map.
//!
//! # Disposal Policy
//!
//! `remove` always drops the mapping first, then disposes the client outside the
//! lock and **propagates** a disposal failure to the caller. The transport is
//! released once no client uses it and nothing is in flight; requests already
//! running on the removed client complete normally (see [`Client::dispose`]).
//!
//! # Examples
//!
//! ```
//! use fluently_http::Registry;
//!
//! # fn main() -> fluently_http::Result<()> {
//! let registry = Registry::default();
//! registry.configure_defaults(|builder| {
//!     builder.with_header("x-app", "fluently")?;
//!     Ok(())
//! });
//!
//! let client = registry.create_builder("sketch7")?.build()?;
//! assert!(registry.has("sketch7"));
//! assert_eq!(client.headers()["x-app"], "fluently");
//!
//! registry.remove("sketch7")?.remove("never-added")?;
//! assert_eq!(registry.count(), 0);
//! # Ok(())
//! # }
//! ```

mod options;

pub use options::{DefaultsHook, RegistryOptions};

use crate::client::{validate_identifier, Client, ClientBuilder, ClientSettings};
use crate::error::{FluentError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Shared handle to a client registry.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    clients: RwLock<HashMap<String, Client>>,
    configure_defaults: RwLock<Option<DefaultsHook>>,
    user_agent: String,
    timeout: Duration,
}

/// Non-owning handle held by clients so sub-client builders can register into the
/// parent's registry without keeping it alive.
#[derive(Clone, Default)]
pub(crate) struct WeakRegistry(Weak<RegistryInner>);

impl WeakRegistry {
    pub(crate) fn upgrade(&self) -> Option<Registry> {
        self.0.upgrade().map(|inner| Registry { inner })
    }
}

impl Registry {
    /// Create an empty registry with the given options.
    pub fn new(options: RegistryOptions) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                clients: RwLock::new(HashMap::new()),
                configure_defaults: RwLock::new(options.configure_defaults),
                user_agent: options.user_agent,
                timeout: options.timeout,
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakRegistry {
        WeakRegistry(Arc::downgrade(&self.inner))
    }

    /// New builder for `identifier`, seeded with the registry's user agent and
    /// timeout, then passed through the defaults hook.
    ///
    /// Fails with `InvalidArgument` for an empty identifier and with whatever the
    /// hook fails with.
    pub fn create_builder(&self, identifier: &str) -> Result<ClientBuilder> {
        validate_identifier(identifier)?;

        let mut builder = ClientBuilder::new(identifier);
        builder
            .with_user_agent(&self.inner.user_agent)?
            .with_timeout(self.inner.timeout)?
            .attach_registry(self.clone());

        let hook = self.inner.configure_defaults.read().clone();
        if let Some(hook) = hook {
            hook(&mut builder)?;
        }

        Ok(builder)
    }

    /// [`create_builder`](Self::create_builder) followed by
    /// [`ClientBuilder::with_settings`]. The settings must name the identifier.
    pub fn create_builder_from_settings(&self, settings: &ClientSettings) -> Result<ClientBuilder> {
        let identifier = settings.identifier.as_deref().ok_or_else(|| {
            FluentError::InvalidArgument("client settings carry no identifier".into())
        })?;

        let mut builder = self.create_builder(identifier)?;
        builder.with_settings(settings)?;
        Ok(builder)
    }

    /// Install the hook run against every builder created afterwards. Replaces any
    /// previous hook.
    pub fn configure_defaults<F>(&self, hook: F) -> &Self
    where
        F: Fn(&mut ClientBuilder) -> Result<()> + Send + Sync + 'static,
    {
        *self.inner.configure_defaults.write() = Some(Arc::new(hook));
        self
    }

    /// Register `client`. Returns the same client.
    ///
    /// Fails with `AlreadyRegistered` without touching the map when the identifier
    /// is taken.
    pub fn add(&self, client: Client) -> Result<Client> {
        let mut clients = self.inner.clients.write();
        if clients.contains_key(client.identifier()) {
            return Err(FluentError::AlreadyRegistered(client.identifier().to_string()));
        }

        clients.insert(client.identifier().to_string(), client.clone());
        tracing::debug!(identifier = %client.identifier(), count = clients.len(), "client registered");
        Ok(client)
    }

    /// Build `builder` without its auto-registration and register the result.
    pub fn add_builder(&self, builder: &ClientBuilder) -> Result<Client> {
        let client = builder.build_unregistered()?;
        self.add(client)
    }

    /// The client registered as `identifier`; `NotFound` otherwise.
    pub fn get(&self, identifier: &str) -> Result<Client> {
        self.inner
            .clients
            .read()
            .get(identifier)
            .cloned()
            .ok_or_else(|| FluentError::NotFound(identifier.to_string()))
    }

    /// Unregister and dispose the client. Missing identifiers are a no-op.
    pub fn remove(&self, identifier: &str) -> Result<&Self> {
        let removed = self.inner.clients.write().remove(identifier);

        if let Some(client) = removed {
            tracing::debug!(identifier, "client removed");
            client.dispose()?;
        }
        Ok(self)
    }

    /// Whether a client is registered under `identifier`.
    pub fn has(&self, identifier: &str) -> bool {
        self.inner.clients.read().contains_key(identifier)
    }

    /// Number of registered clients.
    pub fn count(&self) -> usize {
        self.inner.clients.read().len()
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut identifiers: Vec<String> = self.inner.clients.read().keys().cloned().collect();
        identifiers.sort();
        identifiers
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryOptions::default())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("clients", &self.identifiers())
            .field("user_agent", &self.inner.user_agent)
            .field("timeout", &self.inner.timeout)
            .field(
                "configure_defaults",
                &self.inner.configure_defaults.read().is_some(),
            )
            .finish()
    }
}
