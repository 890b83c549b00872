use crate::client::{ClientBuilder, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::error::Result;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Hook run against every builder a registry creates.
pub type DefaultsHook = Arc<dyn Fn(&mut ClientBuilder) -> Result<()> + Send + Sync>;

/// Construction options for a [`Registry`](super::Registry).
///
/// ```
/// use fluently_http::{Registry, RegistryOptions};
/// use std::time::Duration;
///
/// let registry = Registry::new(RegistryOptions {
///     timeout: Duration::from_secs(30),
///     ..Default::default()
/// });
/// assert_eq!(registry.create_builder("sketch7").unwrap().timeout(), Duration::from_secs(30));
/// ```
#[derive(Clone)]
pub struct RegistryOptions {
    /// `User-Agent` seeded into every builder.
    pub user_agent: String,
    /// Timeout seeded into every builder.
    pub timeout: Duration,
    /// Initial defaults hook, replaceable later with
    /// [`Registry::configure_defaults`](super::Registry::configure_defaults).
    pub configure_defaults: Option<DefaultsHook>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            configure_defaults: None,
        }
    }
}

impl fmt::Debug for RegistryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryOptions")
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("configure_defaults", &self.configure_defaults.is_some())
            .finish()
    }
}
