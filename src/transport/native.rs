//! `reqwest` backed transport used when no transport override is configured.

use super::Transport;
use crate::error::{FluentError, Result};
use crate::types::{Request, Response};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::time::Duration;

/// Network transport over a pooled [`reqwest::Client`].
///
/// Each clone of the underlying `reqwest::Client` shares one connection pool.
/// A send takes its own handle, so [`dispose`](Transport::dispose) never cuts off a
/// request that is already running.
pub struct NativeTransport {
    client: RwLock<Option<reqwest::Client>>,
}

impl NativeTransport {
    /// Build a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: RwLock::new(Some(client)),
        }
    }

    /// Whether [`dispose`](Transport::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.client.read().is_none()
    }
}

#[async_trait]
impl Transport for NativeTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let client = self
            .client
            .read()
            .clone()
            .ok_or_else(|| FluentError::Transport("transport has been disposed".into()))?;

        let url = request
            .url()
            .cloned()
            .ok_or_else(|| FluentError::InvalidArgument("request url not resolved".into()))?;

        let mut req_builder = client
            .request(request.method().clone(), url)
            .headers(request.headers().clone());

        if let Some(body) = request.body_bytes() {
            req_builder = req_builder.body(body.clone());
        }

        let response = req_builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Response::new(status, headers, body))
    }

    fn dispose(&self) -> Result<()> {
        if self.client.write().take().is_some() {
            tracing::debug!("native transport released its connection pool");
        }
        Ok(())
    }
}
