//! Request/response interceptors composed around the transport.
//!
//! Middleware run in registration order: the first registered is the outermost
//! and sees the request first and the response last.
//!
//! ```text
//! request → mw[0] → mw[1] → … → transport
//! response ← mw[0] ← mw[1] ← … ← transport
//! ```
//!
//! # Writing middleware
//!
//! ```
//! use async_trait::async_trait;
//! use fluently_http::middleware::{Middleware, Next};
//! use fluently_http::{Request, Response, Result};
//!
//! struct Tenant(&'static str);
//!
//! #[async_trait]
//! impl Middleware for Tenant {
//!     async fn invoke(&self, request: Request, next: Next<'_>) -> Result<Response> {
//!         next.run(request.with_item("tenant", self.0)).await
//!     }
//! }
//! ```

mod logging;
mod timer;

pub use logging::{LoggerOptions, LoggingMiddleware, LOGGER_OPTIONS_KEY};
pub use timer::{TimerMiddleware, TimerOptions};

use crate::error::Result;
use crate::transport::Transport;
use crate::types::{Request, Response};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Interceptor around the transport call.
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    /// Handle `request`, usually by delegating to `next`.
    async fn invoke(&self, request: Request, next: Next<'_>) -> Result<Response>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// The rest of the pipeline after the current middleware.
pub struct Next<'a> {
    middleware: &'a [Arc<dyn Middleware>],
    transport: &'a dyn Transport,
}

impl<'a> Next<'a> {
    pub(crate) fn new(middleware: &'a [Arc<dyn Middleware>], transport: &'a dyn Transport) -> Self {
        Self {
            middleware,
            transport,
        }
    }

    /// Run the remaining middleware, then the transport.
    pub fn run(self, request: Request) -> BoxFuture<'a, Result<Response>> {
        match self.middleware.split_first() {
            Some((current, rest)) => {
                let next = Next::new(rest, self.transport);
                current.invoke(request, next)
            }
            None => self.transport.send(request),
        }
    }
}
