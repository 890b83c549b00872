use super::{Middleware, Next};
use crate::error::Result;
use crate::types::{Request, Response};
use async_trait::async_trait;
use std::time::Instant;

/// Item key for per-request [`LoggerOptions`] overriding the middleware's own.
pub const LOGGER_OPTIONS_KEY: &str = "LOGGER_OPTIONS";

/// What [`LoggingMiddleware`] writes besides method, URL, status and timing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoggerOptions {
    /// Log request headers and body.
    pub log_detailed_request: bool,
    /// Log response headers and body.
    pub log_detailed_response: bool,
}

/// Logs each request and its outcome through `tracing`.
#[derive(Clone, Debug, Default)]
pub struct LoggingMiddleware {
    options: LoggerOptions,
}

impl LoggingMiddleware {
    /// Create the middleware with the given options.
    pub fn new(options: LoggerOptions) -> Self {
        Self { options }
    }

    /// Options used when a request carries none.
    pub fn options(&self) -> &LoggerOptions {
        &self.options
    }
}

#[async_trait]
impl Middleware for LoggingMiddleware {
    async fn invoke(&self, request: Request, next: Next<'_>) -> Result<Response> {
        let options = request
            .items()
            .get::<LoggerOptions>(LOGGER_OPTIONS_KEY)
            .copied()
            .unwrap_or(self.options);

        let method = request.method().clone();
        let url = request
            .url()
            .map(|url| url.to_string())
            .unwrap_or_default();
        let request_id = request.id();

        if options.log_detailed_request {
            let body = request
                .body_bytes()
                .map(|body| String::from_utf8_lossy(body).into_owned())
                .unwrap_or_default();
            tracing::info!(
                %request_id,
                headers = ?request.headers(),
                %body,
                "Pre-request [{}] {}",
                method,
                url
            );
        } else {
            tracing::info!(%request_id, "Pre-request [{}] {}", method, url);
        }

        let started = Instant::now();
        let result = next.run(request).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(response) if options.log_detailed_response => {
                tracing::info!(
                    %request_id,
                    status = %response.status(),
                    headers = ?response.headers(),
                    body = %response.text(),
                    "Post-request [{}] {} in {:?}",
                    method,
                    url,
                    elapsed
                );
            }
            Ok(response) => {
                tracing::info!(
                    %request_id,
                    status = %response.status(),
                    "Post-request [{}] {} in {:?}",
                    method,
                    url,
                    elapsed
                );
            }
            Err(err) => {
                tracing::warn!(%request_id, error = %err, "Request [{}] {} failed in {:?}", method, url, elapsed);
            }
        }

        result
    }

    fn name(&self) -> &str {
        "logging"
    }
}
