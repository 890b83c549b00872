use super::{Middleware, Next};
use crate::error::Result;
use crate::types::{Request, Response, TIME_TAKEN_KEY};
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Settings for [`TimerMiddleware`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerOptions {
    /// Requests slower than this are logged at `warn`.
    pub warn_threshold: Duration,
}

impl Default for TimerOptions {
    fn default() -> Self {
        Self {
            warn_threshold: Duration::from_millis(400),
        }
    }
}

/// Measures each request and stores the elapsed time on the response
/// (see [`Response::time_taken`]).
#[derive(Clone, Debug, Default)]
pub struct TimerMiddleware {
    options: TimerOptions,
}

impl TimerMiddleware {
    /// Create the middleware with the given options.
    pub fn new(options: TimerOptions) -> Self {
        Self { options }
    }

    /// Configured options.
    pub fn options(&self) -> &TimerOptions {
        &self.options
    }
}

#[async_trait]
impl Middleware for TimerMiddleware {
    async fn invoke(&self, request: Request, next: Next<'_>) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().map(|url| url.to_string()).unwrap_or_default();

        let started = Instant::now();
        let mut response = next.run(request).await?;
        let elapsed = started.elapsed();

        if elapsed > self.options.warn_threshold {
            tracing::warn!(
                threshold = ?self.options.warn_threshold,
                "Executed request [{}] {} in {:?}",
                method,
                url,
                elapsed
            );
        } else {
            tracing::debug!("Executed request [{}] {} in {:?}", method, url, elapsed);
        }

        response.items_mut().insert(TIME_TAKEN_KEY, elapsed);
        Ok(response)
    }

    fn name(&self) -> &str {
        "timer"
    }
}
