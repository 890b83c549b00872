//! Responses produced by transports and returned through the middleware pipeline.

use crate::error::{FluentError, Result};
use crate::types::Items;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// Item key under which [`TimerMiddleware`](crate::middleware::TimerMiddleware)
/// stores the elapsed time of a request.
pub const TIME_TAKEN_KEY: &str = "TIME_TAKEN";

/// An HTTP response.
///
/// A response carries the items of the request that produced it, so context set on
/// the request is visible to middleware on the way back out.
#[derive(Clone, Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    items: Items,
}

impl Response {
    /// Create a response with empty items.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            items: Items::new(),
        }
    }

    /// HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as lossy UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Media type of the body without parameters, lower-cased.
    ///
    /// ```
    /// use fluently_http::Response;
    /// use http::{HeaderMap, StatusCode, header::CONTENT_TYPE};
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert(CONTENT_TYPE, "Application/JSON; charset=utf-8".parse().unwrap());
    /// let response = Response::new(StatusCode::OK, headers, "{}");
    /// assert_eq!(response.media_type().as_deref(), Some("application/json"));
    /// ```
    pub fn media_type(&self) -> Option<String> {
        let value = self.headers.get(CONTENT_TYPE)?.to_str().ok()?;
        let media_type = value.split(';').next()?.trim();
        if media_type.is_empty() {
            None
        } else {
            Some(media_type.to_ascii_lowercase())
        }
    }

    /// Items carried over from the request, plus any set by middleware.
    pub fn items(&self) -> &Items {
        &self.items
    }

    /// Mutable access to the response items.
    pub fn items_mut(&mut self) -> &mut Items {
        &mut self.items
    }

    /// Elapsed time recorded by the timer middleware, if it ran.
    pub fn time_taken(&self) -> Option<Duration> {
        self.items.get::<Duration>(TIME_TAKEN_KEY).copied()
    }

    /// Fail with [`FluentError::RequestFailed`] on a non-success status.
    pub fn ensure_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FluentError::RequestFailed {
                status: self.status,
                body: self.text(),
            })
        }
    }
}
