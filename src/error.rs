//! Error types for client registry and request operations.
//!
//! The [`Result`] type alias is used by every fallible operation in the crate.
//!
//! # Error Categories
//!
//! | Category | Variants | Raised by |
//! |----------|----------|-----------|
//! | Validation | `InvalidArgument` | builders, registry, request preparation |
//! | Registry | `AlreadyRegistered`, `NotFound` | [`Registry`](crate::Registry) |
//! | Response | `RequestFailed`, `UnsupportedMediaType`, `Json` | [`Client`](crate::Client) sends |
//! | Transport | `Transport`, `Timeout`, `Disposed` | transports, disposed clients |
//!
//! # Examples
//!
//! ```
//! use fluently_http::FluentError;
//!
//! let err = FluentError::NotFound("sketch7".into());
//! assert!(err.is_not_found());
//! assert!(err.to_string().contains("sketch7"));
//! ```

use http::StatusCode;
use thiserror::Error;

/// Result type for client and registry operations.
pub type Result<T> = std::result::Result<T, FluentError>;

/// Errors that can occur while configuring, registering or using clients.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FluentError {
    /// An argument failed validation (empty identifier, zero timeout, bad header, bad URL).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A client with the same identifier is already registered.
    #[error("Client '{0}' is already registered")]
    AlreadyRegistered(String),

    /// No client is registered under the identifier.
    #[error("Client '{0}' not registered")]
    NotFound(String),

    /// The transport returned a non-success status.
    ///
    /// The body is kept as lossy UTF-8 text when one was received.
    #[error("Request failed with status {status}: {body}")]
    RequestFailed {
        /// Response status code.
        status: StatusCode,
        /// Response body, empty when none was received.
        body: String,
    },

    /// The transport could not complete the request.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request exceeded the client's timeout.
    #[error("Request timed out")]
    Timeout,

    /// The client was disposed and can no longer send requests.
    #[error("Client '{0}' has been disposed")]
    Disposed(String),

    /// No configured formatter handles the content type.
    #[error("No formatter registered for media type '{0}'")]
    UnsupportedMediaType(String),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for FluentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FluentError::Timeout
        } else {
            FluentError::Transport(err.to_string())
        }
    }
}

impl From<url::ParseError> for FluentError {
    fn from(err: url::ParseError) -> Self {
        FluentError::InvalidArgument(format!("invalid url: {err}"))
    }
}

impl From<http::header::InvalidHeaderName> for FluentError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        FluentError::InvalidArgument(format!("invalid header name: {err}"))
    }
}

impl From<http::header::InvalidHeaderValue> for FluentError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        FluentError::InvalidArgument(format!("invalid header value: {err}"))
    }
}

impl FluentError {
    /// Returns `true` when a lookup missed.
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, FluentError::NotFound(_))
    }

    /// Returns `true` when a registration collided with an existing identifier.
    #[inline]
    #[must_use]
    pub fn is_already_registered(&self) -> bool {
        matches!(self, FluentError::AlreadyRegistered(_))
    }

    /// Returns `true` for argument validation failures.
    #[inline]
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, FluentError::InvalidArgument(_))
    }

    /// Status code of a failed response, if this error carries one.
    ///
    /// ```
    /// use fluently_http::FluentError;
    /// use http::StatusCode;
    ///
    /// let err = FluentError::RequestFailed { status: StatusCode::NOT_FOUND, body: String::new() };
    /// assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    /// assert_eq!(FluentError::Timeout.status(), None);
    /// ```
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FluentError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}
