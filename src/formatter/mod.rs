//! Content formatters and the ordered collection used for negotiation.
//!
//! A [`Formatter`] converts between encoded bodies and [`serde_json::Value`], the
//! intermediate representation typed helpers go through. Negotiation picks the
//! first formatter in [`Formatters`] that handles the content type, so order is
//! priority.
//!
//! # Examples
//!
//! ```
//! use fluently_http::formatter::{Formatters, JsonFormatter, TextFormatter};
//! use std::sync::Arc;
//!
//! let mut formatters = Formatters::default();
//! assert_eq!(formatters.len(), 1);
//!
//! formatters.push(Arc::new(TextFormatter));
//! assert_eq!(formatters.find("text/plain").unwrap().media_type(), "text/plain");
//! assert_eq!(formatters.find("application/problem+json").unwrap().media_type(), "application/json");
//! ```

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::error::{FluentError, Result};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// Content (de)serialization capability.
pub trait Formatter: Send + Sync {
    /// Media type written into `Content-Type` when this formatter encodes a body.
    fn media_type(&self) -> &str;

    /// Whether this formatter reads and writes `content_type` (already lower-cased,
    /// without parameters).
    fn can_handle(&self, content_type: &str) -> bool;

    /// Encode a value into a request body.
    fn serialize(&self, value: &serde_json::Value) -> Result<Bytes>;

    /// Decode a response body into a value.
    fn deserialize(&self, body: &[u8]) -> Result<serde_json::Value>;
}

/// Ordered formatter sequence.
///
/// Cloning copies the sequence; the formatters themselves are shared.
#[derive(Clone)]
pub struct Formatters {
    inner: Vec<Arc<dyn Formatter>>,
}

impl Default for Formatters {
    /// JSON only.
    fn default() -> Self {
        Self {
            inner: vec![Arc::new(JsonFormatter)],
        }
    }
}

impl Formatters {
    /// Empty collection.
    pub fn empty() -> Self {
        Self { inner: Vec::new() }
    }

    /// Append a formatter at the end of the sequence.
    pub fn push(&mut self, formatter: Arc<dyn Formatter>) -> &mut Self {
        self.inner.push(formatter);
        self
    }

    /// Insert at `index`, shifting later formatters down in priority.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, formatter: Arc<dyn Formatter>) -> &mut Self {
        self.inner.insert(index, formatter);
        self
    }

    /// Remove every formatter with the given media type. Returns how many were removed.
    pub fn remove_media_type(&mut self, media_type: &str) -> usize {
        let before = self.inner.len();
        self.inner
            .retain(|formatter| !formatter.media_type().eq_ignore_ascii_case(media_type));
        before - self.inner.len()
    }

    /// Remove every formatter.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Number of formatters.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no formatter is configured.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Formatters in negotiation order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Formatter>> {
        self.inner.iter()
    }

    /// First formatter able to handle `content_type`.
    pub fn find(&self, content_type: &str) -> Option<&Arc<dyn Formatter>> {
        let content_type = content_type.to_ascii_lowercase();
        self.inner
            .iter()
            .find(|formatter| formatter.can_handle(&content_type))
    }

    /// Formatter used when no content type is known: the first one.
    pub fn default_formatter(&self) -> Option<&Arc<dyn Formatter>> {
        self.inner.first()
    }

    /// Negotiate a formatter for an optional content type.
    pub(crate) fn negotiate(&self, content_type: Option<&str>) -> Result<&Arc<dyn Formatter>> {
        match content_type {
            Some(content_type) => self
                .find(content_type)
                .ok_or_else(|| FluentError::UnsupportedMediaType(content_type.to_string())),
            None => self
                .default_formatter()
                .ok_or_else(|| FluentError::UnsupportedMediaType("<none>".to_string())),
        }
    }
}

impl fmt::Debug for Formatters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.inner.iter().map(|formatter| formatter.media_type()))
            .finish()
    }
}
