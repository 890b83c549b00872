use super::Formatter;
use crate::error::{FluentError, Result};
use bytes::Bytes;

/// `text/*` bodies mapped to and from JSON strings.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn media_type(&self) -> &str {
        "text/plain"
    }

    fn can_handle(&self, content_type: &str) -> bool {
        content_type.starts_with("text/")
    }

    fn serialize(&self, value: &serde_json::Value) -> Result<Bytes> {
        match value {
            serde_json::Value::String(text) => Ok(Bytes::from(text.clone())),
            serde_json::Value::Null => Ok(Bytes::new()),
            other => Err(FluentError::InvalidArgument(format!(
                "text formatter can only write strings, got {other}"
            ))),
        }
    }

    fn deserialize(&self, body: &[u8]) -> Result<serde_json::Value> {
        Ok(serde_json::Value::String(
            String::from_utf8_lossy(body).into_owned(),
        ))
    }
}
