use super::Formatter;
use crate::error::Result;
use bytes::Bytes;

/// `application/json` and any `+json` structured syntax suffix.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn media_type(&self) -> &str {
        "application/json"
    }

    fn can_handle(&self, content_type: &str) -> bool {
        content_type == "application/json" || content_type.ends_with("+json")
    }

    fn serialize(&self, value: &serde_json::Value) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(value)?))
    }

    fn deserialize(&self, body: &[u8]) -> Result<serde_json::Value> {
        if body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(body)?)
    }
}
