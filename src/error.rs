use serde_json::Value;
use thiserror::Error;

pub const UNKNOWN_ERROR: &str = "Unknown error occurred";
pub const NETWORK_ERROR: &str = "Network error";

/// A failed remote call, normalized to one shape.
///
/// `status_code` is informational. Nothing branches on a specific code.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status_code: Option<u16>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_ERROR, None)
    }

    /// Builds an error from a non-success response body.
    ///
    /// Known shapes: a JSON string, or a JSON object carrying `title` or
    /// `message` (problem-details style servers use `title`). Other JSON is
    /// passed through serialized, plain text is used as is, and an empty body
    /// yields [`UNKNOWN_ERROR`].
    pub fn from_response(status_code: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<Value>(body) {
            Ok(Value::String(text)) if !text.is_empty() => text,
            Ok(Value::Object(map)) => ["title", "message"]
                .iter()
                .find_map(|key| match map.get(*key) {
                    Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
                    _ => None,
                })
                .unwrap_or_else(|| Value::Object(map).to_string()),
            Ok(Value::Null) => UNKNOWN_ERROR.to_string(),
            Ok(other @ (Value::Array(_) | Value::Number(_) | Value::Bool(_))) => other.to_string(),
            Ok(Value::String(_)) => UNKNOWN_ERROR.to_string(),
            Err(_) if !body.trim().is_empty() => body.trim().to_string(),
            Err(_) => UNKNOWN_ERROR.to_string(),
        };
        Self::new(message, Some(status_code))
    }

    /// Builds an error for a call that never produced a usable response.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let text = err.to_string();
        let message = if text.is_empty() { NETWORK_ERROR.to_string() } else { text };
        Self::new(message, err.status().map(|s| s.as_u16()))
    }
}
