//! Structured errors, serializable so callers can report them as JSON

use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("[{code:?}] {message}")]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidConfig,
    MalformedRecording,
    NotFound,
    Io,
    Serialization,
    Unknown,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestions: Vec::new(),
            context: None,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn invalid_config(field: &str, reason: &str) -> Self {
        Self::new(
            ErrorCode::InvalidConfig,
            format!("Invalid config '{}': {}", field, reason),
        )
        .with_context(serde_json::json!({ "field": field }))
    }

    pub fn malformed_recording(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedRecording, reason)
    }

    pub fn not_found(what: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("Not found: {}", what))
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Self::new(ErrorCode::Unknown, format!("{:#}", e))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        let code = match e.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::NotFound,
            _ => ErrorCode::Io,
        };
        Self::new(code, e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::new(ErrorCode::Serialization, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code() {
        let e = Error::invalid_config("double_click_interval_seconds", "must be >= 0");
        assert_eq!(
            e.to_string(),
            "[InvalidConfig] Invalid config 'double_click_interval_seconds': must be >= 0"
        );
    }

    #[test]
    fn serializes_code_screaming() {
        let e = Error::malformed_recording("timestamps go backwards");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["code"], "MALFORMED_RECORDING");
        assert!(json.get("suggestions").is_none());
    }

    #[test]
    fn io_not_found_maps_code() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(Error::from(io).code, ErrorCode::NotFound);
    }
}
