//! Boundary errors.
//!
//! The compiler, normalizer and allocator are total over well-formed trees and never
//! fail. Errors only exist where text crosses into the crate: JSON payloads coming
//! from the editor host and option blobs.

/// Errors that can occur while decoding input for the style pipeline
#[derive(Debug, Clone)]
pub enum StyleError {
    InvalidJson {
        what: &'static str,
        reason: String,
    },
    NotAnObject {
        what: &'static str,
        found: &'static str,
    },
    InvalidOptions {
        reason: String,
    },
}

impl StyleError {
    pub(crate) fn json(what: &'static str, err: serde_json::Error) -> Self {
        Self::InvalidJson {
            what,
            reason: err.to_string(),
        }
    }
}

impl std::fmt::Display for StyleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson { what, reason } => {
                write!(f, "Invalid {} JSON: {}", what, reason)
            }
            Self::NotAnObject { what, found } => {
                write!(f, "Expected {} to be an object, found {}", what, found)
            }
            Self::InvalidOptions { reason } => {
                write!(f, "Invalid style options: {}", reason)
            }
        }
    }
}

impl std::error::Error for StyleError {}

/// JSON type name used in `NotAnObject` messages
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
