//! Error types for the HunterHub identity module
//!
//! The taxonomy separates environmental failures (collectors, storage,
//! remote store) from caller mistakes (validation). Environmental errors
//! are logged and absorbed by the identity manager; only validation errors
//! reach the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::JsValue;

pub type Result<T> = std::result::Result<T, IdentityError>;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Entropy collection (1xx)
    CollectorFailed = 100,

    // Local persistence (2xx)
    PersistenceFailed = 200,

    // Remote profile store (3xx)
    RemoteFailed = 300,

    // Caller input (4xx)
    ValidationFailed = 400,

    // Encoding (5xx)
    SerializationFailed = 500,
}

/// Main error type for identity operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdentityError {
    /// A canvas/WebGL/audio/navigator probe failed or is unsupported.
    #[error("Collector {collector} failed: {reason}")]
    Collector {
        collector: &'static str,
        reason: String,
    },

    /// Local key-value storage is missing or rejected a read/write.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The remote profile store rejected or could not serve a request.
    #[error("Remote profile store error: {0}")]
    Remote(String),

    /// Caller supplied input that fails local constraints.
    #[error("Invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl IdentityError {
    /// Build a collector error from a thrown JS value.
    pub fn collector(collector: &'static str, value: &JsValue) -> Self {
        IdentityError::Collector {
            collector,
            reason: js_error_message(value),
        }
    }

    /// Build a remote-store error from a thrown JS value.
    pub fn remote(context: &str, value: &JsValue) -> Self {
        IdentityError::Remote(format!("{}: {}", context, js_error_message(value)))
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        IdentityError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Get the error code for programmatic handling
    pub fn code(&self) -> ErrorCode {
        match self {
            IdentityError::Collector { .. } => ErrorCode::CollectorFailed,
            IdentityError::Persistence(_) => ErrorCode::PersistenceFailed,
            IdentityError::Remote(_) => ErrorCode::RemoteFailed,
            IdentityError::Validation { .. } => ErrorCode::ValidationFailed,
            IdentityError::Serialization(_) => ErrorCode::SerializationFailed,
        }
    }

    /// Whether the error comes from the environment (browser APIs, storage,
    /// network) rather than from the caller.
    ///
    /// Environmental errors are absorbed: the identity keeps working from
    /// local state and the user never sees them.
    pub fn is_environmental(&self) -> bool {
        !matches!(self, IdentityError::Validation { .. })
    }

    /// Get a user-friendly message for display
    pub fn user_message(&self) -> String {
        match self {
            IdentityError::Collector { .. } => {
                "Some device characteristics could not be read. Your profile still works.".into()
            }
            IdentityError::Persistence(_) => {
                "Failed to save your profile. Please check browser storage permissions.".into()
            }
            IdentityError::Remote(_) => {
                "Could not reach the profile server. Changes are kept on this device.".into()
            }
            IdentityError::Validation { field, reason } => format!("{}: {}", field, reason),
            IdentityError::Serialization(_) => {
                "Stored profile data could not be read. A fresh profile will be used.".into()
            }
        }
    }
}

impl From<serde_json::Error> for IdentityError {
    fn from(err: serde_json::Error) -> Self {
        IdentityError::Serialization(err.to_string())
    }
}

impl From<IdentityError> for JsValue {
    fn from(err: IdentityError) -> Self {
        let info = ErrorInfo::from(&err);
        serde_wasm_bindgen::to_value(&info).unwrap_or_else(|_| JsValue::from_str(&err.to_string()))
    }
}

/// Error information for JavaScript consumption
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub code: u32,
    pub message: String,
    pub user_message: String,
    pub is_environmental: bool,
}

impl From<&IdentityError> for ErrorInfo {
    fn from(err: &IdentityError) -> Self {
        ErrorInfo {
            code: err.code() as u32,
            message: err.to_string(),
            user_message: err.user_message(),
            is_environmental: err.is_environmental(),
        }
    }
}

/// Best-effort text for a thrown JS value (Error objects, strings, anything else).
fn js_error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}
