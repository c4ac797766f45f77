//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Distinguishes server-reported failures (the backend answered with an
//! error body) from transport failures (no response at all), mirroring how
//! call sites surface them to the user.
//!
//! ## Design Principles
//!
//! - Single unified error type (BridgeError) for the entire application
//! - Server-reported messages are carried verbatim to the user
//! - Degradable conditions (malformed stream frame, failed image embed) are
//!   logged at the site, never raised through this type
//! - No panic/unwrap - all errors are recoverable

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    /// The server answered with a non-2xx status. `message` is the `detail`
    /// or `message` field of the response body when present, otherwise the
    /// HTTP status line.
    #[error("Request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (connect failure, timeout).
    #[error("No response received from the server: {0}")]
    NoResponse(String),

    /// Status stream failure (connect, protocol, or unexpected close).
    #[error("Status stream error: {0}")]
    Stream(String),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backend-supplied component hierarchy failed an integrity check
    /// (duplicate id or excessive nesting depth).
    #[error("Component tree integrity violation: {0}")]
    TreeIntegrity(String),

    /// Export was invoked with zero component content; no artifact is
    /// produced in this case.
    #[error("No documentation content available to export")]
    EmptyExport,

    #[error("Not found: {0}")]
    NotFound(String),
}

impl BridgeError {
    /// Create a server-reported error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid-input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a stream error
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }

    /// Whether this error is a transient backend condition that a retry
    /// could plausibly resolve. Used by the stream supervisor to decide
    /// whether a reconnect attempt is worthwhile.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NoResponse(_) | Self::Stream(_) => true,
            Self::Api { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            return BridgeError::NoResponse(err.to_string());
        }
        if let Some(status) = err.status() {
            return BridgeError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        BridgeError::NoResponse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = BridgeError::api(422, "config_filename is required");
        assert_eq!(
            err.to_string(),
            "Request failed with status 422: config_filename is required"
        );
    }

    #[test]
    fn test_no_response_display() {
        let err = BridgeError::NoResponse("connection refused".to_string());
        assert!(err.to_string().starts_with("No response received"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(BridgeError::NoResponse("timeout".into()).is_transient());
        assert!(BridgeError::stream("closed before completion").is_transient());
        assert!(BridgeError::api(503, "unavailable").is_transient());
        assert!(!BridgeError::api(404, "missing").is_transient());
        assert!(!BridgeError::Config("bad".into()).is_transient());
        assert!(!BridgeError::EmptyExport.is_transient());
    }
}
