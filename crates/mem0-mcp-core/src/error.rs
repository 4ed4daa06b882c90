//! Error types for mem0-mcp-core.
//!
//! Two kinds of failure live here and they propagate differently:
//!
//! - [`CoreError`] covers configuration and setup defects. These are raised
//!   synchronously (client acquisition, config validation) because they mean
//!   the deployment is broken, not that a single call failed.
//! - [`ServiceError`] is the structured value a failed mem0 call resolves to.
//!   It never escapes the retry wrapper as a Rust error: the invoker turns it
//!   into a JSON error payload so the tool layer always has a well-formed
//!   string to return.

use serde_json::json;
use thiserror::Error;

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The mem0 API key does not match the required format.
    ///
    /// Raised before any client construction or network activity.
    #[error("Invalid MEM0_API_KEY format: {reason}")]
    InvalidApiKey {
        /// Why the key was rejected (prefix, length).
        reason: String,
    },

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error during serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// A failed call to the mem0 service.
///
/// Carries the human-readable message and, when the failure came back as an
/// HTTP response, the numeric status code. Classification for the retry
/// policy operates on the `status` field only, never on the error source.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ServiceError {
    /// Human-readable description of the failure.
    pub message: String,
    /// HTTP status code, if the service produced one.
    pub status: Option<u16>,
}

impl ServiceError {
    /// Create a service error with a status code.
    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a service error with no status signal (connectivity, decode).
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Classify this error for the retry policy.
    pub fn class(&self) -> ErrorClass {
        match self.status {
            Some(s) if (500..600).contains(&s) => ErrorClass::Transient,
            Some(_) => ErrorClass::Permanent,
            None => ErrorClass::Unknown,
        }
    }

    /// The structured payload surfaced to callers: `{"error": ..., "status": ...}`.
    ///
    /// `status` is JSON null when the failure carried no status signal.
    pub fn to_payload(&self) -> serde_json::Value {
        json!({
            "error": self.message,
            "status": self.status,
        })
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
        }
    }
}

/// Retry classification of a [`ServiceError`].
///
/// Only `Transient` failures are retried; `Unknown` is treated like
/// `Permanent` so errors of unknown nature fail fast instead of looping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Server-side failure (5xx) - retryable.
    Transient,
    /// Client-side failure (4xx or any other explicit status) - not retryable.
    Permanent,
    /// No status signal (timeouts, DNS, decode errors) - fails fast.
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_api_key_display() {
        let err = CoreError::InvalidApiKey {
            reason: "must start with 'm0-'".to_string(),
        };
        assert!(err.to_string().contains("Invalid MEM0_API_KEY format"));
        assert!(err.to_string().contains("m0-"));
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(
            ServiceError::with_status("server", 500).class(),
            ErrorClass::Transient
        );
        assert_eq!(
            ServiceError::with_status("server", 599).class(),
            ErrorClass::Transient
        );
        assert_eq!(
            ServiceError::with_status("client", 400).class(),
            ErrorClass::Permanent
        );
        assert_eq!(
            ServiceError::with_status("client", 499).class(),
            ErrorClass::Permanent
        );
        assert_eq!(
            ServiceError::unclassified("timeout").class(),
            ErrorClass::Unknown
        );
    }

    #[test]
    fn test_error_payload_shape() {
        let payload = ServiceError::with_status("Bad request", 400).to_payload();
        assert_eq!(payload["error"], "Bad request");
        assert_eq!(payload["status"], 400);

        let payload = ServiceError::unclassified("connection refused").to_payload();
        assert!(payload["status"].is_null());
    }
}
