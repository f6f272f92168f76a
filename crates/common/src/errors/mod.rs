//! Error types for XTE
//!
//! Provides the error handling system shared by the engine and the CLI:
//! - Distinct error kinds for lookups, services and malformed inputs
//! - Error codes for machine-readable reporting
//! - Retry classification for external service calls

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using XteError
pub type Result<T> = std::result::Result<T, XteError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Input errors (1xxx)
    MalformedInput,

    // Resource errors (4xxx)
    NotFound,

    // External service errors (8xxx)
    UpstreamError,
    SimilarityError,
    SimilarityTimeout,
    AnnotationError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
    IoError,

    // Service unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::MalformedInput => 1003,

            ErrorCode::NotFound => 4001,

            ErrorCode::UpstreamError => 8001,
            ErrorCode::SimilarityError => 8002,
            ErrorCode::SimilarityTimeout => 8003,
            ErrorCode::AnnotationError => 8004,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
            ErrorCode::IoError => 9004,

            ErrorCode::ServiceUnavailable => 9999,
        }
    }
}

/// Error kinds raised across the workspace
#[derive(Error, Debug)]
pub enum XteError {
    // Lookups
    #[error("Not found: {resource_type} '{id}'")]
    NotFound { resource_type: String, id: String },

    // Inputs
    #[error("Malformed input in {source_name}{}: {message}", line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    MalformedInput {
        source_name: String,
        line: Option<usize>,
        message: String,
    },

    // External services
    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Similarity service error: {message}")]
    Similarity { message: String },

    #[error("Similarity request timed out after {timeout_ms}ms")]
    SimilarityTimeout { timeout_ms: u64 },

    #[error("Annotation error: {message}")]
    Annotation { message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Internal errors
    #[error("Internal consistency failure: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Configuration load error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl XteError {
    /// Shorthand for a malformed line in a named input.
    pub fn malformed(source_name: impl Into<String>, line: Option<usize>, message: impl Into<String>) -> Self {
        XteError::MalformedInput {
            source_name: source_name.into(),
            line,
            message: message.into(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            XteError::NotFound { .. } => ErrorCode::NotFound,
            XteError::MalformedInput { .. } => ErrorCode::MalformedInput,
            XteError::ServiceUnavailable { .. } => ErrorCode::ServiceUnavailable,
            XteError::Similarity { .. } => ErrorCode::SimilarityError,
            XteError::SimilarityTimeout { .. } => ErrorCode::SimilarityTimeout,
            XteError::Annotation { .. } => ErrorCode::AnnotationError,
            XteError::HttpClient(_) => ErrorCode::UpstreamError,
            XteError::Internal { .. } => ErrorCode::InternalError,
            XteError::Configuration { .. } | XteError::ConfigLoad(_) => ErrorCode::ConfigurationError,
            XteError::Io(_) => ErrorCode::IoError,
            XteError::Serialization(_) => ErrorCode::SerializationError,
            XteError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Whether a retry of the failed call can reasonably succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            XteError::ServiceUnavailable { .. } | XteError::SimilarityTimeout { .. } => true,
            XteError::HttpClient(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().map(|s| s.is_server_error()).unwrap_or(false)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = XteError::NotFound {
            resource_type: "synset".into(),
            id: "violence".into(),
        };
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.code().as_code(), 4001);
    }

    #[test]
    fn test_malformed_input_message() {
        let err = XteError::malformed("rte.txt", Some(7), "expected 'T:' marker");
        assert_eq!(err.code(), ErrorCode::MalformedInput);
        assert_eq!(
            err.to_string(),
            "Malformed input in rte.txt at line 7: expected 'T:' marker"
        );

        let err = XteError::malformed("training set", None, "no pairs");
        assert_eq!(err.to_string(), "Malformed input in training set: no pairs");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(XteError::SimilarityTimeout { timeout_ms: 100 }.is_retryable());
        assert!(XteError::ServiceUnavailable { message: "down".into() }.is_retryable());
        assert!(!XteError::Internal { message: "unbalanced".into() }.is_retryable());
        assert!(!XteError::malformed("x", None, "y").is_retryable());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: XteError = io.into();
        assert_eq!(err.code(), ErrorCode::IoError);
    }
}
