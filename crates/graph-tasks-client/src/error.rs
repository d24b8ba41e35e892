//! # Client Error Types
//!
//! Unified error handling for Graph API calls, configuration and token acquisition.

use thiserror::Error;

/// Client operation result type
pub type ClientResult<T> = Result<T, ClientError>;

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ClientError {
    /// Create an API error from HTTP response
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a not-found error for a remote entity
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Stable snake_case code used in tool error payloads.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::HttpError(_) => "http_error",
            ClientError::SerializationError(_) => "parse_error",
            ClientError::ConfigError(_) => "configuration_error",
            ClientError::ApiError { .. } => "api_error",
            ClientError::AuthError(_) => "auth_error",
            ClientError::NotFound { .. } => "not_found",
            ClientError::InvalidInput(_) => "invalid_input",
            ClientError::IoError(_) => "io_error",
        }
    }

    /// Check if error is transient (a caller may choose to retry; nothing here does)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClientError::HttpError(e) => e.is_timeout() || e.is_connect(),
            ClientError::ApiError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
