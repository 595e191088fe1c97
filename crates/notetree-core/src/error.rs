//! Error types for notetree-core

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias using notetree-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notetree-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The request never completed (connection, TLS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status other than 401
    #[error("HTTP {status}: {message}")]
    Http { status: StatusCode, message: String },

    /// HTTP 401; local credentials were already cleared when this is returned
    #[error("Authentication expired: {message}")]
    AuthExpired { message: String },

    /// Response body could not be decoded into the requested shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Key-value store error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status carried by the error, if it came from a response.
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::AuthExpired { .. } => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_expired_reports_unauthorized_status() {
        let error = Error::AuthExpired {
            message: "not authenticated".to_string(),
        };
        assert!(error.is_auth_expired());
        assert_eq!(error.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn http_error_renders_status_and_message() {
        let error = Error::Http {
            status: StatusCode::NOT_FOUND,
            message: "note not found".to_string(),
        };
        assert_eq!(error.to_string(), "HTTP 404 Not Found: note not found");
        assert!(!error.is_auth_expired());
    }
}
