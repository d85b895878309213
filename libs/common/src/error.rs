//! Custom error types for the common library
//!
//! This module defines the error types shared by the session and project
//! clients: gateway failures, credential storage failures and
//! configuration failures.

use thiserror::Error;

/// Error type for every call that goes through the request gateway
#[derive(Error, Debug)]
pub enum ClientError {
    /// The backend answered 401. The session has already been invalidated
    /// by the time the caller sees this.
    #[error("Unauthorized: {}", .detail.as_deref().unwrap_or("credential rejected"))]
    Unauthorized { detail: Option<String> },

    /// The backend answered with any other non-2xx status
    #[error("Request rejected with status {status}")]
    Rejected { status: u16, detail: Option<String> },

    /// No response was available (connection refused, timeout, reset)
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// A request body could not be serialized
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A response body did not match the expected schema
    #[error("Unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The request could not be built (bad path, bad header, bad mime type)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reading or writing the persisted credential failed
    #[error("Credential storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Message carried by the response body, if the backend sent one
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::Unauthorized { detail } | ClientError::Rejected { detail, .. } => {
                detail.as_deref()
            }
            _ => None,
        }
    }

    /// HTTP status of the response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human readable message: the backend detail, else `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_string()
    }
}

/// Error type for credential storage
#[derive(Error, Debug)]
pub enum StorageError {
    /// The storage file could not be read or written
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage file is not a JSON object of strings
    #[error("Storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Error type for configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    /// The configured base URL is not an absolute http(s) URL
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Type alias for Result with ClientError
pub type ClientResult<T> = Result<T, ClientError>;

/// Type alias for Result with StorageError
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ClientError::Rejected {
            status: 400,
            detail: Some("Invalid phone number".to_string()),
        };
        assert_eq!(
            err.user_message("Failed to update profile"),
            "Invalid phone number"
        );
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_user_message_falls_back_without_detail() {
        let err = ClientError::Unauthorized { detail: None };
        assert_eq!(
            err.user_message("Failed to load profile"),
            "Failed to load profile"
        );
        assert_eq!(err.status(), Some(401));

        let err = ClientError::InvalidRequest("bad path".to_string());
        assert_eq!(err.user_message("Login failed"), "Login failed");
        assert_eq!(err.status(), None);
    }
}
