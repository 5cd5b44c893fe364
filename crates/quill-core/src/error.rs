//! Error types for the Quill application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Quill application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum QuillError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential storage error (API keys)
    #[error("Credential error: {0}")]
    Credential(String),

    /// Inference error (model listing, continuation, chat completion)
    #[error("Inference error: {0}")]
    Inference(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuillError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Credential error
    pub fn credential(message: impl Into<String>) -> Self {
        Self::Credential(message.into())
    }

    /// Creates an Inference error
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error indicates an entity was not found.
    ///
    /// The session orchestrator treats dangling "last opened" pointers as
    /// tolerable: a missing chapter or session falls back to a default
    /// instead of failing the whole project load.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<std::io::Error> for QuillError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for QuillError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for QuillError {
    fn from(err: reqwest::Error) -> Self {
        Self::Inference(err.to_string())
    }
}

/// Conversion from String (for error messages)
impl From<String> for QuillError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, QuillError>`.
pub type Result<T> = std::result::Result<T, QuillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err = QuillError::not_found("chapter", 42);
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Entity not found: chapter '42'");

        let err = QuillError::io("disk full");
        assert!(!err.is_not_found());
    }
}
