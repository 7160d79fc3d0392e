//! Error types for trellis operations.

use thiserror::Error;

/// Result type alias for trellis operations.
pub type TrellisResult<T> = Result<T, TrellisError>;

/// Main error type for all trellis operations.
#[derive(Error, Debug)]
pub enum TrellisError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Graph store operation failed.
    #[error("Graph store error: {message}")]
    GraphStore {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Similarity collaborator failed.
    #[error("Similarity error: {message}")]
    Similarity {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Extraction collaborator failed.
    #[error("Extraction error: {message}")]
    Extraction { message: String },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrellisError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a graph store error without a source.
    pub fn graph_store(message: impl Into<String>) -> Self {
        Self::GraphStore {
            message: message.into(),
            source: None,
        }
    }

    /// Create a similarity error without a source.
    pub fn similarity(message: impl Into<String>) -> Self {
        Self::Similarity {
            message: message.into(),
            source: None,
        }
    }

    /// Create an extraction error.
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<rusqlite::Error> for TrellisError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
