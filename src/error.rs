//! Domain-specific error types for anime-recommender

use thiserror::Error;

/// Main error type for the recommender library
#[derive(Error, Debug)]
pub enum RecommenderError {
    /// Query title has no case-insensitive exact match in the catalog.
    #[error("Title not found: '{title}'")]
    NotFound { title: String },

    /// A record field could not be parsed; aborts the whole dataset load.
    #[error("Malformed field '{field}' at row {row}: {message}")]
    MalformedField {
        row: usize,
        field: String,
        message: String,
    },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("CSV error: {message}")]
    Csv { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Persisted artifacts disagree with each other or with the dataset.
    #[error("Artifact mismatch: {message}")]
    ArtifactMismatch { message: String },
}

impl RecommenderError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        RecommenderError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn artifact_mismatch(message: impl Into<String>) -> Self {
        RecommenderError::ArtifactMismatch {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RecommenderError::NotFound { .. })
    }
}

impl From<std::io::Error> for RecommenderError {
    fn from(err: std::io::Error) -> Self {
        RecommenderError::Io {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for RecommenderError {
    fn from(err: csv::Error) -> Self {
        RecommenderError::Csv {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RecommenderError {
    fn from(err: serde_json::Error) -> Self {
        RecommenderError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<rmp_serde::encode::Error> for RecommenderError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        RecommenderError::Serialization {
            message: format!("MessagePack encode failed: {}", err),
        }
    }
}

impl From<rmp_serde::decode::Error> for RecommenderError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        RecommenderError::Serialization {
            message: format!("MessagePack decode failed: {}", err),
        }
    }
}

impl From<toml::de::Error> for RecommenderError {
    fn from(err: toml::de::Error) -> Self {
        RecommenderError::Config {
            message: format!("Invalid config file: {}", err),
        }
    }
}

/// Result type alias for recommender operations
pub type Result<T> = std::result::Result<T, RecommenderError>;
