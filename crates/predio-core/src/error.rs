use thiserror::Error;

/// Top-level error type for the Predio system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates define
/// their own error types and implement `From<SubsystemError>` conversions so
/// that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PredioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Inventory error: {0}")]
    Inventory(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for PredioError {
    fn from(err: toml::de::Error) -> Self {
        PredioError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for PredioError {
    fn from(err: toml::ser::Error) -> Self {
        PredioError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PredioError {
    fn from(err: serde_json::Error) -> Self {
        PredioError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Predio operations.
pub type Result<T> = std::result::Result<T, PredioError>;
