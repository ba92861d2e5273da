//! Error types for conversation memory.

use predio_core::error::PredioError;

/// Errors from the conversation memory store.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("registry lock poisoned: {0}")]
    LockPoisoned(String),
    #[error("completion error: {0}")]
    Completion(String),
}

impl From<PredioError> for MemoryError {
    fn from(err: PredioError) -> Self {
        MemoryError::Completion(err.to_string())
    }
}
