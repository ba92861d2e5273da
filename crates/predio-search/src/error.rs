//! Error types for the search layer.

use predio_core::error::PredioError;
use predio_memory::MemoryError;

/// Errors from search orchestration.
///
/// Embedding failures never surface here: the service recovers them into a
/// degraded, filter-only outcome. What remains is memory-store access.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    #[error("inventory error: {0}")]
    Inventory(String),
}

impl From<PredioError> for SearchError {
    fn from(err: PredioError) -> Self {
        SearchError::Inventory(err.to_string())
    }
}
