//! Predio Vector crate - embedding capability trait and the similarity index.
//!
//! Provides the `EmbeddingService` trait behind which a real sentence
//! encoder is injected, a deterministic mock implementation for tests and
//! the demo binary, and a flat cosine-similarity index over the precomputed
//! inventory embeddings.

pub mod embedding;
pub mod index;

pub use embedding::{DynEmbeddingService, EmbeddingService, MockEmbedding};
pub use index::SimilarityIndex;
