//! Flat similarity index over precomputed property embeddings.
//!
//! Brute-force cosine scoring over rows kept in insertion order. At
//! inventory scale (low thousands of listings) a linear scan is faster to
//! build and debug than an approximate-nearest-neighbor structure. The
//! index is read-only after construction, so it carries no locks.

use std::collections::HashMap;

use tracing::info;

use predio_core::error::PredioError;
use predio_core::types::Property;

use crate::embedding::DynEmbeddingService;

/// Cosine scorer over the inventory, plus the injected embedding backend
/// used to vectorize query text.
pub struct SimilarityIndex {
    embedder: Box<dyn DynEmbeddingService>,
    ids: Vec<String>,
    vectors: Vec<Vec<f32>>,
    positions: HashMap<String, usize>,
}

impl SimilarityIndex {
    /// Create an empty index around an embedding backend.
    pub fn new(embedder: Box<dyn DynEmbeddingService>) -> Self {
        Self {
            embedder,
            ids: Vec::new(),
            vectors: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Build an index with one row per property, in input order.
    pub fn from_properties(
        embedder: Box<dyn DynEmbeddingService>,
        properties: &[Property],
    ) -> Self {
        let mut index = Self::new(embedder);
        for property in properties {
            index.insert(&property.id, property.embedding.clone());
        }
        info!(
            rows = index.len(),
            dimensions = index.dimensions(),
            "Built similarity index"
        );
        index
    }

    /// Insert a row, replacing any existing row with the same id.
    pub fn insert(&mut self, id: &str, embedding: Vec<f32>) {
        match self.positions.get(id) {
            Some(&pos) => self.vectors[pos] = embedding,
            None => {
                self.positions.insert(id.to_string(), self.ids.len());
                self.ids.push(id.to_string());
                self.vectors.push(embedding);
            }
        }
    }

    /// Embed query text through the injected backend.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, PredioError> {
        self.embedder.embed_boxed(text).await
    }

    /// Cosine similarity between the query vector and the row stored for
    /// `id`, clamped to `[0, 1]`.
    ///
    /// Unknown ids, degenerate (zero-norm) vectors, and dimension mismatches
    /// all score 0 rather than erroring: a row that cannot be compared
    /// simply contributes nothing to the semantic score.
    pub fn score(&self, query: &[f32], id: &str) -> f64 {
        let Some(&pos) = self.positions.get(id) else {
            return 0.0;
        };
        cosine_similarity(query, &self.vectors[pos]).clamp(0.0, 1.0)
    }

    /// Return the dimensionality of the embedding backend.
    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }

    /// Return the number of rows currently stored.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Return true if the index contains no rows.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl std::fmt::Debug for SimilarityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityIndex")
            .field("rows", &self.ids.len())
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude or the lengths disagree.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();

    let mag_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}
