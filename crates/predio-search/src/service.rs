//! Per-turn search orchestration over extraction, memory, and ranking.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use predio_core::config::{ExtractionConfig, SearchConfig};
use predio_core::types::{Filter, Property};
use predio_extract::FilterExtractor;
use predio_memory::{ConversationMemory, MemorySnapshot};
use predio_vector::SimilarityIndex;

use crate::error::SearchError;
use crate::inventory::PropertyCatalog;
use crate::ranking::RankingEngine;

/// Result of one search turn.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    /// Ranked listings, best first.
    pub properties: Vec<Property>,
    /// The effective filter after preference fill-in.
    pub applied: Filter,
    /// True when semantic scoring was skipped because the embedding backend
    /// failed or timed out. Filter results are still exact.
    pub degraded: bool,
}

/// Orchestrates one query turn.
///
/// A search extracts the filter, overlays the user's remembered preferences,
/// embeds the free-text remainder under a deadline, ranks the inventory, and
/// then writes the turn back into memory: the filter is absorbed into
/// preferences, returned ids join the shown history, and the search counter
/// bumps. Callers get repetition suppression and cross-turn constraint
/// memory without managing either.
pub struct SearchService {
    config: SearchConfig,
    extractor: FilterExtractor,
    catalog: Arc<PropertyCatalog>,
    index: Arc<SimilarityIndex>,
    ranking: RankingEngine,
    memory: Arc<ConversationMemory>,
}

impl SearchService {
    pub fn new(
        config: SearchConfig,
        extraction: ExtractionConfig,
        catalog: Arc<PropertyCatalog>,
        index: Arc<SimilarityIndex>,
        memory: Arc<ConversationMemory>,
    ) -> Self {
        let ranking = RankingEngine::new(config.clone(), Arc::clone(&index));
        Self {
            config,
            extractor: FilterExtractor::new(extraction),
            catalog,
            index,
            ranking,
            memory,
        }
    }

    /// Run one search turn for `user_id`.
    ///
    /// `limit` falls back to the configured default and is clamped to the
    /// configured maximum. An empty result list is a normal outcome. The
    /// only error source is the memory store; embedding trouble degrades
    /// the outcome instead of failing it.
    pub async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<SearchOutcome, SearchError> {
        let filter = self.extractor.extract(query);
        let preferences = self.memory.preferences(user_id).await?;
        let shown = self.memory.shown(user_id).await?;

        let mut degraded = false;
        let query_embedding = if filter.remainder.is_empty() {
            None
        } else {
            let deadline = Duration::from_secs(self.config.embed_timeout_secs);
            match tokio::time::timeout(deadline, self.index.embed(&filter.remainder)).await {
                Ok(Ok(embedding)) => Some(embedding),
                Ok(Err(e)) => {
                    warn!("Embedding failed, ranking on filters alone: {}", e);
                    degraded = true;
                    None
                }
                Err(_) => {
                    warn!(
                        timeout_secs = self.config.embed_timeout_secs,
                        "Embedding timed out, ranking on filters alone"
                    );
                    degraded = true;
                    None
                }
            }
        };

        let limit = self.ranking.resolve_limit(limit);
        let applied = filter.with_preferences(&preferences);
        let properties = self.ranking.rank(
            &filter,
            &preferences,
            &shown,
            self.catalog.all(),
            query_embedding.as_deref(),
            limit,
        );

        self.memory.update_preferences(user_id, &filter).await?;
        let ids: Vec<String> = properties.iter().map(|p| p.id.clone()).collect();
        self.memory.record_shown(user_id, &ids).await?;
        self.memory.log_search(user_id).await?;

        info!(
            user_id,
            results = properties.len(),
            degraded,
            "Search completed"
        );

        Ok(SearchOutcome {
            properties,
            applied,
            degraded,
        })
    }

    /// Look up one listing by id.
    pub fn get_by_id(&self, id: &str) -> Option<Property> {
        self.catalog.get(id).cloned()
    }

    /// Record a listing click for engagement metrics.
    pub async fn log_click(&self, user_id: &str, property_id: &str) -> Result<(), SearchError> {
        Ok(self.memory.log_click(user_id, property_id).await?)
    }

    /// Read-only export of a user's memory.
    pub async fn snapshot(&self, user_id: &str) -> Result<MemorySnapshot, SearchError> {
        Ok(self.memory.snapshot(user_id).await?)
    }

    /// Clear a user's conversational state.
    pub async fn reset(&self, user_id: &str) -> Result<(), SearchError> {
        Ok(self.memory.reset(user_id).await?)
    }
}
