//! Two-stage ranking: hard constraint filtering, then weighted soft scores.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use predio_core::config::SearchConfig;
use predio_core::types::{Filter, Property, UserPreferences};
use predio_vector::SimilarityIndex;

/// Ranks the inventory against the effective filter for one query turn.
///
/// Stage one drops every listing that violates a present bound. Stage two
/// orders the survivors by semantic similarity plus a boost for requested
/// locations, minus a penalty for listings the user has already seen. The
/// sort is stable, so equal scores keep input order and repeated calls over
/// the same inputs produce the same sequence. Constraints are never relaxed
/// here; an empty result is the caller's signal to renegotiate.
#[derive(Debug)]
pub struct RankingEngine {
    config: SearchConfig,
    index: Arc<SimilarityIndex>,
}

impl RankingEngine {
    pub fn new(config: SearchConfig, index: Arc<SimilarityIndex>) -> Self {
        Self { config, index }
    }

    /// Resolve a caller-supplied limit against the configured bounds.
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.config.default_limit)
            .min(self.config.max_limit)
    }

    /// Rank `properties` for a query.
    ///
    /// The filter is overlaid on the stored preferences before anything is
    /// eliminated, so constraints remembered from earlier turns keep
    /// applying until the current query overrides them. `query_embedding`
    /// is `None` when the embedding backend failed or the query had no free
    /// text; ranking then runs on filter signals alone.
    pub fn rank(
        &self,
        filter: &Filter,
        preferences: &UserPreferences,
        shown: &[String],
        properties: &[Property],
        query_embedding: Option<&[f32]>,
        limit: usize,
    ) -> Vec<Property> {
        let effective = filter.with_preferences(preferences);
        let shown: HashSet<&str> = shown.iter().map(String::as_str).collect();

        let mut scored: Vec<(f64, &Property)> = properties
            .iter()
            .filter(|property| passes(&effective, property))
            .map(|property| {
                (
                    self.score_property(property, &effective, query_embedding, &shown),
                    property,
                )
            })
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        debug!(
            candidates = properties.len(),
            survivors = scored.len(),
            limit,
            "Ranked inventory"
        );

        scored
            .into_iter()
            .take(limit)
            .map(|(_, property)| property.clone())
            .collect()
    }

    fn score_property(
        &self,
        property: &Property,
        effective: &Filter,
        query_embedding: Option<&[f32]>,
        shown: &HashSet<&str>,
    ) -> f64 {
        let mut score = match query_embedding {
            Some(embedding) => self.index.score(embedding, &property.id),
            None => 0.0,
        };
        if effective.locations.contains(&property.location) {
            score += self.config.location_boost;
        }
        if shown.contains(property.id.as_str()) {
            score -= self.config.shown_penalty;
        }
        score
    }
}

/// True when the property satisfies every present bound of the filter.
/// An absent field imposes no constraint.
fn passes(filter: &Filter, property: &Property) -> bool {
    if let Some(min) = filter.price_min {
        if property.price < min {
            return false;
        }
    }
    if let Some(max) = filter.price_max {
        if property.price > max {
            return false;
        }
    }
    if let Some(min) = filter.bedrooms_min {
        if property.bedrooms < min {
            return false;
        }
    }
    if let Some(min) = filter.bathrooms_min {
        if property.bathrooms < min {
            return false;
        }
    }
    if let Some(min) = filter.area_min {
        if property.area < min {
            return false;
        }
    }
    if !filter.locations.is_empty() && !filter.locations.contains(&property.location) {
        return false;
    }
    if !filter.property_types.is_empty()
        && !filter.property_types.contains(&property.property_type)
    {
        return false;
    }
    filter
        .amenities
        .iter()
        .all(|amenity| property.amenities.contains(amenity))
}
