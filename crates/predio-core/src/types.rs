//! Shared domain types: inventory records, per-query filters, and the
//! cross-turn preference state merged from them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Coarse property classification used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    /// Apartment or studio unit.
    Apartment,
    /// Free-standing or row house.
    House,
    /// Anything the inventory does not classify further (lots, offices).
    Other,
}

/// One listing in the inventory.
///
/// Immutable after load: the catalog is read once at startup and never
/// mutated at runtime. `location` and `amenities` are stored pre-folded
/// (lower-case, accent-stripped) so filter comparison needs no re-folding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Unique inventory key.
    pub id: String,
    /// Listing headline, shown to users as-is.
    pub title: String,
    /// Asking price in COP, no minor units.
    pub price: u64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Built area in square meters.
    pub area: u32,
    /// Neighborhood, folded for matching.
    pub location: String,
    pub property_type: PropertyType,
    /// Canonical amenity tokens (`pool`, `gym`, ...), folded.
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    /// Embedding precomputed offline; empty when the inventory ships none.
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// Structured constraints extracted from a single query.
///
/// Every field is optional; an absent field imposes no constraint. Bound
/// ordering (`price_min <= price_max`) is enforced at extraction time, where
/// the first valid bound wins and a later conflicting bound is dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub bedrooms_min: Option<u32>,
    pub bathrooms_min: Option<u32>,
    pub area_min: Option<u32>,
    pub locations: BTreeSet<String>,
    pub property_types: BTreeSet<PropertyType>,
    pub amenities: BTreeSet<String>,
    /// Query text with all matched spans removed; semantic-scoring input.
    pub remainder: String,
}

impl Filter {
    /// True when no structured constraint was recognized.
    pub fn is_empty(&self) -> bool {
        self.price_min.is_none()
            && self.price_max.is_none()
            && self.bedrooms_min.is_none()
            && self.bathrooms_min.is_none()
            && self.area_min.is_none()
            && self.locations.is_empty()
            && self.property_types.is_empty()
            && self.amenities.is_empty()
    }

    /// Fill the fields this filter is silent on from stored preferences,
    /// yielding the effective filter the ranking engine actually applies.
    /// Fields the filter does carry always win over the stored value.
    pub fn with_preferences(&self, preferences: &UserPreferences) -> Filter {
        Filter {
            price_min: self.price_min.or(preferences.price_min),
            price_max: self.price_max.or(preferences.price_max),
            bedrooms_min: self.bedrooms_min.or(preferences.bedrooms_min),
            bathrooms_min: self.bathrooms_min.or(preferences.bathrooms_min),
            area_min: self.area_min.or(preferences.area_min),
            locations: if self.locations.is_empty() {
                preferences.locations.clone()
            } else {
                self.locations.clone()
            },
            property_types: if self.property_types.is_empty() {
                preferences.property_types.clone()
            } else {
                self.property_types.clone()
            },
            amenities: if self.amenities.is_empty() {
                preferences.amenities.clone()
            } else {
                self.amenities.clone()
            },
            remainder: self.remainder.clone(),
        }
    }
}

/// Constraints accumulated across a conversation, keyed by user id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub bedrooms_min: Option<u32>,
    pub bathrooms_min: Option<u32>,
    pub area_min: Option<u32>,
    pub locations: BTreeSet<String>,
    pub property_types: BTreeSet<PropertyType>,
    pub amenities: BTreeSet<String>,
}

impl UserPreferences {
    /// Merge a freshly extracted filter into the stored preferences.
    ///
    /// Scalar fields overwrite when the filter carries them (an explicit
    /// correction beats a stale preference). `amenities` and `locations`
    /// union, since those requests are additive across turns. A non-empty
    /// `property_types` set also overwrites: asking for houses after
    /// apartments is a correction, not an accumulation.
    pub fn absorb(&mut self, filter: &Filter) {
        if filter.price_min.is_some() {
            self.price_min = filter.price_min;
        }
        if filter.price_max.is_some() {
            self.price_max = filter.price_max;
        }
        if filter.bedrooms_min.is_some() {
            self.bedrooms_min = filter.bedrooms_min;
        }
        if filter.bathrooms_min.is_some() {
            self.bathrooms_min = filter.bathrooms_min;
        }
        if filter.area_min.is_some() {
            self.area_min = filter.area_min;
        }
        if !filter.property_types.is_empty() {
            self.property_types = filter.property_types.clone();
        }
        self.locations.extend(filter.locations.iter().cloned());
        self.amenities.extend(filter.amenities.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.price_min.is_none()
            && self.price_max.is_none()
            && self.bedrooms_min.is_none()
            && self.bathrooms_min.is_none()
            && self.area_min.is_none()
            && self.locations.is_empty()
            && self.property_types.is_empty()
            && self.amenities.is_empty()
    }
}
