//! Query recognizer turning free-form Spanish into a structured [`Filter`].
//!
//! Each recognizer runs independently over the folded query and records the
//! byte spans it consumed. Whatever no recognizer claimed becomes the
//! free-text remainder, which search later embeds for similarity ranking.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use predio_core::config::ExtractionConfig;
use predio_core::text::{collapse_whitespace, fold};
use predio_core::types::{Filter, PropertyType};

use crate::lexicon::{self, AMENITY_SYNONYMS, NEIGHBORHOODS, PROPERTY_TYPE_SYNONYMS};
use crate::price;

// Optional lower-bound phrasing in front of a count, consumed into the span
// so "minimo 3 habitaciones" leaves no residue in the remainder.
const MIN_QUALIFIER: &str = r"(?:(?:al\s+menos|por\s+lo\s+menos|minimo|mas\s+de|desde)\s+)?";

static BEDROOMS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b{MIN_QUALIFIER}(\d+)\s*(?:habitaciones|habitacion|hab|alcobas|alcoba|cuartos|cuarto|recamaras|recamara|dormitorios|dormitorio)\b"
    ))
    .expect("Invalid bedroom regex")
});

static BATHROOMS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b{MIN_QUALIFIER}(\d+)\s*(?:banos|bano)\b"))
        .expect("Invalid bathroom regex")
});

// "m²" ends on a non-word character, so the boundary sits per alternative.
static AREA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b{MIN_QUALIFIER}(\d+)\s*(?:metros\s+cuadrados\b|metros\b|mts\b|m2\b|m²)"
    ))
    .expect("Invalid area regex")
});

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = NEIGHBORHOODS
        .iter()
        .map(|name| name.replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("Invalid neighborhood regex")
});

static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = PROPERTY_TYPE_SYNONYMS
        .iter()
        .map(|(synonym, _)| *synonym)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("Invalid property type regex")
});

static AMENITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = AMENITY_SYNONYMS
        .iter()
        .map(|(synonym, _)| synonym.replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("Invalid amenity regex")
});

/// Recognizes structured constraints in listing queries.
///
/// The extractor is stateless apart from its configuration, so one instance
/// can serve every request.
#[derive(Debug, Clone, Default)]
pub struct FilterExtractor {
    config: ExtractionConfig,
}

impl FilterExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract every constraint the query states; the rest of the text
    /// becomes the free-text remainder.
    ///
    /// Extraction never fails. Fragments that look structured but do not
    /// parse are dropped from the remainder without producing a field.
    pub fn extract(&self, query: &str) -> Filter {
        let folded = fold(query);
        let mut spans: Vec<(usize, usize)> = Vec::new();

        let (price_min, price_max) = price::extract_price(&folded, &self.config, &mut spans);
        let bedrooms_min = extract_count(&folded, &BEDROOMS_RE, &mut spans);
        let bathrooms_min = extract_count(&folded, &BATHROOMS_RE, &mut spans);
        let area_min = extract_count(&folded, &AREA_RE, &mut spans);
        let locations = extract_locations(&folded, &mut spans);
        let property_types = extract_property_types(&folded, &mut spans);
        let amenities = extract_amenities(&folded, &mut spans);
        let remainder = strip_spans(&folded, spans);

        Filter {
            price_min,
            price_max,
            bedrooms_min,
            bathrooms_min,
            area_min,
            locations,
            property_types,
            amenities,
            remainder,
        }
    }
}

/// First parseable count wins; every recognized phrase leaves the remainder.
fn extract_count(folded: &str, re: &Regex, spans: &mut Vec<(usize, usize)>) -> Option<u32> {
    let mut value = None;
    for caps in re.captures_iter(folded) {
        let Some(whole) = caps.get(0) else { continue };
        spans.push((whole.start(), whole.end()));
        if value.is_none() {
            value = caps.get(1).and_then(|m| m.as_str().parse().ok());
        }
    }
    value
}

fn extract_locations(folded: &str, spans: &mut Vec<(usize, usize)>) -> BTreeSet<String> {
    let mut locations = BTreeSet::new();
    for found in LOCATION_RE.find_iter(folded) {
        spans.push((found.start(), found.end()));
        locations.insert(collapse_whitespace(found.as_str()));
    }
    locations
}

fn extract_property_types(folded: &str, spans: &mut Vec<(usize, usize)>) -> BTreeSet<PropertyType> {
    let mut types = BTreeSet::new();
    for found in TYPE_RE.find_iter(folded) {
        spans.push((found.start(), found.end()));
        let mapped = PROPERTY_TYPE_SYNONYMS
            .iter()
            .find(|(synonym, _)| *synonym == found.as_str())
            .map(|(_, property_type)| *property_type);
        if let Some(property_type) = mapped {
            types.insert(property_type);
        }
    }
    types
}

fn extract_amenities(folded: &str, spans: &mut Vec<(usize, usize)>) -> BTreeSet<String> {
    let mut amenities = BTreeSet::new();
    for found in AMENITY_RE.find_iter(folded) {
        spans.push((found.start(), found.end()));
        if let Some(canonical) = lexicon::canonical_amenity(&collapse_whitespace(found.as_str())) {
            amenities.insert(canonical.to_string());
        }
    }
    amenities
}

/// Remove every claimed span from the folded query, tolerating overlaps.
fn strip_spans(folded: &str, mut spans: Vec<(usize, usize)>) -> String {
    spans.sort_unstable();
    let mut remainder = String::with_capacity(folded.len());
    let mut cursor = 0;
    for (start, end) in spans {
        if start > cursor {
            remainder.push_str(&folded[cursor..start]);
        }
        cursor = cursor.max(end);
    }
    if cursor < folded.len() {
        remainder.push_str(&folded[cursor..]);
    }
    collapse_whitespace(&remainder)
}
