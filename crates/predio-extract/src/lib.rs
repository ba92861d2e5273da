//! Pattern-based extraction of structured filters from free-text
//! property queries.
//!
//! The extractor is a set of independent field recognizers (price, rooms,
//! area, location, property type, amenities) run over one folded copy of the
//! query; recognizing one field never blocks another. See
//! [`FilterExtractor`].

pub mod extractor;
pub mod lexicon;
pub mod price;

pub use extractor::FilterExtractor;
