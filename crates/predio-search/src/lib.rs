//! Search orchestration: inventory, ranking, and the per-turn service.
//!
//! `SearchService` ties the other crates together for one query turn. It
//! extracts a `Filter` from the raw text, overlays the user's remembered
//! preferences, embeds the free-text remainder (with a deadline), ranks the
//! inventory, and writes the turn's side effects back into conversation
//! memory. Embedding failures degrade to filter-only ranking instead of
//! failing the turn.

pub mod error;
pub mod inventory;
pub mod ranking;
pub mod service;

pub use error::SearchError;
pub use inventory::PropertyCatalog;
pub use ranking::RankingEngine;
pub use service::{SearchOutcome, SearchService};
