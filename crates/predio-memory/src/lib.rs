//! Predio Memory crate - per-user conversational state with bounded windows.
//!
//! Tracks preferences, shown-listing history, a rolling turn window, and
//! engagement metrics per user id. When the window passes its threshold the
//! oldest turns are collapsed into one synthetic summary turn through the
//! injected `CompletionService`; if that call fails or times out the window
//! is hard-truncated instead, so a conversation is never lost to a flaky
//! provider.

pub mod error;
pub mod session;
pub mod store;
pub mod summarizer;
pub mod types;
pub mod window;

pub use error::MemoryError;
pub use session::UserMemory;
pub use store::ConversationMemory;
pub use summarizer::{CompletionService, DynCompletionService, ExtractiveCompletion};
pub use types::{EngagementMetrics, MemorySnapshot, MemoryState, Turn, TurnRole};
pub use window::ConversationWindow;
