//! Turn, lifecycle state, metrics, and snapshot types for per-user memory.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use predio_core::text::estimate_tokens;
use predio_core::types::UserPreferences;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// End-user message.
    User,
    /// Agent reply.
    Assistant,
    /// Synthetic turn produced by collapsing older turns.
    Summary,
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub role: TurnRole,
    pub content: String,
    /// Epoch seconds.
    pub created_at: i64,
    pub token_estimate: usize,
}

impl Turn {
    /// Build a turn stamped now, with its token estimate precomputed.
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        let content = content.into();
        let token_estimate = estimate_tokens(&content);
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            created_at: Utc::now().timestamp(),
            token_estimate,
        }
    }
}

/// Lifecycle of one user's memory.
///
/// `Fresh` until the first turn, `Active` while recording, `Summarizing`
/// only inside the window collapse. Sessions never end on their own; an
/// external reset returns them to `Fresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryState {
    #[default]
    Fresh,
    Active,
    Summarizing,
}

/// Per-user engagement counters. Increment-only; cleared by reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub message_count: u64,
    pub search_count: u64,
    pub property_clicks: u64,
    pub token_estimate_total: usize,
    /// Epoch seconds of the most recent activity, 0 before any.
    pub last_activity_at: i64,
}

/// Read-only export of one user's memory, consumed by dashboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub preferences: UserPreferences,
    pub shown_ids: Vec<String>,
    pub window: Vec<Turn>,
    pub metrics: EngagementMetrics,
    pub state: MemoryState,
}
