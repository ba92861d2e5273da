//! Per-user memory: preferences, shown history, the rolling window, and the
//! summarization trigger.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use predio_core::config::MemoryConfig;
use predio_core::types::{Filter, UserPreferences};

use crate::summarizer::{build_summary_prompt, DynCompletionService};
use crate::types::{EngagementMetrics, MemorySnapshot, MemoryState, Turn, TurnRole};
use crate::window::ConversationWindow;

/// Everything remembered about one user.
///
/// Mutation happens under the per-user lock owned by the store; methods
/// here assume exclusive access.
#[derive(Debug)]
pub struct UserMemory {
    user_id: String,
    state: MemoryState,
    preferences: UserPreferences,
    shown: Vec<String>,
    window: ConversationWindow,
    metrics: EngagementMetrics,
}

impl UserMemory {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: MemoryState::Fresh,
            preferences: UserPreferences::default(),
            shown: Vec::new(),
            window: ConversationWindow::new(),
            metrics: EngagementMetrics::default(),
        }
    }

    /// Append a turn, update the counters, and collapse the window once it
    /// reaches the configured interval.
    ///
    /// Never fails: a broken or slow completion provider degrades to hard
    /// truncation, logged at warn level.
    pub async fn record_turn(
        &mut self,
        role: TurnRole,
        content: &str,
        config: &MemoryConfig,
        completion: &dyn DynCompletionService,
    ) {
        let turn = Turn::new(role, content);
        self.metrics.message_count += 1;
        self.metrics.token_estimate_total += turn.token_estimate;
        self.metrics.last_activity_at = turn.created_at;
        self.window.push(turn);
        self.state = MemoryState::Active;

        if self.window.len() >= config.summary_interval && self.window.len() > config.summary_tail
        {
            self.summarize(config, completion).await;
        }
    }

    async fn summarize(&mut self, config: &MemoryConfig, completion: &dyn DynCompletionService) {
        self.state = MemoryState::Summarizing;
        let tail = config.summary_tail;
        let prompt = build_summary_prompt(self.window.older_than(tail));
        let deadline = Duration::from_secs(config.complete_timeout_secs);

        match tokio::time::timeout(deadline, completion.complete_boxed(&prompt)).await {
            Ok(Ok(summary)) => {
                self.window
                    .collapse(Turn::new(TurnRole::Summary, summary), tail);
                debug!(
                    user_id = %self.user_id,
                    window = self.window.len(),
                    "Collapsed old turns into a summary"
                );
            }
            Ok(Err(e)) => {
                warn!(
                    user_id = %self.user_id,
                    error = %e,
                    "Summarization failed, hard-truncating window"
                );
                self.window.truncate_to_tail(tail);
            }
            Err(_) => {
                warn!(
                    user_id = %self.user_id,
                    timeout_secs = config.complete_timeout_secs,
                    "Summarization timed out, hard-truncating window"
                );
                self.window.truncate_to_tail(tail);
            }
        }

        self.state = MemoryState::Active;
    }

    /// Merge a query's filter into the stored preferences.
    pub fn update_preferences(&mut self, filter: &Filter) {
        self.preferences.absorb(filter);
    }

    /// Record shown ids in presentation order, skipping ids seen before.
    /// Oldest entries are evicted beyond `max_shown`.
    pub fn record_shown(&mut self, ids: &[String], max_shown: usize) {
        for id in ids {
            if !self.shown.iter().any(|seen| seen == id) {
                self.shown.push(id.clone());
            }
        }
        let excess = self.shown.len().saturating_sub(max_shown);
        if excess > 0 {
            self.shown.drain(..excess);
        }
    }

    pub fn log_search(&mut self) {
        self.metrics.search_count += 1;
        self.metrics.last_activity_at = Utc::now().timestamp();
    }

    pub fn log_click(&mut self) {
        self.metrics.property_clicks += 1;
        self.metrics.last_activity_at = Utc::now().timestamp();
    }

    /// Clear everything back to the fresh state.
    pub fn reset(&mut self) {
        self.state = MemoryState::Fresh;
        self.preferences = UserPreferences::default();
        self.shown.clear();
        self.window.clear();
        self.metrics = EngagementMetrics::default();
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            preferences: self.preferences.clone(),
            shown_ids: self.shown.clone(),
            window: self.window.turns().to_vec(),
            metrics: self.metrics.clone(),
            state: self.state,
        }
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    pub fn shown(&self) -> &[String] {
        &self.shown
    }

    pub fn state(&self) -> MemoryState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use predio_core::error::PredioError;

    use super::*;
    use crate::summarizer::{CompletionService, ExtractiveCompletion};

    struct FailingCompletion;

    impl CompletionService for FailingCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String, PredioError> {
            Err(PredioError::Completion("provider offline".to_string()))
        }
    }

    struct HangingCompletion;

    impl CompletionService for HangingCompletion {
        async fn complete(&self, _prompt: &str) -> Result<String, PredioError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(String::new())
        }
    }

    fn config() -> MemoryConfig {
        MemoryConfig {
            summary_interval: 6,
            summary_tail: 2,
            max_shown: 5,
            complete_timeout_secs: 5,
        }
    }

    fn filter_with_bedrooms(n: u32) -> Filter {
        Filter {
            bedrooms_min: Some(n),
            ..Filter::default()
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    // ---- Turn recording ----

    #[tokio::test]
    async fn test_record_turn_fresh_to_active() {
        let mut memory = UserMemory::new("u1");
        assert_eq!(memory.state(), MemoryState::Fresh);

        memory
            .record_turn(
                TurnRole::User,
                "busco apartamento",
                &config(),
                &ExtractiveCompletion::default(),
            )
            .await;

        assert_eq!(memory.state(), MemoryState::Active);
        assert_eq!(memory.snapshot().window.len(), 1);
        assert_eq!(memory.snapshot().metrics.message_count, 1);
        assert!(memory.snapshot().metrics.token_estimate_total > 0);
    }

    // ---- Summarization ----

    #[tokio::test]
    async fn test_summarization_collapses_window() {
        let mut memory = UserMemory::new("u1");
        let cfg = config();
        let completion = ExtractiveCompletion::default();

        for i in 0..6 {
            memory
                .record_turn(TurnRole::User, &format!("turno numero {i}"), &cfg, &completion)
                .await;
        }

        let window = memory.snapshot().window;
        assert_eq!(window.len(), cfg.summary_tail + 1);
        assert_eq!(window[0].role, TurnRole::Summary);
        assert_eq!(window[1].content, "turno numero 4");
        assert_eq!(window[2].content, "turno numero 5");
        assert_eq!(memory.state(), MemoryState::Active);
    }

    #[tokio::test]
    async fn test_summarization_failure_truncates() {
        let mut memory = UserMemory::new("u1");
        let cfg = config();

        for i in 0..6 {
            memory
                .record_turn(TurnRole::User, &format!("turno {i}"), &cfg, &FailingCompletion)
                .await;
        }

        let window = memory.snapshot().window;
        assert_eq!(window.len(), cfg.summary_tail);
        assert!(window.iter().all(|t| t.role != TurnRole::Summary));
        assert_eq!(window[0].content, "turno 4");
        assert_eq!(window[1].content, "turno 5");
        assert_eq!(memory.state(), MemoryState::Active);
    }

    #[tokio::test]
    async fn test_summarization_timeout_truncates() {
        let mut memory = UserMemory::new("u1");
        let cfg = MemoryConfig {
            complete_timeout_secs: 0,
            ..config()
        };

        for i in 0..6 {
            memory
                .record_turn(TurnRole::User, &format!("turno {i}"), &cfg, &HangingCompletion)
                .await;
        }

        let window = memory.snapshot().window;
        assert_eq!(window.len(), cfg.summary_tail);
        assert_eq!(memory.state(), MemoryState::Active);
    }

    #[tokio::test]
    async fn test_window_stays_bounded_over_long_sessions() {
        let mut memory = UserMemory::new("u1");
        let cfg = config();
        let completion = ExtractiveCompletion::default();

        for i in 0..30 {
            memory
                .record_turn(TurnRole::User, &format!("mensaje {i}"), &cfg, &completion)
                .await;
            assert!(memory.snapshot().window.len() <= cfg.summary_interval);
        }
        assert_eq!(memory.snapshot().metrics.message_count, 30);
    }

    // ---- Preferences ----

    #[test]
    fn test_update_preferences_scalar_overwrites() {
        let mut memory = UserMemory::new("u1");
        memory.update_preferences(&filter_with_bedrooms(2));
        memory.update_preferences(&filter_with_bedrooms(3));
        assert_eq!(memory.preferences().bedrooms_min, Some(3));
    }

    #[test]
    fn test_update_preferences_amenities_union() {
        let mut memory = UserMemory::new("u1");
        let mut first = Filter::default();
        first.amenities.insert("pool".to_string());
        let mut second = Filter::default();
        second.amenities.insert("gym".to_string());

        memory.update_preferences(&first);
        memory.update_preferences(&second);

        let expected: BTreeSet<String> =
            ["pool".to_string(), "gym".to_string()].into_iter().collect();
        assert_eq!(memory.preferences().amenities, expected);
    }

    // ---- Shown history ----

    #[test]
    fn test_record_shown_dedups() {
        let mut memory = UserMemory::new("u1");
        memory.record_shown(&ids(&["a", "b"]), 5);
        memory.record_shown(&ids(&["b", "c"]), 5);
        assert_eq!(memory.shown(), ids(&["a", "b", "c"]).as_slice());
    }

    #[test]
    fn test_record_shown_evicts_oldest() {
        let mut memory = UserMemory::new("u1");
        memory.record_shown(&ids(&["a", "b", "c", "d", "e", "f", "g"]), 5);
        assert_eq!(memory.shown(), ids(&["c", "d", "e", "f", "g"]).as_slice());
    }

    // ---- Metrics ----

    #[test]
    fn test_engagement_counters() {
        let mut memory = UserMemory::new("u1");
        memory.log_search();
        memory.log_search();
        memory.log_click();
        let metrics = memory.snapshot().metrics;
        assert_eq!(metrics.search_count, 2);
        assert_eq!(metrics.property_clicks, 1);
        assert!(metrics.last_activity_at > 0);
    }

    // ---- Reset ----

    #[tokio::test]
    async fn test_reset_returns_fresh() {
        let mut memory = UserMemory::new("u1");
        memory
            .record_turn(
                TurnRole::User,
                "busco casa",
                &config(),
                &ExtractiveCompletion::default(),
            )
            .await;
        memory.update_preferences(&filter_with_bedrooms(2));
        memory.record_shown(&ids(&["a"]), 5);
        memory.log_search();

        memory.reset();

        let snapshot = memory.snapshot();
        assert_eq!(snapshot.state, MemoryState::Fresh);
        assert!(snapshot.preferences.is_empty());
        assert!(snapshot.shown_ids.is_empty());
        assert!(snapshot.window.is_empty());
        assert_eq!(snapshot.metrics, EngagementMetrics::default());
    }
}
