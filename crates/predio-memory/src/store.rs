//! Keyed memory store with per-user locking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use predio_core::config::MemoryConfig;
use predio_core::types::{Filter, UserPreferences};

use crate::error::MemoryError;
use crate::session::UserMemory;
use crate::summarizer::DynCompletionService;
use crate::types::{MemorySnapshot, TurnRole};

/// Per-user conversation memory registry.
///
/// The outer map is guarded by a plain mutex held only long enough to clone
/// a per-user handle. Each user's state sits behind its own async mutex, so
/// requests for the same user serialize (including across the awaited
/// summarization call) while different users proceed independently.
pub struct ConversationMemory {
    config: MemoryConfig,
    completion: Box<dyn DynCompletionService>,
    users: Mutex<HashMap<String, Arc<tokio::sync::Mutex<UserMemory>>>>,
}

impl ConversationMemory {
    pub fn new(config: MemoryConfig, completion: Box<dyn DynCompletionService>) -> Self {
        Self {
            config,
            completion,
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Clone the handle for `user_id`, creating fresh state on first touch.
    fn user(&self, user_id: &str) -> Result<Arc<tokio::sync::Mutex<UserMemory>>, MemoryError> {
        let mut users = self
            .users
            .lock()
            .map_err(|e| MemoryError::LockPoisoned(e.to_string()))?;
        let handle = users
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(UserMemory::new(user_id))));
        Ok(Arc::clone(handle))
    }

    /// Append a turn to the user's window, summarizing when due.
    pub async fn record_turn(
        &self,
        user_id: &str,
        role: TurnRole,
        content: &str,
    ) -> Result<(), MemoryError> {
        let handle = self.user(user_id)?;
        let mut memory = handle.lock().await;
        memory
            .record_turn(role, content, &self.config, self.completion.as_ref())
            .await;
        Ok(())
    }

    /// Merge a query's filter into the user's stored preferences.
    pub async fn update_preferences(
        &self,
        user_id: &str,
        filter: &Filter,
    ) -> Result<(), MemoryError> {
        let handle = self.user(user_id)?;
        handle.lock().await.update_preferences(filter);
        Ok(())
    }

    /// Record listing ids shown to the user.
    pub async fn record_shown(&self, user_id: &str, ids: &[String]) -> Result<(), MemoryError> {
        let handle = self.user(user_id)?;
        handle.lock().await.record_shown(ids, self.config.max_shown);
        Ok(())
    }

    /// Bump the user's search counter.
    pub async fn log_search(&self, user_id: &str) -> Result<(), MemoryError> {
        let handle = self.user(user_id)?;
        handle.lock().await.log_search();
        Ok(())
    }

    /// Bump the user's click counter.
    pub async fn log_click(&self, user_id: &str, property_id: &str) -> Result<(), MemoryError> {
        debug!(user_id, property_id, "Property click");
        let handle = self.user(user_id)?;
        handle.lock().await.log_click();
        Ok(())
    }

    /// The user's accumulated preferences.
    pub async fn preferences(&self, user_id: &str) -> Result<UserPreferences, MemoryError> {
        let handle = self.user(user_id)?;
        let memory = handle.lock().await;
        Ok(memory.preferences().clone())
    }

    /// The listing ids already shown to the user, oldest first.
    pub async fn shown(&self, user_id: &str) -> Result<Vec<String>, MemoryError> {
        let handle = self.user(user_id)?;
        let memory = handle.lock().await;
        Ok(memory.shown().to_vec())
    }

    /// Read-only export of the user's memory.
    pub async fn snapshot(&self, user_id: &str) -> Result<MemorySnapshot, MemoryError> {
        let handle = self.user(user_id)?;
        let memory = handle.lock().await;
        Ok(memory.snapshot())
    }

    /// Clear the user's memory back to the fresh state.
    pub async fn reset(&self, user_id: &str) -> Result<(), MemoryError> {
        let handle = self.user(user_id)?;
        handle.lock().await.reset();
        info!(user_id, "Reset user memory");
        Ok(())
    }
}
