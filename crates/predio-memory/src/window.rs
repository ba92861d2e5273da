//! Rolling conversation window.
//!
//! Turns accumulate in order until the session layer decides to collapse
//! the oldest segment into a single summary turn, or to hard-truncate it
//! when summarization is unavailable. The window itself is policy-free; the
//! thresholds live in `MemoryConfig` and are applied by the caller.

use crate::types::Turn;

/// Ordered turn buffer with collapse and truncation primitives.
#[derive(Debug, Clone, Default)]
pub struct ConversationWindow {
    turns: Vec<Turn>,
}

impl ConversationWindow {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a turn at the end of the window.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The turns older than the retained tail, oldest first. Empty when the
    /// window fits inside the tail.
    pub fn older_than(&self, tail: usize) -> &[Turn] {
        let cut = self.turns.len().saturating_sub(tail);
        &self.turns[..cut]
    }

    /// Replace everything older than the retained tail with one summary
    /// turn. The most recent `tail` turns survive verbatim.
    pub fn collapse(&mut self, summary: Turn, tail: usize) {
        let cut = self.turns.len().saturating_sub(tail);
        let kept = self.turns.split_off(cut);
        self.turns.clear();
        self.turns.push(summary);
        self.turns.extend(kept);
    }

    /// Drop everything older than the retained tail without summarizing.
    pub fn truncate_to_tail(&mut self, tail: usize) {
        let cut = self.turns.len().saturating_sub(tail);
        self.turns.drain(..cut);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TurnRole;

    fn window_of(n: usize) -> ConversationWindow {
        let mut window = ConversationWindow::new();
        for i in 0..n {
            window.push(Turn::new(TurnRole::User, format!("turno {i}")));
        }
        window
    }

    #[test]
    fn test_push_and_len() {
        let window = window_of(3);
        assert_eq!(window.len(), 3);
        assert!(!window.is_empty());
    }

    #[test]
    fn test_older_than_splits_at_tail() {
        let window = window_of(10);
        let old = window.older_than(4);
        assert_eq!(old.len(), 6);
        assert_eq!(old[0].content, "turno 0");
        assert_eq!(old[5].content, "turno 5");
    }

    #[test]
    fn test_older_than_short_window_is_empty() {
        let window = window_of(3);
        assert!(window.older_than(4).is_empty());
    }

    #[test]
    fn test_collapse_keeps_tail_verbatim() {
        let mut window = window_of(10);
        window.collapse(Turn::new(TurnRole::Summary, "resumen"), 4);
        assert_eq!(window.len(), 5);
        assert_eq!(window.turns()[0].role, TurnRole::Summary);
        assert_eq!(window.turns()[0].content, "resumen");
        assert_eq!(window.turns()[1].content, "turno 6");
        assert_eq!(window.turns()[4].content, "turno 9");
    }

    #[test]
    fn test_collapse_with_zero_tail() {
        let mut window = window_of(5);
        window.collapse(Turn::new(TurnRole::Summary, "resumen"), 0);
        assert_eq!(window.len(), 1);
        assert_eq!(window.turns()[0].role, TurnRole::Summary);
    }

    #[test]
    fn test_truncate_to_tail() {
        let mut window = window_of(10);
        window.truncate_to_tail(4);
        assert_eq!(window.len(), 4);
        assert_eq!(window.turns()[0].content, "turno 6");
        assert_eq!(window.turns()[3].content, "turno 9");
    }

    #[test]
    fn test_truncate_short_window_is_noop() {
        let mut window = window_of(2);
        window.truncate_to_tail(4);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut window = window_of(4);
        window.clear();
        assert!(window.is_empty());
    }
}
