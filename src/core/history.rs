//! Record of committed transitions.
//!
//! The engine appends one [`TransitionRecord`] each time an action succeeds
//! and the state changes. Only the most recent `limit` records are kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of records an engine keeps.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// A single committed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Identifier of the state that was left
    pub from: String,
    /// Identifier of the event that triggered the transition
    pub event: String,
    /// Identifier of the state that was entered
    pub to: String,
    /// When the new state was committed
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    pub fn now(from: &str, event: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            event: event.to_string(),
            to: to.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Bounded, ordered history of committed transitions.
///
/// # Example
///
/// ```rust
/// use statelane::core::{StateHistory, TransitionRecord};
///
/// let mut history = StateHistory::with_limit(8);
/// history.record(TransitionRecord::now("off", "switch", "on"));
/// history.record(TransitionRecord::now("on", "switch", "off"));
///
/// assert_eq!(history.get_path(), vec!["off", "on", "off"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory {
    records: VecDeque<TransitionRecord>,
    limit: usize,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHistory {
    /// Create an empty history holding up to [`DEFAULT_HISTORY_LIMIT`] records.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create an empty history holding up to `limit` records.
    /// A limit of zero disables recording.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit,
        }
    }

    /// Append a record, evicting the oldest one once the limit is reached.
    pub fn record(&mut self, record: TransitionRecord) {
        if self.limit == 0 {
            return;
        }
        if self.records.len() == self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// State identifiers traversed by the retained records: the `from` of the
    /// oldest record followed by the `to` of every record.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from.as_str());
        }
        path.extend(self.records.iter().map(|r| r.to.as_str()));
        path
    }

    /// Time between the oldest and the newest retained record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TransitionRecord> + '_ {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_history_is_empty() {
        let history = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert_eq!(history.limit(), DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let mut history = StateHistory::new();
        history.record(TransitionRecord::now("idle", "start", "running"));
        history.record(TransitionRecord::now("running", "finish", "done"));

        assert_eq!(history.get_path(), vec!["idle", "running", "done"]);
        assert_eq!(history.last().unwrap().event, "finish");
    }

    #[test]
    fn oldest_records_are_evicted() {
        let mut history = StateHistory::with_limit(2);
        history.record(TransitionRecord::now("a", "next", "b"));
        history.record(TransitionRecord::now("b", "next", "c"));
        history.record(TransitionRecord::now("c", "next", "d"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.get_path(), vec!["b", "c", "d"]);
    }

    #[test]
    fn zero_limit_records_nothing() {
        let mut history = StateHistory::with_limit(0);
        history.record(TransitionRecord::now("a", "next", "b"));
        assert!(history.is_empty());
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let mut history = StateHistory::new();
        history.record(TransitionRecord::now("a", "next", "b"));
        std::thread::sleep(std::time::Duration::from_millis(10));
        history.record(TransitionRecord::now("b", "next", "c"));

        assert!(history.duration().unwrap() >= Duration::from_millis(10));
    }

    #[test]
    fn single_record_has_zero_duration() {
        let mut history = StateHistory::new();
        history.record(TransitionRecord::now("a", "next", "b"));
        assert_eq!(history.duration(), Some(Duration::from_secs(0)));
    }

    #[test]
    fn history_serializes_correctly() {
        let mut history = StateHistory::with_limit(4);
        history.record(TransitionRecord::now("off", "switch", "on"));

        let json = serde_json::to_string(&history).unwrap();
        let back: StateHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(back.len(), 1);
        assert_eq!(back.limit(), 4);
        assert_eq!(back.last(), history.last());
    }
}
