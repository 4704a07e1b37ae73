//! Completed-session ledger: lifetime count plus the most recent entries.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Number of history entries kept; older ones are evicted.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionHistoryEntry {
    /// ISO-8601, UTC.
    pub timestamp: String,
    /// Million km credited for the session.
    pub distance: f64,
}

impl SessionHistoryEntry {
    pub fn new(at: DateTime<Utc>, distance: f64) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            distance,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionLedger {
    total_sessions: u64,
    /// Newest first.
    history: Vec<SessionHistoryEntry>,
}

impl SessionLedger {
    pub fn new(total_sessions: u64, mut history: Vec<SessionHistoryEntry>) -> Self {
        history.truncate(HISTORY_LIMIT);
        Self {
            total_sessions,
            history,
        }
    }

    pub fn total_sessions(&self) -> u64 {
        self.total_sessions
    }

    pub fn history(&self) -> &[SessionHistoryEntry] {
        &self.history
    }

    /// Count one more session and put its entry at the front.
    pub fn record(&mut self, entry: SessionHistoryEntry) {
        self.total_sessions = self.total_sessions.saturating_add(1);
        self.history.insert(0, entry);
        self.history.truncate(HISTORY_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_is_iso_8601() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let entry = SessionHistoryEntry::new(at, 1.5);
        assert_eq!(entry.timestamp, "2024-05-01T08:30:00.000Z");
    }

    #[test]
    fn keeps_fifty_newest_first() {
        let mut ledger = SessionLedger::default();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        for i in 0..51 {
            let at = start + chrono::Duration::minutes(i);
            ledger.record(SessionHistoryEntry::new(at, i as f64));
        }
        assert_eq!(ledger.total_sessions(), 51);
        assert_eq!(ledger.history().len(), HISTORY_LIMIT);
        assert_eq!(ledger.history()[0].distance, 50.0);
        assert_eq!(ledger.history()[49].distance, 1.0);
    }

    #[test]
    fn oversized_history_is_trimmed_on_construction() {
        let entries = (0..60)
            .map(|i| SessionHistoryEntry {
                timestamp: String::new(),
                distance: i as f64,
            })
            .collect();
        let ledger = SessionLedger::new(60, entries);
        assert_eq!(ledger.history().len(), HISTORY_LIMIT);
        assert_eq!(ledger.history()[0].distance, 0.0);
    }
}
