//! The operator-facing mission log.
//!
//! This is domain data shown to the user and persisted with the core state,
//! not a diagnostics channel (that goes through `tracing`).

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Maximum number of log entries kept.
pub const LOG_LIMIT: usize = 50;

const CLASS_PREFIX: &str = "log-entry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
    #[default]
    None,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::None => "",
        }
    }

    /// Stored class attribute, e.g. `"log-entry warning"`.
    pub fn class_name(self) -> String {
        format!("{CLASS_PREFIX} {}", self.as_str())
    }

    /// Inverse of [`Severity::class_name`]; unknown classes map to `None`.
    pub fn from_class_name(class_name: &str) -> Self {
        class_name
            .split_whitespace()
            .find_map(|token| match token {
                "info" => Some(Severity::Info),
                "success" => Some(Severity::Success),
                "warning" => Some(Severity::Warning),
                "error" => Some(Severity::Error),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub text: String,
    pub severity: Severity,
}

impl LogEntry {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        Self {
            text: text.into(),
            severity,
        }
    }
}

/// Newest-first, bounded log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissionLog {
    entries: VecDeque<LogEntry>,
}

impl MissionLog {
    /// Build from entries ordered newest first.
    pub fn from_newest_first(entries: impl IntoIterator<Item = LogEntry>) -> Self {
        Self {
            entries: entries.into_iter().take(LOG_LIMIT).collect(),
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(LOG_LIMIT);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Newest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter()
    }
}
