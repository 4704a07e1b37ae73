//! The four persisted JSON blobs.
//!
//! Each blob lives under its own key and is read once at startup, written
//! after every relevant mutation. Reads never fail: a missing key yields the
//! default, and malformed content is logged and replaced by the default.
//! Writes are fire-and-forget; errors are logged, never returned.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::KeyValueStore;
use crate::history::{SessionHistoryEntry, SessionLedger, HISTORY_LIMIT};
use crate::mission_log::{LogEntry, MissionLog, Severity, LOG_LIMIT};
use crate::streak::Streak;
use crate::todo::{TodoItem, TodoList};

pub const CORE_STATE_KEY: &str = "astroFocusState";
pub const SESSIONS_KEY: &str = "astroFocusSessions";
pub const STREAK_KEY: &str = "astroFocusStreak";
pub const TODOS_KEY: &str = "astroFocusTodos";

const DATE_FORMAT: &str = "%Y-%m-%d";

// ── Lenient field readers ────────────────────────────────────────────

fn non_negative_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value
        .as_f64()
        .filter(|n| n.is_finite())
        .map(|n| n.max(0.0))
        .unwrap_or_default())
}

fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value
        .as_f64()
        .filter(|n| n.is_finite() && *n > 0.0)
        .map(|n| n.floor() as u64)
        .unwrap_or_default())
}

/// Non-arrays become empty; elements that fail to parse are skipped.
fn list<'de, D: Deserializer<'de>, T: DeserializeOwned>(d: D) -> Result<Vec<T>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn optional_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), DATE_FORMAT).ok()))
}

// ── Blob shapes ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLogEntry {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "className", default)]
    pub class_name: String,
}

impl From<&LogEntry> for StoredLogEntry {
    fn from(entry: &LogEntry) -> Self {
        Self {
            text: entry.text.clone(),
            class_name: entry.severity.class_name(),
        }
    }
}

impl From<StoredLogEntry> for LogEntry {
    fn from(stored: StoredLogEntry) -> Self {
        LogEntry::new(stored.text, Severity::from_class_name(&stored.class_name))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoreStateBlob {
    #[serde(default, deserialize_with = "non_negative_f64")]
    total_distance: f64,
    /// Oldest first.
    #[serde(default, deserialize_with = "list")]
    log_entries: Vec<StoredLogEntry>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionsBlob {
    #[serde(default, deserialize_with = "count")]
    total_sessions: u64,
    #[serde(default, deserialize_with = "list")]
    session_history: Vec<SessionHistoryEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreakBlob {
    #[serde(default, deserialize_with = "count")]
    current_streak: u64,
    #[serde(default, deserialize_with = "optional_date")]
    last_session_date: Option<NaiveDate>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StreakBlobOut {
    current_streak: u32,
    last_session_date: Option<String>,
}

/// Distance and mission log, as restored from storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreState {
    pub total_distance: f64,
    pub log: MissionLog,
}

// ── Read / write ─────────────────────────────────────────────────────

fn read_blob<S, T>(store: &S, key: &str) -> Option<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read persisted state, using defaults");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(key, error = %err, "malformed persisted state, using defaults");
            None
        }
    }
}

fn write_blob<S, T>(store: &mut S, key: &str, value: &T)
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(err) => {
            tracing::error!(key, error = %err, "failed to serialize state");
            return;
        }
    };
    if let Err(err) = store.set(key, &json) {
        tracing::error!(key, error = %err, "failed to persist state");
    }
}

/// `None` when nothing usable was stored.
pub fn load_core_state<S: KeyValueStore + ?Sized>(store: &S) -> Option<CoreState> {
    let blob: CoreStateBlob = read_blob(store, CORE_STATE_KEY)?;
    let newest_first = blob.log_entries.into_iter().rev().map(LogEntry::from);
    Some(CoreState {
        total_distance: blob.total_distance,
        log: MissionLog::from_newest_first(newest_first),
    })
}

pub fn save_core_state<S: KeyValueStore + ?Sized>(store: &mut S, total_distance: f64, log: &MissionLog) {
    let mut log_entries: Vec<StoredLogEntry> =
        log.iter().take(LOG_LIMIT).map(StoredLogEntry::from).collect();
    log_entries.reverse();
    write_blob(
        store,
        CORE_STATE_KEY,
        &CoreStateBlob {
            total_distance,
            log_entries,
        },
    );
}

pub fn load_sessions<S: KeyValueStore + ?Sized>(store: &S) -> SessionLedger {
    read_blob::<_, SessionsBlob>(store, SESSIONS_KEY)
        .map(|blob| SessionLedger::new(blob.total_sessions, blob.session_history))
        .unwrap_or_default()
}

pub fn save_sessions<S: KeyValueStore + ?Sized>(store: &mut S, ledger: &SessionLedger) {
    let history = ledger.history();
    write_blob(
        store,
        SESSIONS_KEY,
        &SessionsBlob {
            total_sessions: ledger.total_sessions(),
            session_history: history[..history.len().min(HISTORY_LIMIT)].to_vec(),
        },
    );
}

pub fn load_streak<S: KeyValueStore + ?Sized>(store: &S) -> Streak {
    read_blob::<_, StreakBlob>(store, STREAK_KEY)
        .map(|blob| {
            let current = u32::try_from(blob.current_streak).unwrap_or(u32::MAX);
            Streak::new(current, blob.last_session_date)
        })
        .unwrap_or_default()
}

pub fn save_streak<S: KeyValueStore + ?Sized>(store: &mut S, streak: &Streak) {
    write_blob(
        store,
        STREAK_KEY,
        &StreakBlobOut {
            current_streak: streak.current_streak,
            last_session_date: streak
                .last_session_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
        },
    );
}

pub fn load_todos<S: KeyValueStore + ?Sized>(store: &S) -> TodoList {
    read_blob::<_, Value>(store, TODOS_KEY)
        .and_then(|value| list::<_, TodoItem>(value).ok())
        .map(TodoList::new)
        .unwrap_or_default()
}

pub fn save_todos<S: KeyValueStore + ?Sized>(store: &mut S, todos: &TodoList) {
    write_blob(store, TODOS_KEY, &todos.items());
}
