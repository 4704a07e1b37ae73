use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::streak::StreakChange;

/// Lifecycle phase of the focus session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Running,
    /// Completed; the reward waits for a rating.
    AwaitingRating,
}

/// Why a start request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartRejection {
    PendingRating,
    AlreadyRunning,
}

/// Every state change in the engine produces an Event.
/// The presentation layer renders them; nothing in the core reacts to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        mission: String,
        duration_secs: u64,
        /// Absolute epoch ms at which the session completes.
        deadline_epoch_ms: i64,
        at: DateTime<Utc>,
    },
    StartRejected {
        reason: StartRejection,
        at: DateTime<Utc>,
    },
    Progress {
        progress_secs: u64,
        duration_secs: u64,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
    /// The timer reached its duration; a rating is now required.
    SessionCompleted {
        code: String,
        base_distance: f64,
        at: DateTime<Utc>,
    },
    /// The reward was credited.
    SessionFinalized {
        code: String,
        rating: u8,
        distance: f64,
        total_distance: f64,
        total_sessions: u64,
        at: DateTime<Utc>,
    },
    MilestoneReached {
        distance: f64,
        message: String,
        at: DateTime<Utc>,
    },
    StreakUpdated {
        current_streak: u32,
        change: StreakChange,
        at: DateTime<Utc>,
    },
    SessionAborted {
        source: String,
        cause: String,
        penalty: f64,
        total_distance: f64,
        /// A completed session lost before it was rated.
        discarded_code: Option<String>,
        at: DateTime<Utc>,
    },
    DurationChanged {
        duration_secs: u64,
        /// A running session was cancelled by the change.
        cancelled_run: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: SessionPhase,
        mission: String,
        progress_secs: u64,
        duration_secs: u64,
        progress_pct: f64,
        remaining_minutes: Option<u64>,
        total_distance: f64,
        total_sessions: u64,
        current_streak: u32,
        streak_display: String,
        milestone: String,
        pending_code: Option<String>,
        at: DateTime<Utc>,
    },
}
