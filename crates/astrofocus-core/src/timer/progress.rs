//! Wall-clock progress tracking.
//!
//! The tracker does not run a thread. The caller invokes [`ProgressTracker::update`]
//! periodically (twice a second is plenty) and progress is recomputed from
//! the start timestamp, so a late or skipped tick never loses time.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default focus session length (25 minutes).
pub const DEFAULT_FOCUS_DURATION_SECS: u64 = 1500;
/// Longest accepted session: the deadline must fit in epoch milliseconds.
pub const MAX_FOCUS_DURATION_SECS: u64 = i64::MAX as u64 / 1000;

/// Result of one progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub progress_secs: u64,
    pub changed: bool,
    pub complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTracker {
    duration_secs: u64,
    progress_secs: u64,
    running: bool,
    /// Epoch ms the current run is measured from.
    start_epoch_ms: Option<i64>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(DEFAULT_FOCUS_DURATION_SECS)
    }
}

impl ProgressTracker {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration_secs: duration_secs.clamp(1, MAX_FOCUS_DURATION_SECS),
            progress_secs: 0,
            running: false,
            start_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn progress_secs(&self) -> u64 {
        self.progress_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start_epoch_ms(&self) -> Option<i64> {
        self.start_epoch_ms
    }

    /// 0.0 ..= 100.0
    pub fn progress_pct(&self) -> f64 {
        let duration = self.duration_secs.max(1) as f64;
        (self.progress_secs as f64 / duration * 100.0).min(100.0)
    }

    /// Whole minutes left, rounded up. `None` unless running.
    pub fn remaining_minutes(&self) -> Option<u64> {
        if !self.running {
            return None;
        }
        let remaining = self.duration_secs.saturating_sub(self.progress_secs);
        Some(remaining.div_ceil(60))
    }

    /// Absolute epoch ms at which the current run reaches its duration.
    pub fn deadline_epoch_ms(&self) -> Option<i64> {
        let start = self.start_epoch_ms.filter(|_| self.running)?;
        Some(start.saturating_add(secs_to_ms(self.duration_secs)))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin or resume a run. Returns `false` if already running.
    pub fn start(&mut self, now_ms: i64) -> bool {
        if self.running {
            return false;
        }
        self.start_epoch_ms = Some(match self.start_epoch_ms {
            None => now_ms,
            Some(_) => now_ms.saturating_sub(secs_to_ms(self.progress_secs)),
        });
        self.running = true;
        true
    }

    /// Recompute progress from the wall clock.
    pub fn update(&mut self, now_ms: i64) -> ProgressUpdate {
        let previous = self.progress_secs;
        if let (true, Some(start)) = (self.running, self.start_epoch_ms) {
            let elapsed_secs = (now_ms.saturating_sub(start).max(0) / 1000) as u64;
            // Never move backwards, even if the wall clock does.
            self.progress_secs = previous.max(elapsed_secs);
        }
        ProgressUpdate {
            progress_secs: self.progress_secs,
            changed: self.progress_secs != previous,
            complete: self.running && self.progress_secs >= self.duration_secs.max(1),
        }
    }

    /// Stop and rewind to zero.
    pub fn reset(&mut self) {
        self.running = false;
        self.progress_secs = 0;
        self.start_epoch_ms = None;
    }

    /// Change the session length. Always resets the current run.
    pub fn set_duration(&mut self, duration_secs: u64) -> Result<(), ValidationError> {
        if !(1..=MAX_FOCUS_DURATION_SECS).contains(&duration_secs) {
            return Err(ValidationError::InvalidDuration(duration_secs.to_string()));
        }
        self.duration_secs = duration_secs;
        self.reset();
        Ok(())
    }
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| secs.checked_mul(1000))
        .unwrap_or(i64::MAX)
}

/// Parse user-entered duration text into seconds.
pub fn parse_focus_duration(raw: &str) -> Result<u64, ValidationError> {
    let trimmed = raw.trim();
    match trimmed.parse::<u64>() {
        Ok(secs) if (1..=MAX_FOCUS_DURATION_SECS).contains(&secs) => Ok(secs),
        _ => Err(ValidationError::InvalidDuration(trimmed.to_string())),
    }
}
