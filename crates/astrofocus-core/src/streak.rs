//! Consecutive-day streak.
//!
//! Day deltas are whole calendar days between local dates, never elapsed
//! hours. Completing a session keeps a floor of 1; restoring state after a
//! gap of more than one day clears the streak entirely.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    /// First ever completion.
    Started,
    /// Completion on the day after the last one.
    Extended,
    /// Another completion on the same day.
    Unchanged,
    /// Completion after a gap; back to day 1.
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current_streak: u32,
    pub last_session_date: Option<NaiveDate>,
}

impl Streak {
    pub fn new(current_streak: u32, last_session_date: Option<NaiveDate>) -> Self {
        Self {
            current_streak,
            last_session_date,
        }
    }

    fn days_since_last(&self, today: NaiveDate) -> Option<i64> {
        self.last_session_date
            .map(|last| today.signed_duration_since(last).num_days())
    }

    /// Book a completed session on `today`.
    pub fn record_completion(&mut self, today: NaiveDate) -> StreakChange {
        match self.days_since_last(today) {
            None => {
                self.current_streak = 1;
                self.last_session_date = Some(today);
                StreakChange::Started
            }
            // A clock that moved backwards counts as the same day.
            Some(diff) if diff <= 0 => {
                self.current_streak = self.current_streak.max(1);
                StreakChange::Unchanged
            }
            Some(1) => {
                self.current_streak = self.current_streak.saturating_add(1);
                self.last_session_date = Some(today);
                StreakChange::Extended
            }
            Some(_) => {
                self.current_streak = 1;
                self.last_session_date = Some(today);
                StreakChange::Reset
            }
        }
    }

    /// Drop a streak that lapsed while the app was closed.
    ///
    /// Returns `true` when the streak was cleared.
    pub fn expire_if_lapsed(&mut self, today: NaiveDate) -> bool {
        match self.days_since_last(today) {
            Some(diff) if diff > 1 => {
                self.current_streak = 0;
                self.last_session_date = None;
                true
            }
            _ => false,
        }
    }

    /// `"1 day"`, `"4 days"`.
    pub fn display(&self) -> String {
        let plural = if self.current_streak == 1 { "" } else { "s" };
        format!("{} day{plural}", self.current_streak)
    }
}
