//! Wall-clock access.
//!
//! Progress is computed from epoch milliseconds, streaks and todo expiry
//! from the local calendar date. Both come from one [`Clock`] so tests can
//! drive time by hand.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, TimeZone, Timelike, Utc};

pub trait Clock {
    /// Current local time, with the offset in effect at this instant.
    fn now_local(&self) -> DateTime<FixedOffset>;

    fn now_ms(&self) -> i64 {
        self.now_local().timestamp_millis()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.now_local().with_timezone(&Utc)
    }

    /// Local calendar date.
    fn today(&self) -> NaiveDate {
        self.now_local().date_naive()
    }

    /// Epoch milliseconds of local midnight that started today, assuming
    /// the current UTC offset held since then.
    fn start_of_today_ms(&self) -> i64 {
        midnight_at_current_offset(&self.now_local())
    }
}

fn midnight_at_current_offset(now: &DateTime<FixedOffset>) -> i64 {
    now.timestamp_millis()
        - i64::from(now.num_seconds_from_midnight()) * 1000
        - i64::from(now.timestamp_subsec_millis())
}

/// The real clock, in the machine's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    /// Uses the offset in effect at midnight, which differs from the current
    /// one on a daylight-saving transition day.
    fn start_of_today_ms(&self) -> i64 {
        let now = self.now_local();
        now.date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| Local.from_local_datetime(&midnight).earliest())
            .map(|midnight| midnight.timestamp_millis())
            .unwrap_or_else(|| midnight_at_current_offset(&now))
    }
}

/// Hand-driven clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch_ms: Arc<AtomicI64>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Clock frozen at `epoch_ms`, reporting local time in UTC.
    pub fn at_ms(epoch_ms: i64) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicI64::new(epoch_ms)),
            offset: Utc.fix(),
        }
    }

    /// Clock frozen at local midnight of `date` (UTC).
    pub fn at_date(date: NaiveDate) -> Self {
        let ms = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or_default();
        Self::at_ms(ms)
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn set_ms(&self, epoch_ms: i64) {
        self.epoch_ms.store(epoch_ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.epoch_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance_ms(secs * 1000);
    }

    pub fn advance_days(&self, days: i64) {
        self.advance_secs(days * 86_400);
    }
}

impl Clock for ManualClock {
    fn now_local(&self) -> DateTime<FixedOffset> {
        let ms = self.epoch_ms.load(Ordering::SeqCst);
        DateTime::from_timestamp_millis(ms)
            .unwrap_or_default()
            .with_timezone(&self.offset)
    }
}
