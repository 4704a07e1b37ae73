//! Background deadline watch.
//!
//! Polls the wall clock against an absolute deadline and signals exactly once
//! when it has passed. It never touches engine state: the receiver decides
//! what "deadline reached" means (normally an immediate engine tick).

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;

use super::ticker::TaskHandle;

/// Two polls a second.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeadlineMessage {
    end_time: serde_json::Value,
}

/// Parse a `{ "endTime": <epoch ms> }` configuration message.
///
/// Anything malformed yields `None` and is meant to be ignored.
pub fn parse_deadline_message(raw: &str) -> Option<i64> {
    let message: DeadlineMessage = serde_json::from_str(raw).ok()?;
    let end_time = message.end_time.as_f64()?;
    end_time.is_finite().then_some(end_time as i64)
}

fn wall_clock_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub struct DeadlineWatch;

impl DeadlineWatch {
    /// Send `message` once `now >= deadline_epoch_ms`, then stop.
    pub fn spawn<T>(
        deadline_epoch_ms: i64,
        poll: Duration,
        tx: UnboundedSender<T>,
        message: T,
    ) -> TaskHandle
    where
        T: Send + 'static,
    {
        Self::spawn_with_clock(deadline_epoch_ms, poll, wall_clock_ms, tx, message)
    }

    /// Like [`DeadlineWatch::spawn`], with the raw message contract.
    pub fn spawn_from_message<T>(
        raw: &str,
        poll: Duration,
        tx: UnboundedSender<T>,
        message: T,
    ) -> Option<TaskHandle>
    where
        T: Send + 'static,
    {
        let deadline = parse_deadline_message(raw)?;
        Some(Self::spawn(deadline, poll, tx, message))
    }

    pub fn spawn_with_clock<T, F>(
        deadline_epoch_ms: i64,
        poll: Duration,
        now_ms: F,
        tx: UnboundedSender<T>,
        message: T,
    ) -> TaskHandle
    where
        T: Send + 'static,
        F: Fn() -> i64 + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll);
            loop {
                interval.tick().await;
                if now_ms() >= deadline_epoch_ms {
                    tracing::debug!(deadline_epoch_ms, "deadline reached");
                    if tx.send(message).is_err() {
                        tracing::debug!(deadline_epoch_ms, "deadline receiver already gone");
                    }
                    break;
                }
            }
        });
        TaskHandle::new(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    #[test]
    fn parses_numeric_end_time() {
        assert_eq!(parse_deadline_message(r#"{"endTime": 1700000000000}"#), Some(1_700_000_000_000));
        assert_eq!(parse_deadline_message(r#"{"endTime": 12.9}"#), Some(12));
    }

    #[test]
    fn ignores_malformed_messages() {
        assert_eq!(parse_deadline_message("not json"), None);
        assert_eq!(parse_deadline_message(r#"{"endTime": "soon"}"#), None);
        assert_eq!(parse_deadline_message(r#"{"other": 1}"#), None);
    }

    #[tokio::test(start_paused = true)]
    async fn signals_exactly_once_after_deadline() {
        let now = Arc::new(AtomicI64::new(0));
        let clock = now.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let watch = DeadlineWatch::spawn_with_clock(
            2_000,
            Duration::from_millis(500),
            move || clock.load(Ordering::SeqCst),
            tx,
            "time_up",
        );

        tokio::time::sleep(Duration::from_millis(1_200)).await;
        assert!(rx.try_recv().is_err());

        now.store(2_000, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(rx.try_recv().ok(), Some("time_up"));

        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert!(rx.try_recv().is_err());
        assert!(watch.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_watch_never_signals() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let watch = DeadlineWatch::spawn_with_clock(
            1_000,
            Duration::from_millis(500),
            || 5_000,
            tx,
            (),
        );
        watch.cancel();
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn finishes_when_receiver_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let watch = DeadlineWatch::spawn_with_clock(
            1_000,
            Duration::from_millis(500),
            || 5_000,
            tx,
            (),
        );
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert!(watch.is_finished());
    }

    #[tokio::test]
    async fn malformed_message_spawns_nothing() {
        let (tx, _rx) = mpsc::unbounded_channel::<()>();
        assert!(DeadlineWatch::spawn_from_message("{}", DEFAULT_POLL_INTERVAL, tx, ()).is_none());
    }
}
