//! Periodic callbacks as cancelable tokio tasks.
//!
//! Each concern (progress tick, decryption stream, deadline watch) gets its
//! own [`TaskHandle`]. Handles abort their task when cancelled or dropped,
//! so a reset session can never be touched by an orphaned tick.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Owner of a spawned background task.
#[derive(Debug)]
pub struct TaskHandle {
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Sends `message` to `tx` every `period` until cancelled or the receiver
/// goes away. The first message is sent after one full period.
pub struct Ticker;

impl Ticker {
    pub fn spawn<T>(period: Duration, tx: UnboundedSender<T>, message: T) -> TaskHandle
    where
        T: Clone + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(message.clone()).is_err() {
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
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn ticks_until_cancelled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let ticker = Ticker::spawn(Duration::from_millis(500), tx, "tick");

        tokio::time::sleep(Duration::from_millis(1_600)).await;
        let mut seen = 0;
        while rx.try_recv().is_ok() {
            seen += 1;
        }
        assert_eq!(seen, 3);

        ticker.cancel();
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        drop(Ticker::spawn(Duration::from_millis(100), tx, ()));
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert!(rx.try_recv().is_err());
    }
}
