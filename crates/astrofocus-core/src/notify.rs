//! "Time's up" notification seam.
//!
//! The engine only reports completion as an event. Whoever hosts it decides
//! how loudly to tell the user.

pub const TIME_UP_TITLE: &str = "Time's up!";
pub const TIME_UP_BODY: &str = "Focus session complete. Great focus!";

pub trait Notifier {
    fn time_up(&self);
}

/// Drops notifications (notifications disabled).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn time_up(&self) {}
}

/// Reports through `tracing` only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn time_up(&self) {
        tracing::info!(title = TIME_UP_TITLE, body = TIME_UP_BODY, "session notification");
    }
}
