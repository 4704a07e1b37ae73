mod deadline;
mod progress;
mod ticker;

pub use deadline::{parse_deadline_message, DeadlineWatch, DEFAULT_POLL_INTERVAL};
pub use progress::{
    parse_focus_duration, ProgressTracker, ProgressUpdate, DEFAULT_FOCUS_DURATION_SECS,
    MAX_FOCUS_DURATION_SECS,
};
pub use ticker::{TaskHandle, Ticker};
