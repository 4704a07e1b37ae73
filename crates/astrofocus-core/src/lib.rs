//! # AstroFocus Core Library
//!
//! This library provides the core game logic for AstroFocus, a focus timer
//! dressed up as a deep-space decryption mission. All operations are
//! available through the standalone `astrofocus` CLI, which is a thin layer
//! over this crate.
//!
//! ## Architecture
//!
//! - **Engine**: A wall-clock-based session controller that requires the
//!   caller to periodically invoke `tick()` for progress updates
//! - **Rewards**: Distance per session, scaled by a 1-5 rating, with milestone
//!   announcements and an intrusion penalty
//! - **Storage**: JSON blobs in a SQLite key-value table, TOML configuration
//! - **Timer tasks**: tokio tickers and a deadline watcher for hosts that run
//!   an event loop
//!
//! ## Key Components
//!
//! - [`FocusEngine`]: Session state machine and persistence
//! - [`Database`]: Durable key-value store
//! - [`Config`]: Application configuration management
//! - [`Event`]: Everything the engine reports to the presentation layer

pub mod ambient;
pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod milestone;
pub mod mission_log;
pub mod notify;
pub mod reward;
pub mod storage;
pub mod streak;
pub mod timer;
pub mod todo;

pub use ambient::{AmbientChatter, DecryptionStream};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{EngineOptions, FocusEngine, IntrusionReport};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{Event, SessionPhase, StartRejection};
pub use history::{SessionHistoryEntry, SessionLedger};
pub use milestone::{Milestone, MilestoneTracker, MILESTONES};
pub use mission_log::{LogEntry, MissionLog, Severity};
pub use notify::{LogNotifier, Notifier, NullNotifier};
pub use reward::{PendingSession, Rating};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use streak::{Streak, StreakChange};
pub use timer::{DeadlineWatch, ProgressTracker, TaskHandle, Ticker};
pub use todo::{TodoItem, TodoList};
