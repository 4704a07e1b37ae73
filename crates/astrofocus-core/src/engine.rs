//! Focus session engine.
//!
//! One controller owns the whole game state: timer progress, the pending
//! reward, distance totals, session ledger, streak, milestone guard, mission
//! log and todo list. Every mutation goes through a method here, which
//! returns the [`Event`]s it produced and persists the blobs it touched.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> AwaitingRating -> Idle
//!            \-> Idle (abort)
//! ```
//!
//! The engine has no thread. The host calls [`FocusEngine::tick`]
//! periodically while a session runs.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ambient::AmbientChatter;
use crate::clock::{Clock, SystemClock};
use crate::error::ValidationError;
use crate::events::{Event, SessionPhase, StartRejection};
use crate::history::{SessionHistoryEntry, SessionLedger};
use crate::milestone::{Milestone, MilestoneTracker, MILESTONES};
use crate::mission_log::{LogEntry, MissionLog, Severity};
use crate::reward::{intrusion_penalty, PendingSession, Rating};
use crate::storage::{
    load_core_state, load_sessions, load_streak, load_todos, save_core_state, save_sessions,
    save_streak, save_todos, Config, KeyValueStore,
};
use crate::streak::{Streak, StreakChange};
use crate::timer::{parse_focus_duration, ProgressTracker, DEFAULT_FOCUS_DURATION_SECS};
use crate::todo::{TodoItem, TodoList};

const UNASSIGNED_MISSION: &str = "Awaiting assignment";

/// Construction-time settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub focus_duration_secs: u64,
    /// When false there is no rating step: completion finalizes at 3.
    pub require_rating: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            focus_duration_secs: DEFAULT_FOCUS_DURATION_SECS,
            require_rating: true,
        }
    }
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        Self {
            focus_duration_secs: config.session.focus_duration_secs,
            require_rating: config.session.require_rating,
        }
    }
}

/// What the operator reported when a session was interrupted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrusionReport {
    pub source: String,
    pub cause: String,
}

impl IntrusionReport {
    pub fn new(source: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            cause: cause.into(),
        }
    }
}

pub struct FocusEngine<S, C = SystemClock> {
    store: S,
    clock: C,
    rng: StdRng,
    require_rating: bool,
    timer: ProgressTracker,
    pending: Option<PendingSession>,
    total_distance: f64,
    ledger: SessionLedger,
    streak: Streak,
    milestones: MilestoneTracker,
    log: MissionLog,
    todos: TodoList,
    mission: String,
    chatter: AmbientChatter,
}

impl<S: KeyValueStore, C: Clock> FocusEngine<S, C> {
    /// Restore every persisted blob from `store` and run the load-time
    /// housekeeping (lapsed streak, expired todos).
    pub fn load(store: S, clock: C, options: EngineOptions) -> Self {
        let core = load_core_state(&store);
        let ledger = load_sessions(&store);
        let streak = load_streak(&store);
        let todos = load_todos(&store);
        let restored = core.is_some();
        let core = core.unwrap_or_default();

        let mut engine = Self {
            store,
            clock,
            rng: StdRng::from_entropy(),
            require_rating: options.require_rating,
            timer: ProgressTracker::new(options.focus_duration_secs),
            pending: None,
            total_distance: core.total_distance,
            ledger,
            streak,
            milestones: MilestoneTracker::new(MILESTONES, core.total_distance),
            log: core.log,
            todos,
            mission: String::new(),
            chatter: AmbientChatter::default(),
        };

        if engine.streak.expire_if_lapsed(engine.clock.today()) {
            tracing::info!("streak lapsed while away, cleared");
            save_streak(&mut engine.store, &engine.streak);
        }
        engine.purge_expired_todos();
        if restored {
            engine.push_log("Mission Control reconnected. Systems nominal.", Severity::Info);
        }
        engine
    }

    /// Use a fixed random seed (decryption codes, ambient chatter).
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        if self.pending.is_some() {
            SessionPhase::AwaitingRating
        } else if self.timer.is_running() {
            SessionPhase::Running
        } else {
            SessionPhase::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn timer(&self) -> &ProgressTracker {
        &self.timer
    }

    pub fn focus_duration_secs(&self) -> u64 {
        self.timer.duration_secs()
    }

    pub fn progress_secs(&self) -> u64 {
        self.timer.progress_secs()
    }

    pub fn pending(&self) -> Option<&PendingSession> {
        self.pending.as_ref()
    }

    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    pub fn total_sessions(&self) -> u64 {
        self.ledger.total_sessions()
    }

    pub fn history(&self) -> &[SessionHistoryEntry] {
        self.ledger.history()
    }

    pub fn streak(&self) -> &Streak {
        &self.streak
    }

    /// Highest milestone reached so far.
    pub fn current_milestone(&self) -> Option<&'static Milestone> {
        self.milestones.current(self.total_distance)
    }

    pub fn log(&self) -> &MissionLog {
        &self.log
    }

    pub fn todos(&self) -> &[TodoItem] {
        self.todos.items()
    }

    pub fn mission(&self) -> &str {
        &self.mission
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase(),
            mission: if self.mission.is_empty() {
                UNASSIGNED_MISSION.to_string()
            } else {
                self.mission.clone()
            },
            progress_secs: self.timer.progress_secs(),
            duration_secs: self.timer.duration_secs(),
            progress_pct: self.timer.progress_pct(),
            remaining_minutes: self.timer.remaining_minutes(),
            total_distance: self.total_distance,
            total_sessions: self.ledger.total_sessions(),
            current_streak: self.streak.current_streak,
            streak_display: self.streak.display(),
            milestone: self
                .current_milestone()
                .map(|m| m.message.to_string())
                .unwrap_or_default(),
            pending_code: self.pending.as_ref().map(|p| p.code.clone()),
            at: self.clock.now_utc(),
        }
    }

    // ── Session commands ─────────────────────────────────────────────

    pub fn set_mission(&mut self, name: &str) -> Result<(), ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyText {
                field: "mission name",
            });
        }
        self.mission = name.to_string();
        Ok(())
    }

    /// Begin the decryption sequence.
    ///
    /// Refused while a rating is pending (with an advisory log line) and
    /// while already running.
    pub fn start(&mut self) -> Event {
        let at = self.clock.now_utc();
        if self.pending.is_some() {
            self.push_log(
                "Finalize the pending mission rating before initiating a new session.",
                Severity::Warning,
            );
            self.save_core();
            return Event::StartRejected {
                reason: StartRejection::PendingRating,
                at,
            };
        }
        if !self.timer.start(self.clock.now_ms()) {
            return Event::StartRejected {
                reason: StartRejection::AlreadyRunning,
                at,
            };
        }

        tracing::debug!(duration_secs = self.timer.duration_secs(), "session started");
        self.push_log("INITIATING DECRYPTION SEQUENCE...", Severity::Success);
        self.push_log(
            "Focus mode activated. All non-essential systems offline.",
            Severity::Info,
        );
        self.save_core();
        Event::SessionStarted {
            mission: self.mission.clone(),
            duration_secs: self.timer.duration_secs(),
            deadline_epoch_ms: self.timer.deadline_epoch_ms().unwrap_or_default(),
            at,
        }
    }

    /// Call periodically while running. Recomputes progress, rolls for
    /// ambient chatter, completes the session once the duration is reached,
    /// then persists.
    pub fn tick(&mut self) -> Vec<Event> {
        if !self.timer.is_running() {
            return Vec::new();
        }
        let now = self.clock.now_ms();
        let update = self.timer.update(now);
        let mut events = Vec::new();

        if update.changed {
            events.push(Event::Progress {
                progress_secs: update.progress_secs,
                duration_secs: self.timer.duration_secs(),
                progress_pct: self.timer.progress_pct(),
                at: self.clock.now_utc(),
            });
        }

        let chatter = self.chatter.roll(now, &mut self.rng);
        if let Some(entry) = &chatter {
            self.push_log(&entry.text, entry.severity);
        }

        if update.complete {
            events.extend(self.complete());
        } else if update.changed || chatter.is_some() {
            self.save_core();
        }
        events
    }

    fn complete(&mut self) -> Vec<Event> {
        let duration = self.timer.duration_secs();
        self.timer.reset();
        let pending = PendingSession::new(&mut self.rng, duration);
        tracing::debug!(code = %pending.code, base_distance = pending.base_distance, "session completed");
        self.push_log("Session complete. Awaiting performance rating...", Severity::Info);

        let mut events = vec![Event::SessionCompleted {
            code: pending.code.clone(),
            base_distance: pending.base_distance,
            at: self.clock.now_utc(),
        }];
        self.pending = Some(pending);

        if self.require_rating {
            self.save_core();
        } else {
            events.extend(self.finalize(Rating::NEUTRAL));
        }
        events
    }

    /// Rate the pending session (1-5) and credit its reward.
    ///
    /// Without a pending session this is a no-op.
    pub fn submit_rating(&mut self, rating: i64) -> Result<Vec<Event>, ValidationError> {
        let rating = Rating::new(rating)?;
        Ok(self.finalize(rating))
    }

    fn finalize(&mut self, rating: Rating) -> Vec<Event> {
        let Some(pending) = self.pending.take() else {
            return Vec::new();
        };
        let at = self.clock.now_utc();
        let distance = pending.adjusted_distance(rating);
        self.total_distance += distance;
        self.ledger.record(SessionHistoryEntry::new(at, distance));

        let mut events = Vec::new();

        let change = self.streak.record_completion(self.clock.today());
        match change {
            StreakChange::Started => self.push_log(
                "Streak initiated! Day 1 of your focus journey.",
                Severity::Success,
            ),
            StreakChange::Extended => {
                let message = format!(
                    "Streak extended! Day {} of consecutive focus.",
                    self.streak.current_streak
                );
                self.push_log(&message, Severity::Success);
            }
            StreakChange::Reset => {
                self.push_log("Streak reset. Starting fresh with day 1.", Severity::Warning)
            }
            StreakChange::Unchanged => {}
        }
        events.push(Event::StreakUpdated {
            current_streak: self.streak.current_streak,
            change,
            at,
        });

        let message = format!(
            "Decryption success! Rating {}/5 yielded +{distance:.2} M km. Code: {}",
            rating.value(),
            pending.code
        );
        self.push_log(&message, Severity::Success);
        events.push(Event::SessionFinalized {
            code: pending.code,
            rating: rating.value(),
            distance,
            total_distance: self.total_distance,
            total_sessions: self.ledger.total_sessions(),
            at,
        });

        if let Some(milestone) = self.milestones.check(self.total_distance, distance) {
            self.push_log(
                &format!("MILESTONE REACHED: {}", milestone.message),
                Severity::Warning,
            );
            events.push(Event::MilestoneReached {
                distance: milestone.distance,
                message: milestone.message.to_string(),
                at,
            });
        }

        save_streak(&mut self.store, &self.streak);
        save_sessions(&mut self.store, &self.ledger);
        self.save_core();
        events
    }

    /// Intrusion: cancel the run, drop any unrated session and take 10% of
    /// the total distance.
    pub fn abort(&mut self, report: &IntrusionReport) -> Vec<Event> {
        let at = self.clock.now_utc();
        self.push_log(
            &format!(
                "INTRUSION DETECTED! Source: {} - {}",
                report.source, report.cause
            ),
            Severity::Error,
        );

        self.timer.reset();
        let discarded_code = self.pending.take().map(|p| p.code);

        let penalty = intrusion_penalty(self.total_distance);
        if penalty > 0.0 {
            self.total_distance = (self.total_distance - penalty).max(0.0);
            self.milestones.rebase(self.total_distance);
            self.push_log(
                &format!("Security breach penalty applied: -{penalty:.2} M km."),
                Severity::Warning,
            );
        }
        tracing::debug!(penalty, total_distance = self.total_distance, "session aborted");
        self.save_core();

        vec![Event::SessionAborted {
            source: report.source.clone(),
            cause: report.cause.clone(),
            penalty,
            total_distance: self.total_distance,
            discarded_code,
            at,
        }]
    }

    /// Change the session length. Any run in progress is cancelled and its
    /// progress discarded.
    pub fn set_focus_duration(&mut self, duration_secs: u64) -> Result<Event, ValidationError> {
        let was_running = self.timer.is_running();
        self.timer.set_duration(duration_secs)?;
        Ok(Event::DurationChanged {
            duration_secs,
            cancelled_run: was_running,
            at: self.clock.now_utc(),
        })
    }

    /// [`FocusEngine::set_focus_duration`] from raw user text.
    pub fn set_focus_duration_text(&mut self, raw: &str) -> Result<Event, ValidationError> {
        let duration_secs = parse_focus_duration(raw)?;
        self.set_focus_duration(duration_secs)
    }

    // ── Todo commands ────────────────────────────────────────────────

    pub fn add_todo(&mut self, text: &str) -> Result<TodoItem, ValidationError> {
        let item = self.todos.add(text, self.clock.now_ms())?.clone();
        save_todos(&mut self.store, &self.todos);
        Ok(item)
    }

    /// Returns `false` for an unknown id.
    pub fn toggle_todo(&mut self, id: &str) -> bool {
        let found = self.todos.toggle(id);
        if found {
            save_todos(&mut self.store, &self.todos);
        }
        found
    }

    /// Returns `false` for an unknown id.
    pub fn delete_todo(&mut self, id: &str) -> bool {
        let found = self.todos.delete(id);
        if found {
            save_todos(&mut self.store, &self.todos);
        }
        found
    }

    /// Drop todos created before local midnight. Returns how many went.
    pub fn purge_expired_todos(&mut self) -> usize {
        let purged = self.todos.purge_before(self.clock.start_of_today_ms());
        if purged > 0 {
            tracing::debug!(purged, "expired todos removed");
            save_todos(&mut self.store, &self.todos);
        }
        purged
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn push_log(&mut self, message: &str, severity: Severity) {
        let stamp = self.clock.now_local().format("%H:%M:%S");
        self.log
            .push(LogEntry::new(format!("> {stamp} - {message}"), severity));
    }

    fn save_core(&mut self) {
        save_core_state(&mut self.store, self.total_distance, &self.log);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStore;

    fn engine(duration: u64) -> (FocusEngine<MemoryStore, ManualClock>, ManualClock) {
        let clock = ManualClock::at_ms(1_700_000_000_000);
        let options = EngineOptions {
            focus_duration_secs: duration,
            require_rating: true,
        };
        let engine = FocusEngine::load(MemoryStore::new(), clock.clone(), options).with_seed(9);
        (engine, clock)
    }

    fn run_to_completion(engine: &mut FocusEngine<MemoryStore, ManualClock>, clock: &ManualClock) {
        assert!(matches!(engine.start(), Event::SessionStarted { .. }));
        clock.advance_secs(engine.focus_duration_secs() as i64);
        engine.tick();
    }

    #[test]
    fn start_tick_complete() {
        let (mut engine, clock) = engine(3);
        assert_eq!(engine.phase(), SessionPhase::Idle);
        engine.start();
        assert_eq!(engine.phase(), SessionPhase::Running);

        clock.advance_ms(1_200);
        let events = engine.tick();
        assert!(matches!(events[..], [Event::Progress { progress_secs: 1, .. }]));

        clock.advance_ms(1_900);
        let events = engine.tick();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::SessionCompleted { .. })));
        assert_eq!(engine.phase(), SessionPhase::AwaitingRating);
        assert_eq!(engine.progress_secs(), 0);
        assert!((engine.pending().unwrap().base_distance - 0.003).abs() < 1e-12);
    }

    #[test]
    fn tick_while_idle_does_nothing() {
        let (mut engine, clock) = engine(3);
        clock.advance_secs(10);
        assert!(engine.tick().is_empty());
    }

    #[test]
    fn second_start_is_rejected() {
        let (mut engine, _clock) = engine(60);
        engine.start();
        assert!(matches!(
            engine.start(),
            Event::StartRejected {
                reason: StartRejection::AlreadyRunning,
                ..
            }
        ));
    }

    #[test]
    fn start_while_pending_is_rejected_without_changes() {
        let (mut engine, clock) = engine(5);
        run_to_completion(&mut engine, &clock);
        let duration = engine.focus_duration_secs();
        let code = engine.pending().unwrap().code.clone();

        let event = engine.start();
        assert!(matches!(
            event,
            Event::StartRejected {
                reason: StartRejection::PendingRating,
                ..
            }
        ));
        assert_eq!(engine.phase(), SessionPhase::AwaitingRating);
        assert_eq!(engine.focus_duration_secs(), duration);
        assert_eq!(engine.progress_secs(), 0);
        assert_eq!(engine.pending().unwrap().code, code);
        assert_eq!(engine.log().latest().unwrap().severity, Severity::Warning);
    }

    #[test]
    fn rating_scales_reward() {
        let (mut engine, clock) = engine(1500);
        run_to_completion(&mut engine, &clock);
        let events = engine.submit_rating(5).unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::SessionFinalized { rating: 5, total_sessions: 1, .. }
        )));
        assert!((engine.total_distance() - 2.5).abs() < 1e-12);
        assert_eq!(engine.total_sessions(), 1);
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.streak().current_streak, 1);
        assert_eq!(engine.phase(), SessionPhase::Idle);
    }

    #[test]
    fn invalid_rating_keeps_pending_session() {
        let (mut engine, clock) = engine(10);
        run_to_completion(&mut engine, &clock);
        assert_eq!(engine.submit_rating(0), Err(ValidationError::InvalidRating(0)));
        assert_eq!(engine.submit_rating(6), Err(ValidationError::InvalidRating(6)));
        assert!(engine.pending().is_some());
        assert_eq!(engine.total_sessions(), 0);
    }

    #[test]
    fn rating_without_pending_is_a_no_op() {
        let (mut engine, _clock) = engine(10);
        assert_eq!(engine.submit_rating(3), Ok(Vec::new()));
        assert_eq!(engine.total_sessions(), 0);
    }

    #[test]
    fn no_rating_step_finalizes_at_neutral() {
        let clock = ManualClock::at_ms(0);
        let options = EngineOptions {
            focus_duration_secs: 1500,
            require_rating: false,
        };
        let mut engine = FocusEngine::load(MemoryStore::new(), clock.clone(), options);
        run_to_completion(&mut engine, &clock);
        assert_eq!(engine.phase(), SessionPhase::Idle);
        assert_eq!(engine.total_distance(), 1.5);
    }

    #[test]
    fn abort_applies_ten_percent_penalty() {
        let (mut engine, clock) = engine(1500);
        for _ in 0..4 {
            run_to_completion(&mut engine, &clock);
            engine.submit_rating(5).unwrap();
        }
        assert!((engine.total_distance() - 10.0).abs() < 1e-9);

        engine.start();
        let events = engine.abort(&IntrusionReport::new("phone", "notification"));
        assert!((engine.total_distance() - 9.0).abs() < 1e-9);
        assert!(matches!(events[..], [Event::SessionAborted { .. }]));
        assert_eq!(engine.phase(), SessionPhase::Idle);
        assert_eq!(engine.progress_secs(), 0);
    }

    #[test]
    fn abort_discards_pending_rating() {
        let (mut engine, clock) = engine(5);
        run_to_completion(&mut engine, &clock);
        let code = engine.pending().unwrap().code.clone();
        let events = engine.abort(&IntrusionReport::new("door", "visitor"));
        assert!(matches!(
            &events[..],
            [Event::SessionAborted { discarded_code: Some(c), penalty, .. }] if *c == code && *penalty == 0.0
        ));
        assert!(engine.pending().is_none());
    }

    #[test]
    fn duration_change_cancels_run() {
        let (mut engine, clock) = engine(60);
        engine.start();
        clock.advance_secs(10);
        engine.tick();
        let event = engine.set_focus_duration(120).unwrap();
        assert!(matches!(event, Event::DurationChanged { cancelled_run: true, .. }));
        assert_eq!(engine.phase(), SessionPhase::Idle);
        assert_eq!(engine.progress_secs(), 0);
        assert_eq!(engine.timer().start_epoch_ms(), None);
    }

    #[test]
    fn invalid_duration_text_leaves_state_alone() {
        let (mut engine, clock) = engine(60);
        engine.start();
        clock.advance_secs(10);
        engine.tick();
        assert!(engine.set_focus_duration_text("soon").is_err());
        assert!(engine.set_focus_duration(0).is_err());
        assert!(engine.set_focus_duration_text(&i64::MAX.to_string()).is_err());
        assert_eq!(engine.focus_duration_secs(), 60);
        assert_eq!(engine.progress_secs(), 10);
        assert!(engine.is_running());
    }

    #[test]
    fn longest_session_starts_with_a_saturated_deadline() {
        let (mut engine, _clock) = engine(u64::MAX);
        match engine.start() {
            Event::SessionStarted {
                duration_secs,
                deadline_epoch_ms,
                ..
            } => {
                assert_eq!(duration_secs, crate::timer::MAX_FOCUS_DURATION_SECS);
                assert_eq!(deadline_epoch_ms, i64::MAX);
            }
            other => panic!("expected SessionStarted, got {other:?}"),
        }
        assert!(engine.tick().iter().all(|e| !matches!(e, Event::SessionCompleted { .. })));
    }

    #[test]
    fn mission_name_is_trimmed_and_required() {
        let (mut engine, _clock) = engine(60);
        assert!(engine.set_mission("   ").is_err());
        match engine.snapshot() {
            Event::StateSnapshot { mission, .. } => assert_eq!(mission, UNASSIGNED_MISSION),
            other => panic!("unexpected {other:?}"),
        }
        engine.set_mission("  Chapter 3 ").unwrap();
        assert_eq!(engine.mission(), "Chapter 3");
    }

    #[test]
    fn log_lines_are_time_stamped() {
        let (mut engine, _clock) = engine(60);
        engine.start();
        let latest = engine.log().latest().unwrap();
        assert!(latest.text.starts_with("> "));
        assert!(latest.text.ends_with(" - Focus mode activated. All non-essential systems offline."));
    }
}
