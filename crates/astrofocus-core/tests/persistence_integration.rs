//! Integration tests for persisted state.
//!
//! These tests verify that engine state survives a round trip through the
//! SQLite store, and that damaged data degrades to defaults.

use astrofocus_core::storage::{CORE_STATE_KEY, SESSIONS_KEY, STREAK_KEY, TODOS_KEY};
use astrofocus_core::{
    Database, EngineOptions, FocusEngine, IntrusionReport, KeyValueStore, ManualClock, Severity,
};
use chrono::NaiveDate;
use serde_json::Value;

fn clock() -> ManualClock {
    let clock = ManualClock::at_date(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
    clock.advance_secs(10 * 3600);
    clock
}

fn options() -> EngineOptions {
    EngineOptions {
        focus_duration_secs: 1500,
        require_rating: true,
    }
}

#[test]
fn test_round_trip_through_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("astrofocus.db");
    let clock = clock();

    let (distance, history, streak, todos, log_len) = {
        let db = Database::open_at(&path).unwrap();
        let mut engine = FocusEngine::load(db, clock.clone(), options()).with_seed(1);
        engine.start();
        clock.advance_secs(1500);
        engine.tick();
        engine.submit_rating(5).unwrap();
        engine.add_todo("Write the report").unwrap();
        (
            engine.total_distance(),
            engine.history().to_vec(),
            engine.streak().clone(),
            engine.todos().to_vec(),
            engine.log().len(),
        )
    };

    let db = Database::open_at(&path).unwrap();
    let engine = FocusEngine::load(db, clock.clone(), options());
    assert_eq!(engine.total_distance(), distance);
    assert_eq!(engine.total_sessions(), 1);
    assert_eq!(engine.history(), &history[..]);
    assert_eq!(engine.streak(), &streak);
    assert_eq!(engine.todos(), &todos[..]);

    // Restored log plus the reconnect line.
    assert_eq!(engine.log().len(), log_len + 1);
    let latest = engine.log().latest().unwrap();
    assert!(latest.text.ends_with("Mission Control reconnected. Systems nominal."));
    assert_eq!(latest.severity, Severity::Info);
}

#[test]
fn test_fresh_store_has_no_reconnect_line() {
    let db = Database::open_memory().unwrap();
    let engine = FocusEngine::load(db, clock(), options());
    assert!(engine.log().is_empty());
    assert_eq!(engine.total_distance(), 0.0);
    assert_eq!(engine.streak().current_streak, 0);
}

#[test]
fn test_blob_layout() {
    let clock = clock();
    let db = Database::open_memory().unwrap();
    let mut engine = FocusEngine::load(db, clock.clone(), options()).with_seed(7);
    engine.start();
    clock.advance_secs(1500);
    engine.tick();
    engine.submit_rating(3).unwrap();
    engine.abort(&IntrusionReport::new("Email", "Urgent request"));
    engine.add_todo("Plan tomorrow").unwrap();
    let db = engine.into_store();

    let read = |key: &str| -> Value { serde_json::from_str(&db.get(key).unwrap().unwrap()).unwrap() };

    let core = read(CORE_STATE_KEY);
    assert!((core["totalDistance"].as_f64().unwrap() - 1.35).abs() < 1e-9);
    let entries = core["logEntries"].as_array().unwrap();
    assert!(entries[0]["text"].as_str().unwrap().ends_with("INITIATING DECRYPTION SEQUENCE..."));
    assert_eq!(entries[0]["className"], "log-entry success");
    assert_eq!(entries.last().unwrap()["className"], "log-entry warning");

    let sessions = read(SESSIONS_KEY);
    assert_eq!(sessions["totalSessions"], 1);
    assert_eq!(sessions["sessionHistory"][0]["distance"], 1.5);
    assert!(sessions["sessionHistory"][0]["timestamp"]
        .as_str()
        .unwrap()
        .starts_with("2024-06-03T10:25:00"));

    let streak = read(STREAK_KEY);
    assert_eq!(streak["currentStreak"], 1);
    assert_eq!(streak["lastSessionDate"], "2024-06-03");

    let todos = read(TODOS_KEY);
    assert_eq!(todos[0]["text"], "Plan tomorrow");
    assert_eq!(todos[0]["completed"], false);
    assert!(todos[0]["createdAt"].is_i64());
}

#[test]
fn test_malformed_blobs_load_as_defaults() {
    let mut db = Database::open_memory().unwrap();
    db.set(CORE_STATE_KEY, "{\"totalDistance\":").unwrap();
    db.set(SESSIONS_KEY, "null").unwrap();
    db.set(STREAK_KEY, "\"oops\"").unwrap();
    db.set(TODOS_KEY, "\"text\"").unwrap();

    let engine = FocusEngine::load(db, clock(), options());
    assert_eq!(engine.total_distance(), 0.0);
    assert_eq!(engine.total_sessions(), 0);
    assert!(engine.history().is_empty());
    assert_eq!(engine.streak().current_streak, 0);
    assert!(engine.todos().is_empty());
    assert!(engine.log().is_empty());
}

#[test]
fn test_log_is_capped_at_fifty() {
    let clock = clock();
    let db = Database::open_memory().unwrap();
    let mut engine = FocusEngine::load(db, clock.clone(), options());
    for _ in 0..60 {
        engine.abort(&IntrusionReport::new("Noise", "Traffic"));
    }
    assert_eq!(engine.log().len(), 50);

    let db = engine.into_store();
    let engine = FocusEngine::load(db, clock, options());
    // Restored 50 plus the reconnect line, capped again.
    assert_eq!(engine.log().len(), 50);
}
