use astrofocus_core::SessionHistoryEntry;
use chrono::{DateTime, Local};
use serde::Serialize;

use super::{open_engine, CliResult};

#[derive(Serialize)]
struct HistoryReport<'a> {
    total_sessions: u64,
    total_distance: f64,
    history: &'a [SessionHistoryEntry],
}

pub fn run(json: bool) -> CliResult {
    let (_config, engine) = open_engine()?;
    if json {
        let report = HistoryReport {
            total_sessions: engine.total_sessions(),
            total_distance: engine.total_distance(),
            history: engine.history(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if engine.history().is_empty() {
        println!("No completed sessions yet.");
        return Ok(());
    }
    println!(
        "{} sessions, {:.2} M km total",
        engine.total_sessions(),
        engine.total_distance()
    );
    for entry in engine.history() {
        let when = DateTime::parse_from_rfc3339(&entry.timestamp)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| entry.timestamp.clone());
        println!("  {when}  +{:.2} M km", entry.distance);
    }
    Ok(())
}
