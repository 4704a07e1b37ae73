pub mod config;
pub mod duration;
pub mod history;
pub mod intrusion;
pub mod log;
pub mod run;
pub mod status;
pub mod todo;

use std::io::{self, BufRead, Write};

use astrofocus_core::{
    Config, CoreError, Database, EngineOptions, Event, FocusEngine, StartRejection, StreakChange,
    SystemClock,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Load config and restore the engine from the data directory.
pub fn open_engine() -> Result<(Config, FocusEngine<Database>), CoreError> {
    let config = Config::load()?;
    let db = Database::open()?;
    let engine = FocusEngine::load(db, SystemClock, EngineOptions::from(&config));
    Ok((config, engine))
}

/// Print a prompt and read one trimmed line. `None` on end of input.
pub fn prompt_line(label: &str) -> io::Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn days(n: u32) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{n} days")
    }
}

/// Human-readable rendering of engine events.
pub fn render_event(event: &Event) {
    match event {
        Event::SessionStarted {
            mission,
            duration_secs,
            ..
        } => {
            println!("INITIATING DECRYPTION SEQUENCE... mission \"{mission}\", {duration_secs}s");
        }
        Event::StartRejected { reason, .. } => match reason {
            StartRejection::PendingRating => {
                println!("Finalize the pending mission rating before initiating a new session.")
            }
            StartRejection::AlreadyRunning => println!("A session is already running."),
        },
        Event::Progress { .. } => {}
        Event::SessionCompleted { code, .. } => {
            println!("Session complete. Decryption code: {code}");
        }
        Event::SessionFinalized {
            rating,
            distance,
            total_distance,
            total_sessions,
            ..
        } => {
            println!("Rating {rating}/5 yielded +{distance:.2} M km.");
            println!("Total distance: {total_distance:.2} M km over {total_sessions} sessions.");
        }
        Event::MilestoneReached { message, .. } => println!("MILESTONE REACHED: {message}"),
        Event::StreakUpdated {
            current_streak,
            change,
            ..
        } => match change {
            StreakChange::Unchanged => {}
            StreakChange::Reset => println!("Streak reset. Starting fresh with day 1."),
            StreakChange::Started | StreakChange::Extended => {
                println!("Streak: {}", days(*current_streak))
            }
        },
        Event::SessionAborted {
            source,
            cause,
            penalty,
            total_distance,
            discarded_code,
            ..
        } => {
            println!("INTRUSION DETECTED! Source: {source} - {cause}");
            if let Some(code) = discarded_code {
                println!("Unrated session {code} discarded.");
            }
            if *penalty > 0.0 {
                println!("Security breach penalty applied: -{penalty:.2} M km.");
            }
            println!("Total distance: {total_distance:.2} M km.");
        }
        Event::DurationChanged { duration_secs, .. } => {
            println!("Focus duration set to {duration_secs}s.");
        }
        Event::StateSnapshot {
            phase,
            mission,
            duration_secs,
            total_distance,
            total_sessions,
            streak_display,
            milestone,
            ..
        } => {
            println!("Mission:        {mission}");
            println!("Phase:          {phase:?}");
            println!("Focus duration: {duration_secs}s");
            println!("Distance:       {total_distance:.2} M km");
            println!("Sessions:       {total_sessions}");
            println!("Streak:         {streak_display}");
            println!("Milestone:      {milestone}");
        }
    }
}
