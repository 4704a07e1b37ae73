use astrofocus_core::storage::load_core_state;
use astrofocus_core::{Database, LogEntry, Severity};

use super::CliResult;

pub fn run(json: bool) -> CliResult {
    let db = Database::open()?;
    let log = load_core_state(&db).map(|core| core.log).unwrap_or_default();

    if json {
        let entries: Vec<&LogEntry> = log.iter().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if log.is_empty() {
        println!("Mission log is empty.");
    }
    // Oldest first, newest at the bottom of the terminal.
    for entry in log.iter().rev() {
        match entry.severity {
            Severity::None => println!("{}", entry.text),
            severity => println!("{} [{}]", entry.text, severity.as_str()),
        }
    }
    Ok(())
}
