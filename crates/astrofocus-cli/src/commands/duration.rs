use astrofocus_core::timer::parse_focus_duration;
use astrofocus_core::Config;

use super::CliResult;

pub fn run(raw: &str) -> CliResult {
    let seconds = parse_focus_duration(raw)?;
    let mut config = Config::load()?;
    config.set("session.focus_duration_secs", &seconds.to_string())?;
    config.save()?;
    println!("Focus duration set to {seconds}s.");
    Ok(())
}
