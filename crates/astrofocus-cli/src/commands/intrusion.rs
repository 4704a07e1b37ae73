use astrofocus_core::IntrusionReport;

use super::{open_engine, render_event, CliResult};

pub fn run(source: String, cause: String) -> CliResult {
    let (_config, mut engine) = open_engine()?;
    for event in engine.abort(&IntrusionReport::new(source, cause)) {
        render_event(&event);
    }
    Ok(())
}
