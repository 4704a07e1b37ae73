use super::{open_engine, render_event, CliResult};

pub fn run(json: bool) -> CliResult {
    let (_config, engine) = open_engine()?;
    let snapshot = engine.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        render_event(&snapshot);
        let open = engine.todos().iter().filter(|t| !t.completed).count();
        println!("Todos:          {open} open");
    }
    Ok(())
}
