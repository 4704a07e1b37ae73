use astrofocus_core::{Database, FocusEngine, TodoItem};
use clap::Subcommand;

use super::{open_engine, CliResult};

#[derive(Subcommand)]
pub enum TodoAction {
    /// Add a todo for today
    Add {
        /// Todo text
        text: String,
    },
    /// List today's todos
    List {
        #[arg(long)]
        json: bool,
    },
    /// Toggle a todo's completion
    Done {
        /// Todo ID or a unique prefix of it
        id: String,
    },
    /// Delete a todo
    Delete {
        /// Todo ID or a unique prefix of it
        id: String,
    },
}

/// Resolve a full id from an id or unique prefix.
fn resolve_id(engine: &FocusEngine<Database>, needle: &str) -> Result<String, String> {
    let matches: Vec<&TodoItem> = engine
        .todos()
        .iter()
        .filter(|t| !needle.is_empty() && t.id.starts_with(needle))
        .collect();
    match matches.as_slice() {
        [item] => Ok(item.id.clone()),
        [] => Err(format!("todo not found: {needle}")),
        _ => Err(format!("ambiguous todo id: {needle}")),
    }
}

/// First eight characters of an id, for display.
fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(end, _)| &id[..end])
}

pub fn run(action: TodoAction) -> CliResult {
    let (_config, mut engine) = open_engine()?;

    match action {
        TodoAction::Add { text } => {
            let item = engine.add_todo(&text)?;
            println!("Todo added: {}", item.id);
        }
        TodoAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(engine.todos())?);
            } else if engine.todos().is_empty() {
                println!("No todos for today.");
            } else {
                for item in engine.todos() {
                    let mark = if item.completed { "x" } else { " " };
                    println!("[{mark}] {}  ({})", item.text, short_id(&item.id));
                }
            }
        }
        TodoAction::Done { id } => {
            let id = resolve_id(&engine, &id)?;
            engine.toggle_todo(&id);
            println!("Todo toggled: {id}");
        }
        TodoAction::Delete { id } => {
            let id = resolve_id(&engine, &id)?;
            engine.delete_todo(&id);
            println!("Todo deleted: {id}");
        }
    }
    Ok(())
}
