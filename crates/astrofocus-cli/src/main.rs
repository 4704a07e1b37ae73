use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "astrofocus", version, about = "AstroFocus CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a focus session in the foreground
    Run(commands::run::RunArgs),
    /// Print mission status
    Status {
        /// Print the state snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the focus session length in seconds
    Duration {
        /// Whole seconds, at least 1
        seconds: String,
    },
    /// Report an intrusion (applies the distance penalty)
    Intrusion {
        /// What interrupted you (e.g. "Phone")
        #[arg(long)]
        source: String,
        /// Why (e.g. "Social media")
        #[arg(long)]
        cause: String,
    },
    /// Recent completed sessions
    History {
        #[arg(long)]
        json: bool,
    },
    /// Mission log
    Log {
        #[arg(long)]
        json: bool,
    },
    /// Today's todo list
    Todo {
        #[command(subcommand)]
        action: commands::todo::TodoAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ASTROFOCUS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Status { json } => commands::status::run(json),
        Commands::Duration { seconds } => commands::duration::run(&seconds),
        Commands::Intrusion { source, cause } => commands::intrusion::run(source, cause),
        Commands::History { json } => commands::history::run(json),
        Commands::Log { json } => commands::log::run(json),
        Commands::Todo { action } => commands::todo::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
