use std::io;
use std::time::Duration;

use astrofocus_core::notify::{TIME_UP_BODY, TIME_UP_TITLE};
use astrofocus_core::timer::DEFAULT_POLL_INTERVAL;
use astrofocus_core::{
    Config, DeadlineWatch, DecryptionStream, Event, FocusEngine, IntrusionReport, KeyValueStore,
    LogNotifier, Notifier, NullNotifier, Rating, Ticker,
};
use clap::Args;
use tokio::sync::mpsc;

use super::{open_engine, prompt_line, render_event, CliResult};

#[derive(Args)]
pub struct RunArgs {
    /// Session length in seconds (defaults to session.focus_duration_secs)
    #[arg(long)]
    duration: Option<String>,
    /// Mission name; prompted for when omitted
    #[arg(long)]
    mission: Option<String>,
    /// Rate the session (1-5) without prompting
    #[arg(long)]
    rating: Option<i64>,
    /// Hide the decryption stream
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Tick,
    Stream,
    Deadline,
}

enum RunOutcome {
    /// Timer finished. The session may still be waiting for a rating.
    Completed,
    Aborted,
    Rejected,
}

/// Rings the terminal bell and prints the time-up message.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn time_up(&self) {
        eprintln!("\x07{TIME_UP_TITLE} {TIME_UP_BODY}");
        LogNotifier.time_up();
    }
}

pub fn run(args: RunArgs) -> CliResult {
    let (config, mut engine) = open_engine()?;

    if let Some(raw) = &args.duration {
        engine.set_focus_duration_text(raw)?;
    }
    let preset_rating = args.rating.map(Rating::new).transpose()?;

    let mission = match args.mission {
        Some(name) => name,
        None => prompt_line("Mission name: ")?.unwrap_or_default(),
    };
    engine.set_mission(&mission)?;

    let notifier: Box<dyn Notifier> = if config.notifications.enabled {
        Box::new(TerminalNotifier)
    } else {
        Box::new(NullNotifier)
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(async {
        let show_stream = !args.quiet && config.ambient.stream_enabled;
        match drive(&mut engine, &config, show_stream).await? {
            RunOutcome::Completed => {
                notifier.time_up();
                finish(&mut engine, preset_rating).await
            }
            RunOutcome::Aborted | RunOutcome::Rejected => Ok(()),
        }
    });
    // A rating prompt interrupted by Ctrl-C leaves a blocked stdin reader.
    runtime.shutdown_background();
    result
}

async fn drive<S: KeyValueStore>(
    engine: &mut FocusEngine<S>,
    config: &Config,
    show_stream: bool,
) -> Result<RunOutcome, Box<dyn std::error::Error>> {
    let started = engine.start();
    render_event(&started);
    let deadline = match started {
        Event::SessionStarted {
            deadline_epoch_ms, ..
        } => deadline_epoch_ms,
        _ => return Ok(RunOutcome::Rejected),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let tick_period = Duration::from_millis(config.timer.tick_interval_ms);
    let _ticker = Ticker::spawn(tick_period, tx.clone(), Signal::Tick);
    let _stream_ticker = show_stream.then(|| {
        let period = Duration::from_millis(config.ambient.stream_interval_ms);
        Ticker::spawn(period, tx.clone(), Signal::Stream)
    });
    let _deadline = DeadlineWatch::spawn(deadline, DEFAULT_POLL_INTERVAL, tx, Signal::Deadline);
    tracing::debug!(deadline_epoch_ms = deadline, show_stream, "session timers armed");

    let mut rng = rand::thread_rng();
    let mut stream = DecryptionStream::default();
    if show_stream {
        stream.seed(&mut rng);
        for line in stream.lines() {
            println!("  {line}");
        }
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut last_minutes = None;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                let report = IntrusionReport::new("Operator", "Session interrupted");
                for event in engine.abort(&report) {
                    render_event(&event);
                }
                return Ok(RunOutcome::Aborted);
            }
            signal = rx.recv() => match signal {
                Some(Signal::Tick) | Some(Signal::Deadline) => {
                    let events = engine.tick();
                    let remaining = engine.timer().remaining_minutes();
                    if remaining.is_some() && remaining != last_minutes {
                        last_minutes = remaining;
                        println!(
                            "[{:5.1}%] T-minus {} min",
                            engine.timer().progress_pct(),
                            remaining.unwrap_or_default()
                        );
                    }
                    let completed = events
                        .iter()
                        .any(|e| matches!(e, Event::SessionCompleted { .. }));
                    for event in &events {
                        render_event(event);
                    }
                    if completed {
                        return Ok(RunOutcome::Completed);
                    }
                }
                Some(Signal::Stream) => {
                    println!("  {}", stream.advance(&mut rng));
                }
                None => return Err("timer channel closed".into()),
            }
        }
    }
}

/// Collect the rating for a completed session and credit it.
async fn finish<S: KeyValueStore>(
    engine: &mut FocusEngine<S>,
    preset: Option<Rating>,
) -> CliResult {
    if engine.pending().is_none() {
        return Ok(());
    }
    let rating = match preset {
        Some(rating) => rating,
        None => match ask_rating().await? {
            Some(rating) => rating,
            None => {
                println!("Rating skipped. The unrated session is lost.");
                return Ok(());
            }
        },
    };
    for event in engine.submit_rating(i64::from(rating.value()))? {
        render_event(&event);
    }
    Ok(())
}

/// Prompt until a valid 1-5 rating is entered. End of input counts as the
/// neutral rating; Ctrl-C returns `None`.
async fn ask_rating() -> io::Result<Option<Rating>> {
    loop {
        let read = tokio::task::spawn_blocking(|| prompt_line("Rate your focus (1-5): "));
        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(None),
            joined = read => joined.map_err(io::Error::other)??,
        };
        let Some(line) = line else {
            println!();
            return Ok(Some(Rating::NEUTRAL));
        };
        match line.parse::<Rating>() {
            Ok(rating) => return Ok(Some(rating)),
            Err(_) => println!("Enter a whole number from 1 to 5."),
        }
    }
}
