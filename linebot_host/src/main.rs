//! # Linebot Host
//!
//! Replays recorded sensor traces against the line-following controller.
//!
//! The host loads one TOML configuration describing the run (cap,
//! controller presets, trace paths), merges the per-channel traces into a
//! time-ordered schedule, and drives the controller through the
//! event-driven loop in `linebot_host::runner`. Every emitted motor
//! command is written as one text line, to a log file or stdout.

use clap::Parser;
use linebot_controller::LineBotController;
use linebot_host::config::load_config;
use linebot_host::runner;
use linebot_host::sink::TextSink;
use linebot_host::trace::{Schedule, SimTime, TraceFile};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Linebot Host: trace replay for the line-following controller
#[derive(Parser, Debug)]
#[command(name = "linebot_host")]
#[command(author = "linebot")]
#[command(version)]
#[command(about = "Replay recorded sensor traces against the line-following controller")]
struct Args {
    /// Path to the host configuration TOML.
    #[arg(default_value = "config/linebot.toml")]
    config: PathBuf,

    /// Override the simulation cap from the config (HH:MM:SS:mmm).
    #[arg(long, value_name = "TIME")]
    until: Option<String>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("Linebot host v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Linebot host done");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut loaded = load_config(&args.config)?;

    if let Some(ref until) = args.until {
        loaded.until = until
            .parse::<SimTime>()
            .map_err(|e| format!("--until: {e}"))?;
        info!("Cap overridden on the command line: {}", loaded.until);
    }

    let mut traces = Vec::with_capacity(loaded.traces.len());
    for (channel, path) in &loaded.traces {
        let trace = TraceFile::load(*channel, path)?;
        info!(
            "Loaded {} samples for {channel} from {}",
            trace.len(),
            path.display()
        );
        traces.push(trace);
    }
    let schedule = Schedule::merge(&traces);

    let mut controller = LineBotController::new(&loaded.controller);
    info!(
        "Controller ready: steer={:?}, polarity={:?}, light guard {}",
        loaded.controller.steer,
        loaded.controller.polarity,
        if controller.light_enabled() { "on" } else { "off" },
    );

    match loaded.output {
        Some(ref path) => {
            let file = File::create(path)?;
            let mut sink = TextSink::new(BufWriter::new(file));
            runner::run(&mut controller, &schedule, loaded.until, &mut sink)?;
            sink.flush()?;
            info!("{} motor lines written to {}", sink.lines(), path.display());
        }
        None => {
            let mut sink = TextSink::new(io::stdout().lock());
            runner::run(&mut controller, &schedule, loaded.until, &mut sink)?;
            sink.flush()?;
        }
    }

    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
