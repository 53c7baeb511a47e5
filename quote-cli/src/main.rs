use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::debug;

use quote_cli::app::{self, RunOptions};
use quote_cli::logging;
use quote_cli::utils::parse_date;

// --- CLI ---

/// Replays a scripted customer session through the moving quote wizard.
///
/// Loads the configuration directory (rates.toml, steps.toml, supplies.csv),
/// offers a saved session when one can be resumed, applies each scripted
/// action, and prints the transitions and the final estimate.
#[derive(Debug, Parser)]
#[command(name = "quote", version, about)]
struct Cli {
    /// Configuration directory.
    #[arg(long)]
    config: PathBuf,

    /// Script of wizard actions (TOML).
    #[arg(long)]
    script: PathBuf,

    /// Directory for the resumable session. Kept in memory when omitted.
    #[arg(long)]
    session_dir: Option<PathBuf>,

    /// Directory submitted leads are written to.
    #[arg(long, default_value = "outbox")]
    outbox: PathBuf,

    /// Date used to decide whether a saved session can be resumed.
    /// Defaults to the local date.
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,

    /// Log level or filter directive (overrides RUST_LOG).
    #[arg(long)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Hide log output on the console.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

// --- Entry point ---

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log = logging::init_logging(logging::DEFAULT_LEVEL)?;
    if let Some(level) = &cli.log_level {
        log.set_level(level)?;
    }
    if let Some(path) = &cli.log_file {
        log.attach_file(path)?;
    }
    if cli.quiet {
        log.set_console_enabled(false)?;
    }

    let options = RunOptions {
        config_dir: cli.config,
        script: cli.script,
        session_dir: cli.session_dir,
        outbox: cli.outbox,
        today: cli.today.unwrap_or_else(|| Local::now().date_naive()),
    };
    debug!(?options, "starting run");

    let report = app::run(&options).await?;
    print!("{report}");

    Ok(())
}
