//! `brewline` command-line entry point.
//!
//! Loads a machine configuration, then executes commands from a file or
//! stdin, printing one result line per prepared beverage or refill.

pub mod args;

pub use args::Cli;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use brewline_infra::{CommandRunner, MachineConfig};
use brewline_machine::Dispenser;
use brewline_observability::LogFormat;

/// Run the CLI application.
pub fn run(cli: Cli) -> Result<()> {
    brewline_observability::init(if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    let config = MachineConfig::from_path(&cli.config)
        .with_context(|| format!("loading machine configuration from {}", cli.config.display()))?;

    let mut dispatcher = config.dispatcher_config();
    if let Some(ms) = cli.timeout_ms {
        dispatcher = dispatcher.with_timeout(Duration::from_millis(ms));
    }

    let dispenser = Dispenser::new(config.into_machine()?);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.menu {
        for name in dispenser.menu() {
            writeln!(out, "{name}")?;
        }
        return Ok(());
    }

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening command input {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let runner = CommandRunner::new(dispenser, dispatcher);
    let mut write_err = None;
    let stats = runner
        .run(input, |outcome| {
            if write_err.is_none() {
                if let Err(e) = writeln!(out, "{outcome}") {
                    write_err = Some(e);
                }
            }
        })
        .context("reading command input")?;
    if let Some(e) = write_err {
        return Err(e).context("writing results");
    }

    info!(?stats, "run complete");
    Ok(())
}
