//! Drives a stream of textual commands against a dispenser.

use std::io::BufRead;
use std::sync::Arc;

use tracing::{debug, warn};

use brewline_core::{DispenseError, Outcome};
use brewline_machine::Dispenser;

use crate::command::Command;
use crate::dispatcher::{Dispatcher, DispatcherConfig};

/// Counters for one run, reported once the stream is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Non-blank lines, i.e. parsed commands.
    pub commands: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub unknown_commands: u64,
}

/// Executes commands in input order. Drink batches run concurrently; the
/// next line starts only after every slot of the current batch resolved.
#[derive(Debug)]
pub struct CommandRunner {
    dispenser: Arc<Dispenser>,
    dispatcher: Dispatcher<Dispenser>,
}

impl CommandRunner {
    pub fn new(dispenser: Dispenser, config: DispatcherConfig) -> Self {
        let dispenser = Arc::new(dispenser);
        let dispatcher = Dispatcher::new(dispenser.clone(), config);
        Self {
            dispenser,
            dispatcher,
        }
    }

    pub fn dispenser(&self) -> &Dispenser {
        &self.dispenser
    }

    /// Outcomes of one command, in output order.
    pub fn execute(&self, command: &Command) -> Vec<Outcome> {
        match command {
            Command::Drink(beverages) => self.dispatcher.dispatch(beverages.as_slice()),
            Command::Refill { ingredient, amount } => {
                vec![self.dispenser.refill(ingredient, *amount)]
            }
            Command::Unknown(tokens) => {
                warn!(?tokens, "unknown command");
                vec![DispenseError::unknown_command(tokens.clone()).into()]
            }
        }
    }

    /// Run every line of `input`, handing each outcome to `emit` as soon as
    /// its command resolves. Only read failures abort the run.
    pub fn run<R, F>(&self, input: R, mut emit: F) -> std::io::Result<RunStats>
    where
        R: BufRead,
        F: FnMut(&Outcome),
    {
        let mut stats = RunStats::default();
        for line in input.lines() {
            let line = line?;
            let Some(command) = Command::parse(&line) else {
                continue;
            };
            stats.commands += 1;
            if matches!(command, Command::Unknown(_)) {
                stats.unknown_commands += 1;
            }

            for outcome in self.execute(&command) {
                if outcome.is_success() {
                    stats.succeeded += 1;
                } else {
                    stats.failed += 1;
                }
                emit(&outcome);
            }
        }
        debug!(?stats, "command stream exhausted");
        Ok(stats)
    }
}
