//! Infrastructure layer: concurrent dispatch, configuration, command input.

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod runner;

pub use command::Command;
pub use config::{ConfigError, MachineConfig};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use runner::{CommandRunner, RunStats};
