//! Command-line argument definitions using clap derive.

use clap::Parser;
use std::path::PathBuf;

/// Brewline - a concurrent beverage machine simulator
#[derive(Parser, Debug)]
#[command(name = "brewline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Machine configuration (JSON)
    #[arg(short, long, default_value = "configuration.json")]
    pub config: PathBuf,

    /// Command file, one command per line; reads stdin when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Per-beverage deadline in milliseconds (default 5000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Print the beverages this machine can make and exit
    #[arg(long)]
    pub menu: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}
