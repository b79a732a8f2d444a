use std::process::ExitCode;

fn main() -> ExitCode {
    match brewline_cli::run(brewline_cli::Cli::parse_args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
