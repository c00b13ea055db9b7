use wbm_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Log to the state-dir file; fall back to stderr if it cannot be opened.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    match CliCommand::run_from_args() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("wbm error: {:#}", err);
            std::process::exit(1);
        }
    }
}
