use clap::Parser;
use retry_helper_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // File logging by default; stderr when asked for or when the state dir is unusable.
    if cli.verbose || logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    match cli.run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("retry-helper error: {:#}", err);
            std::process::exit(1);
        }
    }
}
