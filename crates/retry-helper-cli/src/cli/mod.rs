//! CLI for retry-helper.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use retry_helper_core::config;

use commands::{run_command, run_completions, run_show_config, RunSettings};

/// Top-level CLI: re-run a command until it succeeds.
#[derive(Debug, Parser)]
#[command(name = "retry-helper")]
#[command(about = "Re-run a command until it succeeds or runs out of attempts", long_about = None)]
pub struct Cli {
    /// Log to stderr instead of the state log file.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run PROGRAM, retrying on failure.
    Run {
        /// Maximum number of attempts, including the first (overrides config).
        #[arg(long, value_name = "N")]
        max_attempts: Option<u32>,
        /// Seconds to wait after a failed attempt (overrides config).
        #[arg(long, value_name = "SECS")]
        wait: Option<f64>,
        /// Only retry when the command exits with one of these codes. Repeatable.
        #[arg(long = "retry-on-exit", value_name = "CODE")]
        retry_on_exit: Vec<i32>,
        /// Shell command run before each re-attempt; a failing reset aborts the run.
        #[arg(long, value_name = "CMD")]
        reset: Option<String>,
        /// Program and its arguments.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Show the config file location and the effective configuration.
    Config,

    /// Print shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

impl Cli {
    /// Dispatch the parsed command; returns the process exit code.
    pub fn run(self) -> Result<i32> {
        match self.command {
            CliCommand::Run {
                max_attempts,
                wait,
                retry_on_exit,
                reset,
                command,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let settings = RunSettings::merge(&cfg, max_attempts, wait, retry_on_exit, reset, command);
                run_command(&settings)
            }
            CliCommand::Config => {
                let cfg = config::load_or_init()?;
                run_show_config(&config::config_path()?, &cfg)?;
                Ok(0)
            }
            CliCommand::Completions { shell } => {
                run_completions(shell);
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests;
