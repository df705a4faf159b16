//! Run command: execute a program until it exits 0 or the retry budget runs out.

use anyhow::Result;
use retry_helper_core::config::HelperConfig;
use retry_helper_core::retry::{Classify, RetryError, RetryManager};
use std::fmt;
use std::io;
use std::process::{Command, ExitStatus};

/// Why one run of the child command did not succeed.
#[derive(Debug)]
pub enum CommandFailure {
    /// The program could not be started at all.
    Spawn(io::Error),
    /// The program exited with a non-zero code.
    Exit(i32),
    /// The program was killed by a signal (no exit code).
    Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFailureKind {
    Spawn,
    Exit(i32),
    Signal,
}

impl Classify for CommandFailure {
    type Kind = CommandFailureKind;

    fn kind(&self) -> CommandFailureKind {
        match self {
            CommandFailure::Spawn(_) => CommandFailureKind::Spawn,
            CommandFailure::Exit(code) => CommandFailureKind::Exit(*code),
            CommandFailure::Signal => CommandFailureKind::Signal,
        }
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandFailure::Spawn(e) => write!(f, "failed to start: {}", e),
            CommandFailure::Exit(code) => write!(f, "exited with code {}", code),
            CommandFailure::Signal => write!(f, "terminated by signal"),
        }
    }
}

impl std::error::Error for CommandFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandFailure::Spawn(e) => Some(e),
            CommandFailure::Exit(_) | CommandFailure::Signal => None,
        }
    }
}

impl CommandFailure {
    /// Exit code to hand back to our own caller.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandFailure::Exit(code) => *code,
            CommandFailure::Spawn(_) | CommandFailure::Signal => 1,
        }
    }
}

fn check_status(status: ExitStatus) -> Result<(), CommandFailure> {
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(CommandFailure::Exit(code)),
        None => Err(CommandFailure::Signal),
    }
}

fn run_program(program: &str, args: &[String]) -> Result<(), CommandFailure> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(CommandFailure::Spawn)?;
    check_status(status)
}

fn run_shell(cmd: &str) -> Result<(), CommandFailure> {
    let status = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .status()
        .map_err(CommandFailure::Spawn)?;
    check_status(status)
}

/// Effective settings for one `run`: CLI flags layered over the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub max_attempts: u32,
    pub wait_seconds: f64,
    pub retry_on_exit: Vec<i32>,
    pub reset: Option<String>,
    pub program: String,
    pub args: Vec<String>,
}

impl RunSettings {
    pub fn merge(
        cfg: &HelperConfig,
        max_attempts: Option<u32>,
        wait: Option<f64>,
        retry_on_exit: Vec<i32>,
        reset: Option<String>,
        command: Vec<String>,
    ) -> Self {
        let mut command = command.into_iter();
        let program = command.next().unwrap_or_default();
        Self {
            max_attempts: max_attempts.unwrap_or(cfg.retry.max_attempts),
            wait_seconds: wait.unwrap_or(cfg.retry.wait_seconds),
            retry_on_exit: if retry_on_exit.is_empty() {
                cfg.retry.retry_on_exit_codes.clone()
            } else {
                retry_on_exit
            },
            reset: reset.or_else(|| cfg.reset_command.clone()),
            program,
            args: command.collect(),
        }
    }

    fn manager(&self) -> Result<RetryManager<CommandFailure>> {
        let mut builder = RetryManager::<CommandFailure>::builder()
            .max_attempts(self.max_attempts)
            .wait_seconds(self.wait_seconds);
        if !self.retry_on_exit.is_empty() {
            builder = builder.retry_on_kinds(
                self.retry_on_exit
                    .iter()
                    .copied()
                    .map(CommandFailureKind::Exit),
            );
        }
        if let Some(reset) = self.reset.clone() {
            builder = builder.reset_with(move || run_shell(&reset));
        }
        Ok(builder.build()?)
    }
}

/// Run the command under a retry manager. Returns 0 on success, otherwise
/// the exit code of the last failed run (1 if there was none).
pub fn run_command(settings: &RunSettings) -> Result<i32> {
    let mut manager = settings.manager()?;
    tracing::info!(
        "running {:?} (max_attempts={}, wait={}s)",
        settings.program,
        settings.max_attempts,
        settings.wait_seconds
    );

    match manager.call(|| run_program(&settings.program, &settings.args)) {
        Ok(()) => {
            tracing::info!("{} succeeded after {} attempt(s)", settings.program, manager.attempts());
            Ok(0)
        }
        Err(err) => {
            let code = err.inner().exit_code();
            match &err {
                RetryError::Reset { .. } => eprintln!("retry-helper: {}", err),
                _ => eprintln!("retry-helper: {}: {}", settings.program, err),
            }
            Ok(code)
        }
    }
}
