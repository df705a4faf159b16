//! Tests for the run subcommand.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_run_defaults() {
    match parse(&["retry-helper", "run", "make"]) {
        CliCommand::Run {
            max_attempts,
            wait,
            retry_on_exit,
            reset,
            command,
        } => {
            assert!(max_attempts.is_none());
            assert!(wait.is_none());
            assert!(retry_on_exit.is_empty());
            assert!(reset.is_none());
            assert_eq!(command, vec!["make".to_string()]);
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_all_flags() {
    match parse(&[
        "retry-helper",
        "run",
        "--max-attempts",
        "5",
        "--wait",
        "0.5",
        "--retry-on-exit",
        "1",
        "--retry-on-exit",
        "75",
        "--reset",
        "rm -f partial",
        "--",
        "curl",
        "-fsS",
        "https://example.com",
    ]) {
        CliCommand::Run {
            max_attempts,
            wait,
            retry_on_exit,
            reset,
            command,
        } => {
            assert_eq!(max_attempts, Some(5));
            assert_eq!(wait, Some(0.5));
            assert_eq!(retry_on_exit, vec![1, 75]);
            assert_eq!(reset.as_deref(), Some("rm -f partial"));
            assert_eq!(command, vec!["curl", "-fsS", "https://example.com"]);
        }
        _ => panic!("expected Run with flags"),
    }
}

#[test]
fn cli_parse_run_keeps_program_flags() {
    match parse(&["retry-helper", "run", "ls", "-la", "/tmp"]) {
        CliCommand::Run { command, .. } => {
            assert_eq!(command, vec!["ls", "-la", "/tmp"]);
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_requires_command() {
    assert!(Cli::try_parse_from(["retry-helper", "run"]).is_err());
}

#[test]
fn cli_parse_verbose_is_global() {
    let cli = Cli::try_parse_from(["retry-helper", "run", "-v", "true"]).unwrap();
    assert!(cli.verbose);
    let cli = Cli::try_parse_from(["retry-helper", "--verbose", "config"]).unwrap();
    assert!(cli.verbose);
}
