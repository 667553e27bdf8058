//! CLI argument parsing for named-mutex.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// named-mutex: hold a named lock shared between processes.
///
/// The lock lives in a shared store (lock files, or Oracle `DBMS_LOCK`), so
/// any process that can reach the same store contends for the same names.
#[derive(Parser, Debug)]
#[command(name = "named-mutex")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: $NAMED_MUTEX_CONFIG, then ./named-mutex.yaml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for named-mutex.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a command while holding a lock.
    ///
    /// Exits with the command's exit code, or 4 when the lock could not be
    /// acquired in time.
    Run(RunArgs),

    /// Check whether a lock is free.
    ///
    /// Exits 0 when the lock is free and 4 when it is held.
    Check(CheckArgs),

    /// Lock file management commands.
    ///
    /// List or clear lock files of the file backend.
    Lock(LockCommand),
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Lock name.
    pub name: String,

    /// Seconds to wait for the lock (default from config, 0 = fail fast).
    #[arg(long, short = 't', allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// Command to run, after `--`.
    #[arg(last = true, required = true, num_args = 1.., value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Arguments for the `check` command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Lock name.
    pub name: String,
}

/// Lock subcommand wrapper.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// List all lock files.
    ///
    /// Shows each lock with its owner and age, flagging stale ones.
    List,

    /// Clear a specific lock.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(LockClearArgs),
}

/// Arguments for the `lock clear` command.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// Name of the lock to clear.
    pub name: String,

    /// Force clearing the lock (required for safety).
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run_with_command() {
        let cli = Cli::try_parse_from([
            "named-mutex",
            "run",
            "nightly",
            "--timeout",
            "30",
            "--",
            "backup.sh",
            "--full",
        ])
        .unwrap();

        if let Command::Run(args) = cli.command {
            assert_eq!(args.name, "nightly");
            assert_eq!(args.timeout, Some(30));
            assert_eq!(args.command, vec!["backup.sh", "--full"]);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_accepts_negative_timeout() {
        let cli =
            Cli::try_parse_from(["named-mutex", "run", "jobs", "-t", "-2", "--", "true"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.timeout, Some(-2));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_requires_command() {
        assert!(Cli::try_parse_from(["named-mutex", "run", "jobs"]).is_err());
    }

    #[test]
    fn parse_check_with_global_config() {
        let cli =
            Cli::try_parse_from(["named-mutex", "check", "jobs", "--config", "locks.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("locks.yaml")));
        assert!(matches!(cli.command, Command::Check(ref args) if args.name == "jobs"));
    }

    #[test]
    fn parse_lock_list() {
        let cli = Cli::try_parse_from(["named-mutex", "lock", "list"]).unwrap();
        if let Command::Lock(lock_cmd) = cli.command {
            assert!(matches!(lock_cmd.action, LockAction::List));
        } else {
            panic!("Expected Lock command");
        }
    }

    #[test]
    fn parse_lock_clear() {
        let cli = Cli::try_parse_from(["named-mutex", "lock", "clear", "nightly", "--force"]).unwrap();
        if let Command::Lock(lock_cmd) = cli.command {
            if let LockAction::Clear(args) = lock_cmd.action {
                assert_eq!(args.name, "nightly");
                assert!(args.force);
            } else {
                panic!("Expected Clear action");
            }
        } else {
            panic!("Expected Lock command");
        }
    }
}
