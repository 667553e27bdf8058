//! Command implementations for named-mutex.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Each handler returns the process exit code on success;
//! errors are mapped to exit codes by the caller.

mod check;
mod lock;
mod run;

use crate::cli::{Cli, Command, LockAction};
use crate::config::Config;
use crate::error::Result;

pub use check::cmd_check;
pub use lock::{cmd_lock_clear, cmd_lock_list};
pub use run::cmd_run;

/// Dispatch a command to its implementation.
///
/// The config is resolved once here and handed to the handler.
pub fn dispatch(cli: Cli) -> Result<i32> {
    let config = Config::resolve(cli.config.as_deref())?;

    match cli.command {
        Command::Run(args) => cmd_run(&config, args),
        Command::Check(args) => cmd_check(&config, args),
        Command::Lock(lock_cmd) => match lock_cmd.action {
            LockAction::List => cmd_lock_list(&config),
            LockAction::Clear(args) => cmd_lock_clear(&config, args),
        },
    }
}
