//! `named-mutex run`: hold a lock for the lifetime of a child process.

use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::{MutexError, Result};
use crate::exit_codes;
use crate::factory::MutexFactory;
use crate::mutex::acquire_guard;
use std::process::Command;
use tracing::{debug, info};

/// Run `args.command` while holding the lock `args.name`.
///
/// Returns the child's exit code. A child killed by a signal reports
/// [`exit_codes::USER_ERROR`].
pub fn cmd_run(config: &Config, args: RunArgs) -> Result<i32> {
    let factory = MutexFactory::from_config(config)?;
    let timeout = args
        .timeout
        .unwrap_or_else(|| i64::try_from(config.default_timeout_secs).unwrap_or(i64::MAX));

    let mut mutex = factory.create(&args.name)?;
    let Some(guard) = acquire_guard(&mut mutex, timeout)? else {
        return Err(MutexError::AcquireFailed { name: args.name });
    };
    info!(lock = %args.name, backend = factory.backend_name(), "lock acquired, starting command");

    let (program, rest) = args
        .command
        .split_first()
        .ok_or_else(|| MutexError::Config("no command given".to_string()))?;

    let status = Command::new(program)
        .args(rest)
        .status()
        .map_err(|e| MutexError::io(format!("failed to run '{}'", program), e))?;
    debug!(lock = %args.name, %status, "command finished");

    guard.release()?;

    Ok(status.code().unwrap_or(exit_codes::USER_ERROR))
}
