//! `named-mutex lock`: operator commands for lock files.

use crate::cli::LockClearArgs;
use crate::config::{BackendKind, Config};
use crate::error::{MutexError, Result};
use crate::exit_codes;
use crate::file;
use std::path::Path;
use tracing::warn;

fn require_file_backend(config: &Config, command: &str) -> Result<()> {
    if config.backend != BackendKind::File {
        return Err(MutexError::Config(format!(
            "'lock {}' only works with the file backend (configured: {})",
            command, config.backend
        )));
    }
    Ok(())
}

/// Print every lock file with its owner and age.
pub fn cmd_lock_list(config: &Config) -> Result<i32> {
    require_file_backend(config, "list")?;

    let locks = file::list_locks(Path::new(&config.lock_dir), config.lock_stale_minutes)?;

    if locks.is_empty() {
        println!("No active locks.");
        return Ok(exit_codes::SUCCESS);
    }

    println!("Active locks ({}):", locks.len());
    println!();

    for lock in &locks {
        println!("  {}:", lock.metadata.name);
        println!("    Owner:      {}", lock.metadata.owner);
        println!("    PID:        {}", lock.metadata.pid);
        println!(
            "    Created:    {}",
            lock.metadata.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("    Age:        {}", lock.metadata.age_string());
        if lock.is_stale {
            println!(
                "    Status:     STALE (exceeds {} min threshold)",
                config.lock_stale_minutes
            );
        }
        println!("    Path:       {}", lock.path.display());
        println!();
    }

    let stale_count = locks.iter().filter(|l| l.is_stale).count();
    if stale_count > 0 {
        println!(
            "{} stale lock(s) found. Use `named-mutex lock clear <NAME> --force` to remove.",
            stale_count
        );
    }

    Ok(exit_codes::SUCCESS)
}

/// Remove a lock file regardless of its holder.
pub fn cmd_lock_clear(config: &Config, args: LockClearArgs) -> Result<i32> {
    if !args.force {
        return Err(MutexError::Config(format!(
            "refusing to clear lock without --force flag.\n\n\
             Clearing a lock breaks mutual exclusion if its holder is still running.\n\
             Only clear locks if you are certain the holder has exited.\n\n\
             To clear the lock, run:\n  named-mutex lock clear {} --force",
            args.name
        )));
    }

    require_file_backend(config, "clear")?;

    let cleared = file::clear_lock(
        Path::new(&config.lock_dir),
        &args.name,
        config.lock_stale_minutes,
    )?;

    if !cleared.is_stale {
        warn!(
            lock = %args.name,
            owner = %cleared.metadata.owner,
            pid = cleared.metadata.pid,
            "cleared a lock that was not stale"
        );
    }

    println!("Cleared lock: {}", cleared);
    Ok(exit_codes::SUCCESS)
}
