//! Lock file naming, listing, and clearing operations.

use super::metadata::LockMetadata;
use crate::error::{MutexError, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of lock files.
pub const LOCK_EXTENSION: &str = "lock";

/// File name used for the lock called `name`.
///
/// Bytes outside `[a-z0-9._-]` are written as `%XX`, so distinct names
/// always map to distinct files and no name can escape the lock directory.
/// Uppercase letters are escaped too: `Jobs` and `jobs` must not collide on
/// case-insensitive filesystems. The empty name becomes `%.lock`.
pub fn lock_file_name(name: &str) -> String {
    let mut file_name = String::with_capacity(name.len() + LOCK_EXTENSION.len() + 1);
    for byte in name.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' => file_name.push(byte as char),
            // A leading dot would hide the file.
            b'.' if !file_name.is_empty() => file_name.push('.'),
            _ => {
                let _ = write!(file_name, "%{:02X}", byte);
            }
        }
    }
    if file_name.is_empty() {
        file_name.push('%');
    }
    file_name.push('.');
    file_name.push_str(LOCK_EXTENSION);
    file_name
}

/// Path of the lock file for `name` inside `dir`.
pub fn lock_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(lock_file_name(name))
}

/// Information about an existing lock file.
#[derive(Debug, Clone)]
pub struct LockInfo {
    /// The lock file path.
    pub path: PathBuf,

    /// The lock metadata.
    pub metadata: LockMetadata,

    /// Whether the lock is stale.
    pub is_stale: bool,
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (owner: {}, pid: {}, age: {}{})",
            self.metadata.name,
            self.metadata.owner,
            self.metadata.pid,
            self.metadata.age_string(),
            if self.is_stale { ", STALE" } else { "" }
        )
    }
}

/// List all lock files in `dir`, sorted by lock name.
///
/// Files that are not lock files, or whose metadata cannot be parsed, are
/// skipped. A missing directory means there are no locks.
pub fn list_locks(dir: &Path, stale_minutes: u32) -> Result<Vec<LockInfo>> {
    let mut locks = Vec::new();

    if !dir.exists() {
        return Ok(locks);
    }

    let entries = fs::read_dir(dir).map_err(|e| {
        MutexError::io(
            format!("failed to read lock directory '{}'", dir.display()),
            e,
        )
    })?;

    for entry in entries {
        let entry = entry
            .map_err(|e| MutexError::io("failed to read lock directory entry", e))?;
        let path = entry.path();

        let is_lock_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(LOCK_EXTENSION))
            .is_some_and(|stem| stem.ends_with('.'));
        if !is_lock_file {
            continue;
        }

        let Ok(Some(metadata)) = LockMetadata::from_file(&path) else {
            continue;
        };

        let is_stale = metadata.is_stale(stale_minutes);
        locks.push(LockInfo {
            path,
            metadata,
            is_stale,
        });
    }

    locks.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
    Ok(locks)
}

/// Remove the lock file for `name`, whoever holds it.
///
/// The caller is responsible for deciding that clearing the lock is
/// appropriate; the holder, if still alive, loses mutual exclusion.
pub fn clear_lock(dir: &Path, name: &str, stale_minutes: u32) -> Result<LockInfo> {
    let path = lock_path(dir, name);

    let Some(metadata) = LockMetadata::from_file(&path)? else {
        return Err(MutexError::LockNotFound {
            name: name.to_string(),
            path,
        });
    };

    let is_stale = metadata.is_stale(stale_minutes);

    fs::remove_file(&path).map_err(|e| {
        MutexError::io(format!("failed to clear lock '{}'", path.display()), e)
    })?;

    Ok(LockInfo {
        path,
        metadata,
        is_stale,
    })
}
