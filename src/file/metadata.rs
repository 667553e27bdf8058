//! Lock metadata structures and utilities.

use crate::error::{MutexError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

static ACQUISITIONS: AtomicU64 = AtomicU64::new(0);

/// Lock metadata stored in lock files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMetadata {
    /// The lock name as given by the caller.
    pub name: String,

    /// Owner of the lock (e.g., `user@HOST`).
    pub owner: String,

    /// Process ID of the lock holder.
    pub pid: u32,

    /// Timestamp when the lock was created (RFC3339).
    pub created_at: DateTime<Utc>,

    /// Identifies one acquisition. Only the holder of this token removes the file.
    #[serde(default)]
    pub token: String,
}

impl LockMetadata {
    /// Create metadata for `name` owned by the current process, with a fresh token.
    pub fn new(name: &str) -> Self {
        let pid = std::process::id();
        let created_at = Utc::now();
        let sequence = ACQUISITIONS.fetch_add(1, Ordering::Relaxed);
        Self {
            name: name.to_string(),
            owner: get_owner_string(),
            pid,
            token: format!(
                "{}-{}-{}",
                pid,
                created_at.timestamp_nanos_opt().unwrap_or_default(),
                sequence
            ),
            created_at,
        }
    }

    /// Parse lock metadata from a file.
    ///
    /// A missing file yields `Ok(None)`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MutexError::io(
                    format!("failed to read lock file '{}'", path.display()),
                    e,
                ));
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|e| {
            MutexError::io(
                format!("failed to parse lock file '{}'", path.display()),
                io::Error::new(io::ErrorKind::InvalidData, e),
            )
        })
    }

    /// Serialize lock metadata to JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            MutexError::io(
                "failed to serialize lock metadata",
                io::Error::new(io::ErrorKind::InvalidData, e),
            )
        })
    }

    /// Whether this metadata was written by the current process.
    pub fn is_owned_by_current_process(&self) -> bool {
        self.pid == std::process::id() && self.owner == get_owner_string()
    }

    /// Calculate the age of the lock.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }

    /// Check if the lock is stale based on the given threshold in minutes.
    pub fn is_stale(&self, stale_minutes: u32) -> bool {
        self.age().num_minutes() > stale_minutes as i64
    }
}

/// Get the owner string for lock metadata.
pub(crate) fn get_owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
