//! Config struct definition and default implementation.

use super::types::*;
use crate::mode::LockMode;
use serde::{Deserialize, Serialize};

/// Configuration for named-mutex.
///
/// This struct represents the contents of `named-mutex.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Store selection
    // =========================================================================
    /// Which lock store to use.
    #[serde(default)]
    pub backend: BackendKind,

    /// Connection settings, required when `backend` is `oracle`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle: Option<OracleSettings>,

    // =========================================================================
    // Mutex options
    // =========================================================================
    /// Lock mode requested from the store (`X`, `S`, `SS`, ...).
    #[serde(default)]
    pub mode: LockMode,

    /// Let the store drop the lock when the current transaction commits.
    #[serde(default)]
    pub release_on_commit: bool,

    /// Release held locks when a mutex goes out of scope.
    #[serde(default = "default_true")]
    pub auto_release: bool,

    /// Seconds to wait for a busy lock when no timeout is given.
    #[serde(default)]
    pub default_timeout_secs: u64,

    // =========================================================================
    // File backend settings
    // =========================================================================
    /// Directory holding lock files, relative to the working directory.
    #[serde(default = "default_lock_dir")]
    pub lock_dir: String,

    /// Minutes after which a lock file is reported as stale.
    #[serde(default = "default_lock_stale_minutes")]
    pub lock_stale_minutes: u32,

    /// Delay between attempts while waiting for a busy lock file.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            oracle: None,
            mode: LockMode::default(),
            release_on_commit: false,
            auto_release: default_true(),
            default_timeout_secs: 0,
            lock_dir: default_lock_dir(),
            lock_stale_minutes: default_lock_stale_minutes(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}
