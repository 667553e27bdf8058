//! Configuration types and defaults for named-mutex.
//!
//! This module defines enums, constants, and default value functions
//! used by the Config struct.

use serde::{Deserialize, Serialize};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "NAMED_MUTEX_CONFIG";

/// Config file looked up in the current directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "named-mutex.yaml";

/// Which lock store backs the mutexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Lock files in a shared directory (default).
    #[default]
    File,
    /// A lock table inside this process.
    Memory,
    /// Oracle `DBMS_LOCK`. Requires the `oracle` feature.
    Oracle,
}

impl BackendKind {
    /// Parse a backend name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "file" => Some(Self::File),
            "memory" => Some(Self::Memory),
            "oracle" => Some(Self::Oracle),
            _ => None,
        }
    }

    /// The name used in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
            Self::Oracle => "oracle",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to reach the Oracle database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSettings {
    /// Easy Connect string or TNS alias (e.g. `//db.example.com:1521/ORCLPDB1`).
    pub connect_string: String,

    /// Database user.
    pub username: String,

    /// Environment variable holding the password. Passwords never live in the file.
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

// Default value functions for serde
pub(crate) fn default_lock_dir() -> String {
    ".named-mutex/locks".to_string()
}
pub(crate) fn default_lock_stale_minutes() -> u32 {
    120
}
pub(crate) fn default_poll_interval_ms() -> u64 {
    100
}
pub(crate) fn default_password_env() -> String {
    "NAMED_MUTEX_ORACLE_PASSWORD".to_string()
}
pub(crate) fn default_true() -> bool {
    true
}
