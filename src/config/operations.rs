//! Config loading, validation, and utility operations.

use super::model::Config;
use super::types::{BackendKind, CONFIG_ENV, DEFAULT_CONFIG_FILE};
use crate::error::{MutexError, Result};
use crate::mode::LockMode;
use crate::mutex::MutexOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(MutexError::Config)` - Read or parse error, or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            MutexError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    ///
    /// An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| MutexError::Config(format!("failed to parse config YAML: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| MutexError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Find and load the config for this invocation.
    ///
    /// Lookup order:
    /// 1. `explicit` (the `--config` flag)
    /// 2. The file named by `NAMED_MUTEX_CONFIG`
    /// 3. `named-mutex.yaml` in the current directory
    /// 4. Built-in defaults
    ///
    /// A file named by the flag or the environment must exist.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config from --config");
            return Self::load(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            let path = PathBuf::from(path);
            debug!(path = %path.display(), "loading config from {}", CONFIG_ENV);
            return Self::load(path);
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            debug!(path = %local.display(), "loading config from working directory");
            return Self::load(local);
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `lock_stale_minutes` must be positive
    /// - `poll_interval_ms` must be positive
    /// - the file backend supports only mode `X` and no `release_on_commit`
    /// - the oracle backend needs an `oracle` section
    pub fn validate(&self) -> Result<()> {
        if self.lock_stale_minutes == 0 {
            return Err(MutexError::Config(
                "config validation failed: lock_stale_minutes must be greater than 0".to_string(),
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(MutexError::Config(
                "config validation failed: poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        match self.backend {
            BackendKind::File => {
                if self.mode != LockMode::Exclusive {
                    return Err(MutexError::Config(format!(
                        "config validation failed: the file backend only supports mode X (found '{}')",
                        self.mode
                    )));
                }
                if self.release_on_commit {
                    return Err(MutexError::Config(
                        "config validation failed: release_on_commit requires the oracle backend"
                            .to_string(),
                    ));
                }
            }
            BackendKind::Oracle => {
                if self.oracle.is_none() {
                    return Err(MutexError::Config(
                        "config validation failed: backend 'oracle' requires an 'oracle' section"
                            .to_string(),
                    ));
                }
            }
            BackendKind::Memory => {}
        }

        Ok(())
    }

    /// Options applied to every mutex built from this config.
    pub fn mutex_options(&self) -> MutexOptions {
        MutexOptions {
            mode: self.mode,
            release_on_commit: self.release_on_commit,
            auto_release: self.auto_release,
        }
    }

    /// Delay between attempts while waiting for a busy lock file.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
