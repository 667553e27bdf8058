//! Lock-file backend: one file per lock name, created exclusively.

use super::metadata::LockMetadata;
use super::operations::lock_path;
use crate::error::{MutexError, Result};
use crate::mode::LockMode;
use crate::service::{LockRequest, LockService};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default delay between attempts while waiting for a busy lock file.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Lock files in a directory shared by every cooperating process.
///
/// A lock is held while its file exists. Files are created with
/// `create_new` semantics, so exactly one process wins a race.
///
/// Each acquisition writes a fresh token into the file and remembers it;
/// release removes the file only while it still carries that token. Clones
/// share the directory but not acquisitions.
#[derive(Debug)]
pub struct FileLockService {
    dir: PathBuf,
    poll_interval: Duration,
    tokens: Mutex<HashMap<String, String>>,
}

impl Clone for FileLockService {
    fn clone(&self) -> Self {
        Self {
            dir: self.dir.clone(),
            poll_interval: self.poll_interval,
            tokens: Mutex::default(),
        }
    }
}

impl FileLockService {
    /// Use `dir` as the lock directory. It is created on first acquisition.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            tokens: Mutex::default(),
        }
    }

    /// Set the delay between attempts while waiting for a busy lock.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn tokens(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.tokens.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Try once to create the lock file. `Ok(None)` means it already exists.
    fn try_create(&self, name: &str) -> Result<Option<LockMetadata>> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|e| {
                MutexError::io(
                    format!("failed to create lock directory '{}'", self.dir.display()),
                    e,
                )
            })?;
        }

        let path = lock_path(&self.dir, name);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(None),
            Err(e) => {
                return Err(MutexError::io(
                    format!("failed to create lock file '{}'", path.display()),
                    e,
                ));
            }
        };

        let metadata = LockMetadata::new(name);
        let json = metadata.to_json()?;
        let written = file.write_all(json.as_bytes()).and_then(|()| file.sync_all());
        if let Err(e) = written {
            // Do not leave a half-written lock behind.
            let _ = fs::remove_file(&path);
            return Err(MutexError::io(
                format!("failed to write lock file '{}'", path.display()),
                e,
            ));
        }

        Ok(Some(metadata))
    }
}

impl LockService for FileLockService {
    fn backend(&self) -> &'static str {
        "file"
    }

    fn supports_mode(&self, mode: LockMode) -> bool {
        mode == LockMode::Exclusive
    }

    fn request_lock(&self, name: &str, request: &LockRequest) -> Result<bool> {
        let deadline = Instant::now().checked_add(Duration::from_secs(request.timeout_secs));

        loop {
            if let Some(metadata) = self.try_create(name)? {
                self.tokens().insert(name.to_string(), metadata.token);
                return Ok(true);
            }

            let now = Instant::now();
            let wait = match deadline {
                Some(deadline) if now >= deadline => return Ok(false),
                Some(deadline) => self.poll_interval.min(deadline - now),
                None => self.poll_interval,
            };
            thread::sleep(wait);
        }
    }

    fn release_lock(&self, name: &str) -> Result<bool> {
        let path = lock_path(&self.dir, name);
        let Some(token) = self.tokens().get(name).cloned() else {
            warn!(lock = name, "no acquisition recorded, not releasing");
            return Ok(false);
        };

        let metadata = match LockMetadata::from_file(&path) {
            Ok(Some(metadata)) => metadata,
            Ok(None) => {
                warn!(lock = name, path = %path.display(), "lock file vanished before release");
                return Ok(false);
            }
            Err(e) => {
                warn!(lock = name, error = %e, "unreadable lock file, not releasing");
                return Ok(false);
            }
        };

        if metadata.token != token || !metadata.is_owned_by_current_process() {
            warn!(
                lock = name,
                owner = %metadata.owner,
                pid = metadata.pid,
                "lock file belongs to another holder"
            );
            return Ok(false);
        }

        fs::remove_file(&path).map_err(|e| {
            MutexError::io(format!("failed to release lock '{}'", path.display()), e)
        })?;
        self.tokens().remove(name);
        debug!(lock = name, path = %path.display(), "lock file removed");
        Ok(true)
    }
}
