//! State machine for one named lock.

use super::NamedMutex;
use super::registry::LockRegistry;
use crate::error::{MutexError, Result};
use crate::mode::LockMode;
use crate::service::{LockRequest, LockService};
use std::sync::Arc;
use tracing::{debug, warn};

/// Options fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutexOptions {
    /// Mode requested from the store.
    pub mode: LockMode,

    /// Ask the store to drop the lock when the current transaction commits.
    pub release_on_commit: bool,

    /// Release the lock when the mutex is dropped while still held.
    pub auto_release: bool,
}

impl Default for MutexOptions {
    fn default() -> Self {
        Self {
            mode: LockMode::Exclusive,
            release_on_commit: false,
            auto_release: true,
        }
    }
}

/// Local view of the lock held through one mutex instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Not held by this instance.
    Free,
    /// Acquired by this instance and not yet released.
    Held,
}

/// A named mutex backed by a [`LockService`].
///
/// The store decides who really holds the lock; this type tracks what this
/// instance believes, and keeps the shared [`LockRegistry`] in step so that a
/// second acquisition of the same name inside the process is refused.
#[derive(Debug)]
pub struct NamedLock<S: LockService> {
    name: String,
    service: S,
    options: MutexOptions,
    registry: Arc<LockRegistry>,
    state: LockState,
}

impl<S: LockService> NamedLock<S> {
    /// Bind a mutex to `name` on `service`.
    ///
    /// Fails before any store interaction if the backend cannot honor the
    /// requested mode.
    pub fn new(
        name: impl Into<String>,
        service: S,
        options: MutexOptions,
        registry: Arc<LockRegistry>,
    ) -> Result<Self> {
        if !service.supports_mode(options.mode) {
            return Err(MutexError::Config(format!(
                "the {} backend does not support lock mode {}",
                service.backend(),
                options.mode
            )));
        }

        Ok(Self {
            name: name.into(),
            service,
            options,
            registry,
            state: LockState::Free,
        })
    }

    /// Options this mutex was built with.
    pub fn options(&self) -> &MutexOptions {
        &self.options
    }

    /// Current local state.
    pub fn state(&self) -> LockState {
        self.state
    }
}

impl<S: LockService> NamedMutex for NamedLock<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn acquire(&mut self, timeout_secs: i64) -> Result<bool> {
        // Claiming the name before contacting the store makes the check and
        // the registration one step, so two instances never both claim it.
        if self.state == LockState::Held || !self.registry.mark_held(&self.name) {
            debug!(lock = %self.name, "lock is already held by this process");
            return Ok(false);
        }

        let request = LockRequest {
            mode: self.options.mode,
            timeout_secs: timeout_secs.unsigned_abs(),
            release_on_commit: self.options.release_on_commit,
        };

        let granted = self.service.request_lock(&self.name, &request);
        if !matches!(granted, Ok(true)) {
            self.registry.mark_free(&self.name);
        }

        if !granted? {
            debug!(
                lock = %self.name,
                backend = self.service.backend(),
                timeout_secs = request.timeout_secs,
                "lock not acquired"
            );
            return Ok(false);
        }

        self.state = LockState::Held;
        debug!(lock = %self.name, backend = self.service.backend(), mode = %request.mode, "lock acquired");
        Ok(true)
    }

    fn release(&mut self) -> Result<()> {
        if self.state == LockState::Free {
            return Ok(());
        }

        // On failure the state stays Held: the store may still hold the lock.
        if !self.service.release_lock(&self.name)? {
            return Err(MutexError::Release {
                name: self.name.clone(),
            });
        }

        self.state = LockState::Free;
        self.registry.mark_free(&self.name);
        debug!(lock = %self.name, backend = self.service.backend(), "lock released");
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.state == LockState::Held
    }
}

impl<S: LockService> Drop for NamedLock<S> {
    fn drop(&mut self) {
        if self.state != LockState::Held {
            return;
        }

        if !self.options.auto_release {
            debug!(lock = %self.name, "auto release disabled, lock stays held");
            return;
        }

        // Best effort: failures are logged, never raised.
        if let Err(e) = self.release() {
            warn!(lock = %self.name, error = %e, "failed to release lock on drop");
        }
    }
}
