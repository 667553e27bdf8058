//! The capability every lock backend provides.
//!
//! A backend knows how to ask its shared store for a named lock and how to
//! give it back. It keeps no per-lock state of its own; holder bookkeeping is
//! done by [`NamedLock`](crate::mutex::NamedLock).

use crate::error::Result;
use crate::mode::LockMode;

/// Parameters of a single acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockRequest {
    /// Requested lock mode.
    pub mode: LockMode,

    /// Maximum time to wait, in seconds. Zero means test-and-acquire.
    pub timeout_secs: u64,

    /// Whether the store should drop the lock when the current transaction commits.
    pub release_on_commit: bool,
}

/// A shared store that arbitrates named locks between processes.
pub trait LockService {
    /// Short backend name used in log output.
    fn backend(&self) -> &'static str;

    /// Whether this backend can honor `mode`.
    fn supports_mode(&self, _mode: LockMode) -> bool {
        true
    }

    /// Request the lock called `name`, blocking for at most `request.timeout_secs`.
    ///
    /// Returns `Ok(false)` when the lock was not granted (held elsewhere,
    /// timed out, or refused). Only failures to talk to the store are errors.
    fn request_lock(&self, name: &str, request: &LockRequest) -> Result<bool>;

    /// Release the lock called `name`.
    ///
    /// Returns `Ok(false)` when the store refused the release, for example
    /// because the caller does not own the lock.
    fn release_lock(&self, name: &str) -> Result<bool>;
}
