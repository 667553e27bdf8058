//! Named mutexes.
//!
//! A named mutex coordinates processes that share nothing but a lock store.
//! This module holds the pieces that are the same for every store:
//!
//! - [`NamedMutex`]: the capability (`acquire`, `release`, `is_held`)
//! - [`NamedLock`]: the FREE/HELD state machine over a [`LockService`](crate::service::LockService)
//! - [`LockRegistry`]: the process-local set of held names
//! - [`LockGuard`]: scoped acquisition that releases on every exit path
//!
//! # Release semantics
//!
//! Releasing a free mutex is a no-op that never reaches the store. A release
//! the store refuses is an error naming the lock, and the mutex stays held.
//! When `auto_release` is set, a mutex dropped while held is released on a
//! best-effort basis: failures are logged, never raised.

mod guard;
mod named_lock;
mod registry;


use crate::error::Result;

pub use guard::{LockGuard, acquire_guard, with_lock};
pub use named_lock::{LockState, MutexOptions, NamedLock};
pub use registry::LockRegistry;

/// A mutex identified by name across every process sharing its store.
pub trait NamedMutex {
    /// The lock name.
    fn name(&self) -> &str;

    /// Try to acquire the lock, waiting at most `timeout_secs` seconds.
    ///
    /// Zero means a single non-blocking attempt; negative values are treated
    /// as their absolute value. Returns `Ok(false)` when the lock is held
    /// elsewhere, already held by this process, or the wait timed out.
    fn acquire(&mut self, timeout_secs: i64) -> Result<bool>;

    /// Release the lock if this instance holds it.
    fn release(&mut self) -> Result<()>;

    /// Whether this instance currently holds the lock.
    fn is_held(&self) -> bool;

    /// Whether this instance does not currently hold the lock.
    fn is_released(&self) -> bool {
        !self.is_held()
    }
}

impl<M: NamedMutex + ?Sized> NamedMutex for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn acquire(&mut self, timeout_secs: i64) -> Result<bool> {
        (**self).acquire(timeout_secs)
    }

    fn release(&mut self) -> Result<()> {
        (**self).release()
    }

    fn is_held(&self) -> bool {
        (**self).is_held()
    }
}
