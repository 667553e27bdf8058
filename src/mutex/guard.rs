//! Scoped acquisition: RAII guard that releases on every exit path.

use super::NamedMutex;
use crate::error::Result;
use tracing::warn;

/// RAII guard for an acquired mutex.
///
/// When dropped, the lock is released. If the release fails during drop, a
/// warning is logged but no panic occurs.
#[derive(Debug)]
pub struct LockGuard<'a, M: NamedMutex + ?Sized> {
    mutex: &'a mut M,

    /// Whether the lock has been released manually.
    released: bool,
}

impl<'a, M: NamedMutex + ?Sized> LockGuard<'a, M> {
    /// Name of the guarded lock.
    pub fn name(&self) -> &str {
        self.mutex.name()
    }

    /// Manually release the lock.
    ///
    /// This is useful when you want to release the lock before the guard
    /// goes out of scope, and want to handle errors explicitly.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.mutex.release()
    }
}

impl<M: NamedMutex + ?Sized> Drop for LockGuard<'_, M> {
    fn drop(&mut self) {
        if !self.released
            && self.mutex.is_held()
            && let Err(e) = self.mutex.release()
        {
            warn!(lock = %self.mutex.name(), error = %e, "failed to release lock");
        }
    }
}

/// Acquire `mutex` and return a guard that releases it when dropped.
///
/// Returns `Ok(None)` when the lock could not be acquired within
/// `timeout_secs`.
pub fn acquire_guard<M: NamedMutex + ?Sized>(
    mutex: &mut M,
    timeout_secs: i64,
) -> Result<Option<LockGuard<'_, M>>> {
    if !mutex.acquire(timeout_secs)? {
        return Ok(None);
    }

    Ok(Some(LockGuard {
        mutex,
        released: false,
    }))
}

/// Run `f` while holding `mutex`.
///
/// Returns `Ok(None)` without running `f` when the lock was not acquired.
/// The lock is released after `f` returns, and also if `f` panics.
pub fn with_lock<M, T, F>(mutex: &mut M, timeout_secs: i64, f: F) -> Result<Option<T>>
where
    M: NamedMutex + ?Sized,
    F: FnOnce() -> T,
{
    let Some(guard) = acquire_guard(mutex, timeout_secs)? else {
        return Ok(None);
    };

    let value = f();
    guard.release()?;
    Ok(Some(value))
}
