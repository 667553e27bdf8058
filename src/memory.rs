//! In-memory lock table.
//!
//! Models the store's lock table inside one process: named locks, holders
//! identified by session, the full mode compatibility matrix, blocking
//! requests with a timeout, and the store's numeric status codes. Useful for
//! tests and for coordinating threads of a single process.

use crate::error::Result;
use crate::mode::LockMode;
use crate::service::{LockRequest, LockService};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Status codes returned by the lock table, numbered like the store's.
pub mod status {
    /// The request or release succeeded.
    pub const SUCCESS: i64 = 0;
    /// The request timed out.
    pub const TIMEOUT: i64 = 1;
    /// Request: the session already owns the lock. Release: it does not own it.
    pub const OWNERSHIP: i64 = 4;
}

#[derive(Debug, Clone, Copy)]
struct Holder {
    session: u64,
    mode: LockMode,
}

/// Lock table shared by every session that should contend with each other.
#[derive(Debug, Default)]
pub struct InMemoryLockTable {
    locks: Mutex<HashMap<String, Vec<Holder>>>,
    wake: Condvar,
    next_session: AtomicU64,
}

impl InMemoryLockTable {
    /// Create an empty table.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Open a new session on this table.
    ///
    /// Locks belong to the session that requested them. When the last handle
    /// to a session is dropped, every lock it still holds is released.
    pub fn open_session(self: &Arc<Self>) -> InMemorySession {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed) + 1;
        InMemorySession {
            state: Arc::new(SessionState {
                table: Arc::clone(self),
                id,
            }),
        }
    }

    /// Request `name` in `mode` for `session`, waiting up to `timeout`.
    pub fn request(&self, session: u64, name: &str, mode: LockMode, timeout: Duration) -> i64 {
        // An unrepresentable deadline means waiting without limit.
        let deadline = Instant::now().checked_add(timeout);
        let mut locks = self.entries();

        loop {
            let holders = locks.get(name).map(Vec::as_slice).unwrap_or_default();

            if holders.iter().any(|h| h.session == session) {
                return status::OWNERSHIP;
            }

            if holders.iter().all(|h| h.mode.is_compatible_with(mode)) {
                locks
                    .entry(name.to_string())
                    .or_default()
                    .push(Holder { session, mode });
                return status::SUCCESS;
            }

            locks = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return status::TIMEOUT;
                    }
                    self.wake
                        .wait_timeout(locks, deadline - now)
                        .map(|(guard, _)| guard)
                        .unwrap_or_else(|poison| poison.into_inner().0)
                }
                None => self
                    .wake
                    .wait(locks)
                    .unwrap_or_else(|poison| poison.into_inner()),
            };
        }
    }

    /// Release `name` held by `session`.
    pub fn release(&self, session: u64, name: &str) -> i64 {
        let mut locks = self.entries();

        let Some(holders) = locks.get_mut(name) else {
            return status::OWNERSHIP;
        };
        let Some(index) = holders.iter().position(|h| h.session == session) else {
            return status::OWNERSHIP;
        };

        holders.swap_remove(index);
        if holders.is_empty() {
            locks.remove(name);
        }
        drop(locks);

        self.wake.notify_all();
        status::SUCCESS
    }

    /// Release every lock held by `session`. Returns how many were released.
    pub fn release_session(&self, session: u64) -> usize {
        let mut locks = self.entries();
        let mut released = 0;

        locks.retain(|_, holders| {
            let before = holders.len();
            holders.retain(|h| h.session != session);
            released += before - holders.len();
            !holders.is_empty()
        });
        drop(locks);

        if released > 0 {
            self.wake.notify_all();
        }
        released
    }

    /// Whether nobody holds `name`.
    pub fn is_free(&self, name: &str) -> bool {
        !self.entries().contains_key(name)
    }

    /// Number of sessions holding `name`.
    pub fn holder_count(&self, name: &str) -> usize {
        self.entries().get(name).map_or(0, Vec::len)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Vec<Holder>>> {
        self.locks.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}

#[derive(Debug)]
struct SessionState {
    table: Arc<InMemoryLockTable>,
    id: u64,
}

impl Drop for SessionState {
    fn drop(&mut self) {
        let released = self.table.release_session(self.id);
        if released > 0 {
            tracing::debug!(session = self.id, released, "session closed, locks released");
        }
    }
}

/// A session on an [`InMemoryLockTable`]. Cheap to clone; clones share the session.
#[derive(Debug, Clone)]
pub struct InMemorySession {
    state: Arc<SessionState>,
}

impl InMemorySession {
    /// Session identifier, unique within its table.
    pub fn id(&self) -> u64 {
        self.state.id
    }

    /// The table this session belongs to.
    pub fn table(&self) -> &Arc<InMemoryLockTable> {
        &self.state.table
    }
}

impl LockService for InMemorySession {
    fn backend(&self) -> &'static str {
        "memory"
    }

    // There are no transactions here, so `release_on_commit` has no effect.
    fn request_lock(&self, name: &str, request: &LockRequest) -> Result<bool> {
        let code = self.state.table.request(
            self.state.id,
            name,
            request.mode,
            Duration::from_secs(request.timeout_secs),
        );
        Ok(code == status::SUCCESS)
    }

    fn release_lock(&self, name: &str) -> Result<bool> {
        Ok(self.state.table.release(self.state.id, name) == status::SUCCESS)
    }
}
