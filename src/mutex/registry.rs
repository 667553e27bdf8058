//! Process-local record of the lock names this process believes it holds.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Set of lock names currently held by this process.
///
/// One registry is created per process (or per factory) and shared by every
/// mutex built from it. It is what makes a second in-process acquisition of
/// the same name fail deterministically, whatever the backend would allow.
#[derive(Debug, Default)]
pub struct LockRegistry {
    held: Mutex<HashSet<String>>,
}

impl LockRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry ready to be shared between mutexes.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Record `name` as held. Returns `false` if it was already recorded.
    pub fn mark_held(&self, name: &str) -> bool {
        self.entries().insert(name.to_string())
    }

    /// Forget `name`. Returns `false` if it was not recorded.
    pub fn mark_free(&self, name: &str) -> bool {
        self.entries().remove(name)
    }

    /// Whether `name` is recorded as held by this process.
    pub fn is_held_locally(&self, name: &str) -> bool {
        self.entries().contains(name)
    }

    /// Names currently recorded as held, sorted.
    pub fn held_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries().iter().cloned().collect();
        names.sort();
        names
    }

    fn entries(&self) -> MutexGuard<'_, HashSet<String>> {
        // A set of names cannot be left half-updated; recover from poisoning.
        self.held.lock().unwrap_or_else(|poison| poison.into_inner())
    }
}
