//! Lock-file backend.
//!
//! Each lock is a file in a shared directory, named after the lock with
//! unsafe bytes percent-escaped (`jobs/nightly` becomes `jobs%2Fnightly.lock`).
//! Files are created using **create_new** semantics, so only one process can
//! hold a given lock at a time. Only exclusive mode is supported.
//!
//! # Lock Metadata
//!
//! Each lock file contains JSON metadata:
//! - `name`: The lock name as given by the caller
//! - `owner`: The owner of the lock (e.g., `user@HOST`)
//! - `pid`: The process ID of the holder
//! - `created_at`: RFC3339 timestamp
//! - `token`: Identifies the acquisition; release checks it before removing the file
//!
//! A process that dies while holding a lock leaves its file behind. Such
//! locks show up as stale in [`list_locks`] and can be removed with
//! [`clear_lock`].

mod metadata;
mod operations;
mod service;


use crate::mutex::NamedLock;

pub use metadata::LockMetadata;
pub use operations::{LOCK_EXTENSION, LockInfo, clear_lock, list_locks, lock_file_name, lock_path};
pub use service::{DEFAULT_POLL_INTERVAL, FileLockService};

/// A named mutex backed by lock files.
pub type FileMutex = NamedLock<FileLockService>;
