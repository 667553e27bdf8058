//! named-mutex: mutexes identified by name, shared between processes.
//!
//! A named mutex is held in a store every cooperating process can reach:
//! Oracle's `DBMS_LOCK` user-lock service, a directory of lock files, or an
//! in-process lock table. Whoever holds the name holds the lock; everyone
//! else waits or gives up.
//!
//! ```no_run
//! use named_mutex::{MutexFactory, MutexOptions, NamedMutex};
//!
//! # fn main() -> named_mutex::Result<()> {
//! let factory = MutexFactory::file(".named-mutex/locks", MutexOptions::default());
//! let mut mutex = factory.create("nightly-report")?;
//!
//! if mutex.acquire(10)? {
//!     // ... exclusive work ...
//!     mutex.release()?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Acquisition that merely fails to get the lock returns `Ok(false)`; errors
//! are reserved for misconfiguration and store failures.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod factory;
pub mod file;
pub mod memory;
pub mod mode;
pub mod mutex;
pub mod oracle;
pub mod service;

#[cfg(test)]
mod test_support;

pub use error::{MutexError, Result};
pub use factory::MutexFactory;
pub use mode::LockMode;
pub use mutex::{
    LockGuard, LockRegistry, LockState, MutexOptions, NamedLock, NamedMutex, acquire_guard,
    with_lock,
};
pub use service::{LockRequest, LockService};
