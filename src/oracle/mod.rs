//! Oracle backend: named locks held by the `DBMS_LOCK` user-lock service.
//!
//! # Protocol
//!
//! Every call runs one anonymous PL/SQL block. The block first derives the
//! lock handle from the name with `DBMS_LOCK.ALLOCATE_UNIQUE` (idempotent,
//! same name gives the same handle) and then calls `DBMS_LOCK.REQUEST` or
//! `DBMS_LOCK.RELEASE`. The integer result lands in the `:status` bind:
//!
//! | status | `REQUEST`           | `RELEASE`           |
//! |--------|---------------------|---------------------|
//! | 0      | success             | success             |
//! | 1      | timeout             |                     |
//! | 2      | deadlock            |                     |
//! | 3      | parameter error     | parameter error     |
//! | 4      | already own lock    | do not own lock     |
//! | 5      | illegal lock handle | illegal lock handle |
//!
//! Locks belong to the database session, so they disappear when the session
//! ends even if nobody released them.
//!
//! # Driver
//!
//! The client talks to the database through [`StoreConnection`]. With the
//! `oracle` cargo feature, that trait is implemented for
//! `oracle::Connection`.

mod client;
mod connection;
#[cfg(feature = "oracle")]
mod driver;

#[cfg(test)]
mod tests;

pub use client::{
    MAX_WAIT_SECS, ORACLE_DRIVERS, OracleLockClient, describe_release_status,
    describe_request_status,
};
pub use connection::{BindValue, STATUS_BIND, StoreConnection};
#[cfg(feature = "oracle")]
pub use driver::connect;

use crate::error::Result;
use crate::mutex::{LockRegistry, MutexOptions, NamedLock};
use std::sync::Arc;

/// A named mutex held in `DBMS_LOCK`.
pub type OracleMutex<C> = NamedLock<OracleLockClient<C>>;

impl<C: StoreConnection + ?Sized> NamedLock<OracleLockClient<C>> {
    /// Bind a mutex called `name` to an Oracle connection.
    ///
    /// Fails with [`MutexError::IncompatibleDriver`](crate::error::MutexError::IncompatibleDriver)
    /// before touching the store when the connection is not an Oracle one.
    pub fn oracle(
        name: impl Into<String>,
        connection: Arc<C>,
        options: MutexOptions,
        registry: Arc<LockRegistry>,
    ) -> Result<Self> {
        let client = OracleLockClient::new(connection)?;
        NamedLock::new(name, client, options, registry)
    }
}
