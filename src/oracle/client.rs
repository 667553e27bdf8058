//! `DBMS_LOCK` request/release client.

use super::connection::{BindValue, STATUS_BIND, StoreConnection};
use crate::error::{MutexError, Result};
use crate::mode::LockMode;
use crate::service::{LockRequest, LockService};
use std::sync::Arc;
use tracing::debug;

/// Driver identities accepted as Oracle connections.
pub const ORACLE_DRIVERS: [&str; 2] = ["oci", "odbc"];

/// Longest wait `DBMS_LOCK.REQUEST` accepts (`DBMS_LOCK.MAXWAIT`), in seconds.
pub const MAX_WAIT_SECS: u64 = 32767;

const RELEASE_BLOCK: &str = "DECLARE
    handle VARCHAR2(128);
BEGIN
    DBMS_LOCK.ALLOCATE_UNIQUE(:name, handle);
    :status := DBMS_LOCK.RELEASE(handle);
END;";

/// Build the request block for `mode`.
///
/// The mode constant is the only text spliced into the statement, and it
/// comes from the closed [`LockMode`] set. Everything else is bound.
fn request_block(mode: LockMode) -> String {
    format!(
        "DECLARE
    handle VARCHAR2(128);
BEGIN
    DBMS_LOCK.ALLOCATE_UNIQUE(:name, handle);
    :status := DBMS_LOCK.REQUEST(handle, DBMS_LOCK.{}, :timeout, :release_on_commit = 1);
END;",
        mode.store_constant()
    )
}

/// Meaning of a `DBMS_LOCK.REQUEST` result.
pub fn describe_request_status(code: i64) -> &'static str {
    match code {
        0 => "success",
        1 => "timeout",
        2 => "deadlock",
        3 => "parameter error",
        4 => "already own lock",
        5 => "illegal lock handle",
        _ => "unknown status",
    }
}

/// Meaning of a `DBMS_LOCK.RELEASE` result.
pub fn describe_release_status(code: i64) -> &'static str {
    match code {
        0 => "success",
        3 => "parameter error",
        4 => "do not own lock",
        5 => "illegal lock handle",
        _ => "unknown status",
    }
}

/// Client for the `DBMS_LOCK` user-lock service.
///
/// Stateless apart from the shared connection: the lock handle is derived
/// from the name on every call with `DBMS_LOCK.ALLOCATE_UNIQUE`, so one
/// client can serve any number of mutexes.
pub struct OracleLockClient<C: StoreConnection + ?Sized> {
    connection: Arc<C>,
}

impl<C: StoreConnection + ?Sized> OracleLockClient<C> {
    /// Wrap `connection` after checking it belongs to an Oracle driver.
    ///
    /// No statement is executed.
    pub fn new(connection: Arc<C>) -> Result<Self> {
        let driver = connection.driver_name();
        if !ORACLE_DRIVERS.contains(&driver.as_str()) {
            return Err(MutexError::IncompatibleDriver { driver });
        }

        Ok(Self { connection })
    }

    /// Request the lock called `name`.
    ///
    /// Blocks for at most `timeout_secs` (absolute value, capped at
    /// [`MAX_WAIT_SECS`]). Returns `Ok(true)` only when the store answers 0.
    pub fn request(
        &self,
        name: &str,
        mode: LockMode,
        timeout_secs: i64,
        release_on_commit: bool,
    ) -> Result<bool> {
        let timeout = timeout_secs.unsigned_abs().min(MAX_WAIT_SECS);
        let block = request_block(mode);

        let code = self.connection.execute_for_status(
            &block,
            &[
                ("name", BindValue::Text(name)),
                ("timeout", BindValue::Integer(timeout as i64)),
                ("release_on_commit", BindValue::Integer(i64::from(release_on_commit))),
            ],
        )?;

        debug!(
            lock = name,
            mode = %mode,
            timeout_secs = timeout,
            status = code,
            meaning = describe_request_status(code),
            "DBMS_LOCK.REQUEST"
        );
        Ok(code == 0)
    }

    /// Release the lock called `name`. Returns `Ok(true)` only when the store answers 0.
    pub fn release(&self, name: &str) -> Result<bool> {
        let code = self
            .connection
            .execute_for_status(RELEASE_BLOCK, &[("name", BindValue::Text(name))])?;

        debug!(
            lock = name,
            status = code,
            meaning = describe_release_status(code),
            "DBMS_LOCK.RELEASE"
        );
        Ok(code == 0)
    }
}

impl<C: StoreConnection + ?Sized> Clone for OracleLockClient<C> {
    fn clone(&self) -> Self {
        Self {
            connection: Arc::clone(&self.connection),
        }
    }
}

impl<C: StoreConnection + ?Sized> std::fmt::Debug for OracleLockClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleLockClient")
            .field("driver", &self.connection.driver_name())
            .finish()
    }
}

impl<C: StoreConnection + ?Sized> LockService for OracleLockClient<C> {
    fn backend(&self) -> &'static str {
        "oracle"
    }

    fn request_lock(&self, name: &str, request: &LockRequest) -> Result<bool> {
        // LockRequest carries an unsigned timeout; clamp before converting back.
        let timeout = request.timeout_secs.min(MAX_WAIT_SECS) as i64;
        self.request(name, request.mode, timeout, request.release_on_commit)
    }

    fn release_lock(&self, name: &str) -> Result<bool> {
        self.release(name)
    }
}
