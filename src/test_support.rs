use crate::config::CONFIG_ENV;
use crate::error::StoreError;
use crate::memory::{InMemoryLockTable, InMemorySession, status};
use crate::mode::LockMode;
use crate::oracle::{BindValue, StoreConnection};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};
use std::time::Duration;

/// A database session that runs the lock blocks the Oracle client generates
/// against an in-memory lock table, answering with `DBMS_LOCK` status codes.
///
/// Each instance is one session: locks it holds vanish when it is dropped,
/// like a session ending.
pub(crate) struct SimulatedOracle {
    session: InMemorySession,
    driver: String,
    executed: AtomicUsize,
    fail_next: AtomicBool,
    last_timeout: AtomicI64,
}

impl SimulatedOracle {
    pub(crate) fn new(table: &Arc<InMemoryLockTable>) -> Self {
        Self::with_driver(table, "oci")
    }

    pub(crate) fn with_driver(table: &Arc<InMemoryLockTable>, driver: &str) -> Self {
        Self {
            session: table.open_session(),
            driver: driver.to_string(),
            executed: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            last_timeout: AtomicI64::new(-1),
        }
    }

    /// Number of blocks executed so far.
    pub(crate) fn executed(&self) -> usize {
        self.executed.load(Ordering::SeqCst)
    }

    /// The `:timeout` bound by the most recent request, or -1 before any.
    pub(crate) fn last_timeout(&self) -> i64 {
        self.last_timeout.load(Ordering::SeqCst)
    }

    /// Make the next call fail as if the connection dropped.
    pub(crate) fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn mode_of(block: &str) -> Option<LockMode> {
        LockMode::ALL
            .into_iter()
            .find(|m| block.contains(&format!("DBMS_LOCK.{},", m.store_constant())))
    }
}

fn text<'a>(params: &[(&str, BindValue<'a>)], name: &str) -> Result<&'a str, StoreError> {
    params
        .iter()
        .find_map(|(n, v)| match v {
            BindValue::Text(t) if *n == name => Some(*t),
            _ => None,
        })
        .ok_or_else(|| format!("ORA-01008: not all variables bound ({})", name).into())
}

fn integer(params: &[(&str, BindValue<'_>)], name: &str) -> Result<i64, StoreError> {
    params
        .iter()
        .find_map(|(n, v)| match v {
            BindValue::Integer(i) if *n == name => Some(*i),
            _ => None,
        })
        .ok_or_else(|| format!("ORA-01008: not all variables bound ({})", name).into())
}

impl StoreConnection for SimulatedOracle {
    fn driver_name(&self) -> String {
        self.driver.clone()
    }

    fn execute_for_status(
        &self,
        block: &str,
        params: &[(&str, BindValue<'_>)],
    ) -> Result<i64, StoreError> {
        self.executed.fetch_add(1, Ordering::SeqCst);

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err("ORA-03113: end-of-file on communication channel".into());
        }

        let name = text(params, "name")?;
        let table = self.session.table();

        if block.contains("DBMS_LOCK.REQUEST") {
            let Some(mode) = Self::mode_of(block) else {
                return Ok(3);
            };
            let timeout = integer(params, "timeout")?;
            self.last_timeout.store(timeout, Ordering::SeqCst);
            if timeout < 0 {
                return Ok(3);
            }
            integer(params, "release_on_commit")?;
            Ok(table.request(
                self.session.id(),
                name,
                mode,
                Duration::from_secs(timeout as u64),
            ))
        } else if block.contains("DBMS_LOCK.RELEASE") {
            Ok(table.release(self.session.id(), name))
        } else {
            Err(format!("ORA-06550: unexpected block: {}", block).into())
        }
    }
}

/// Whether `name` is free in the store, as seen by a fresh session.
pub(crate) fn store_is_free(table: &Arc<InMemoryLockTable>, name: &str) -> bool {
    let probe = table.open_session();
    let code = table.request(probe.id(), name, LockMode::Exclusive, Duration::ZERO);
    if code == status::SUCCESS {
        table.release(probe.id(), name);
        true
    } else {
        false
    }
}

static PROCESS_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Changes the working directory and clears `NAMED_MUTEX_CONFIG` for the
/// lifetime of the guard.
pub(crate) struct DirGuard {
    original: PathBuf,
    original_env: Option<OsString>,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // The working directory and environment are process-global.
        let lock = PROCESS_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        let original_env = std::env::var_os(CONFIG_ENV);
        std::env::set_current_dir(new_dir).unwrap();
        // SAFETY: PROCESS_LOCK serializes every test touching the environment.
        unsafe { std::env::remove_var(CONFIG_ENV) };
        Self {
            original,
            original_env,
            _lock: lock,
        }
    }

    /// Point `NAMED_MUTEX_CONFIG` at `path` until the guard drops.
    pub(crate) fn set_config_env(&self, path: &Path) {
        // SAFETY: the guard holds PROCESS_LOCK.
        unsafe { std::env::set_var(CONFIG_ENV, path) };
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
        // SAFETY: the guard still holds PROCESS_LOCK.
        match &self.original_env {
            Some(value) => unsafe { std::env::set_var(CONFIG_ENV, value) },
            None => unsafe { std::env::remove_var(CONFIG_ENV) },
        }
    }
}
