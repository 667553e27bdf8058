//! Tests for the Oracle backend, run against a simulated `DBMS_LOCK` session.

use super::*;
use crate::error::MutexError;
use crate::memory::InMemoryLockTable;
use crate::mode::LockMode;
use crate::mutex::{LockRegistry, MutexOptions, NamedMutex, acquire_guard};
use crate::test_support::{SimulatedOracle, store_is_free};
use serial_test::serial;
use std::time::Instant;

struct Fixture {
    table: Arc<InMemoryLockTable>,
    connection: Arc<SimulatedOracle>,
    registry: Arc<LockRegistry>,
}

impl Fixture {
    fn new() -> Self {
        let table = InMemoryLockTable::new();
        let connection = Arc::new(SimulatedOracle::new(&table));
        Self {
            table,
            connection,
            registry: LockRegistry::shared(),
        }
    }

    fn mutex(&self, name: &str) -> OracleMutex<SimulatedOracle> {
        self.mutex_with(name, MutexOptions::default())
    }

    fn mutex_with(&self, name: &str, options: MutexOptions) -> OracleMutex<SimulatedOracle> {
        NamedLock::oracle(
            name,
            Arc::clone(&self.connection),
            options,
            Arc::clone(&self.registry),
        )
        .unwrap()
    }

    /// A mutex in another "process": its own session and registry.
    fn foreign_mutex(&self, name: &str) -> OracleMutex<SimulatedOracle> {
        let connection = Arc::new(SimulatedOracle::new(&self.table));
        NamedLock::oracle(
            name,
            connection,
            MutexOptions::default(),
            LockRegistry::shared(),
        )
        .unwrap()
    }

    fn is_free_locally(&self, name: &str) -> bool {
        !self.registry.is_held_locally(name)
    }
}

#[test]
fn test_mutex_acquire() {
    let fx = Fixture::new();
    let mut mutex = fx.mutex("testMutexAcquire");

    assert!(mutex.acquire(0).unwrap());
    mutex.release().unwrap();
}

#[test]
fn test_mutex_lock_is_working() {
    let fx = Fixture::new();
    let mut one = fx.mutex("testThatMutexLockIsWorking");
    let mut two = fx.mutex("testThatMutexLockIsWorking");

    assert!(one.acquire(0).unwrap());
    assert!(!two.acquire(0).unwrap());
    one.release().unwrap();
    two.release().unwrap();

    assert!(two.acquire(0).unwrap());
    two.release().unwrap();
}

#[test]
fn test_mutual_exclusion_across_processes() {
    let fx = Fixture::new();
    let mut ours = fx.mutex("shared");
    let mut theirs = fx.foreign_mutex("shared");

    assert!(ours.acquire(0).unwrap());
    assert!(!theirs.acquire(0).unwrap());

    ours.release().unwrap();
    assert!(theirs.acquire(0).unwrap());
    assert!(!ours.acquire(0).unwrap());
    theirs.release().unwrap();
}

#[test]
fn test_mutex_lock_on_the_same_instance() {
    let fx = Fixture::new();
    let mut mutex = fx.mutex("testThatMutexLockIsWorkingOnTheSameComponent");

    assert!(mutex.acquire(0).unwrap());
    assert!(!mutex.acquire(0).unwrap());

    mutex.release().unwrap();
    mutex.release().unwrap();
    assert!(store_is_free(&fx.table, "testThatMutexLockIsWorkingOnTheSameComponent"));
}

#[test]
fn test_second_acquire_does_not_reach_the_store() {
    let fx = Fixture::new();
    let mut one = fx.mutex("cached");
    let mut two = fx.mutex("cached");

    assert!(one.acquire(0).unwrap());
    let executed = fx.connection.executed();

    assert!(!one.acquire(0).unwrap());
    assert!(!two.acquire(0).unwrap());
    assert_eq!(fx.connection.executed(), executed);
}

#[test]
fn test_release_of_free_mutex_is_a_noop() {
    let fx = Fixture::new();
    let mut mutex = fx.mutex("never-acquired");

    mutex.release().unwrap();
    mutex.release().unwrap();
    assert_eq!(fx.connection.executed(), 0);
    assert!(mutex.is_released());
}

#[test]
#[serial]
fn test_timeout() {
    let fx = Fixture::new();
    let mut one = fx.mutex("testTimeout");
    let mut two = fx.foreign_mutex("testTimeout");

    assert!(one.acquire(0).unwrap());

    let started = Instant::now();
    assert!(!two.acquire(1).unwrap());
    let elapsed = started.elapsed().as_secs_f64();
    assert!((1.0..2.0).contains(&elapsed), "waited {}s", elapsed);

    one.release().unwrap();
    two.release().unwrap();
}

#[test]
#[serial]
fn test_negative_timeout_is_treated_as_positive() {
    let fx = Fixture::new();
    let mut one = fx.mutex("negative");
    let mut two = fx.foreign_mutex("negative");

    assert!(one.acquire(0).unwrap());

    let started = Instant::now();
    assert!(!two.acquire(-1).unwrap());
    assert!(started.elapsed().as_secs_f64() >= 1.0);
}

#[test]
fn test_free_lock() {
    let fx = Fixture::new();
    let name = "testFreeLock";
    let mut mutex = fx.mutex(name);

    assert!(mutex.acquire(0).unwrap());
    assert!(!fx.is_free_locally(name));
    assert!(!store_is_free(&fx.table, name));

    mutex.release().unwrap();
    assert!(fx.is_free_locally(name));
    assert!(store_is_free(&fx.table, name));

    assert!(mutex.acquire(0).unwrap());
    mutex.release().unwrap();
}

#[test]
fn test_drop_releases_held_lock() {
    let fx = Fixture::new();
    let name = "testDestruct";
    let mut mutex = fx.mutex(name);

    assert!(mutex.acquire(0).unwrap());
    assert!(!fx.is_free_locally(name));

    drop(mutex);

    // Releasing again from the same session reports "do not own lock".
    let client = OracleLockClient::new(Arc::clone(&fx.connection)).unwrap();
    assert!(!client.release(name).unwrap());
    assert!(fx.is_free_locally(name));
    assert!(store_is_free(&fx.table, name));
}

#[test]
fn test_drop_without_auto_release_keeps_lock_until_session_ends() {
    let fx = Fixture::new();
    let name = "keep-held";
    let options = MutexOptions {
        auto_release: false,
        ..MutexOptions::default()
    };

    let session = Arc::new(SimulatedOracle::new(&fx.table));
    let mut mutex = NamedLock::oracle(name, Arc::clone(&session), options, LockRegistry::shared())
        .unwrap();
    assert!(mutex.acquire(0).unwrap());

    drop(mutex);
    assert!(!store_is_free(&fx.table, name));
    assert!(!fx.foreign_mutex(name).acquire(0).unwrap());

    drop(session);
    assert!(store_is_free(&fx.table, name));
}

#[test]
fn test_guard_releases_on_scope_exit() {
    let fx = Fixture::new();
    let name = "guarded";
    let mut mutex = fx.mutex(name);

    {
        let guard = acquire_guard(&mut mutex, 0).unwrap().expect("lock should be free");
        assert_eq!(guard.name(), name);
        assert!(!store_is_free(&fx.table, name));
    }

    assert!(store_is_free(&fx.table, name));
    assert!(mutex.is_released());
}

#[test]
fn test_incorrect_driver_is_rejected() {
    let table = InMemoryLockTable::new();
    let connection = Arc::new(SimulatedOracle::with_driver(&table, "mysql"));

    let err = NamedLock::oracle(
        "testConstructorFailureForIncorrectDriver",
        Arc::clone(&connection),
        MutexOptions::default(),
        LockRegistry::shared(),
    )
    .unwrap_err();

    assert!(matches!(err, MutexError::IncompatibleDriver { ref driver } if driver == "mysql"));
    assert_eq!(
        err.to_string(),
        "Oracle connection instance should be passed. Got \"mysql\"."
    );
    assert_eq!(connection.executed(), 0);
}

#[test]
fn test_odbc_driver_is_accepted() {
    let table = InMemoryLockTable::new();
    let connection = Arc::new(SimulatedOracle::with_driver(&table, "odbc"));
    assert!(OracleLockClient::new(connection).is_ok());
}

#[test]
fn test_incorrect_lock_mode_is_rejected_before_store_access() {
    let fx = Fixture::new();

    let err = "incorrect-mode"
        .parse::<LockMode>()
        .and_then(|mode| {
            NamedLock::oracle(
                "testConstructorFailureForIncorrectLockMode",
                Arc::clone(&fx.connection),
                MutexOptions {
                    mode,
                    ..MutexOptions::default()
                },
                Arc::clone(&fx.registry),
            )
        })
        .unwrap_err();

    let message = err.to_string();
    for mode in LockMode::ALL {
        assert!(message.contains(&format!("\"{}\"", mode.store_constant())));
    }
    assert!(message.starts_with("\"incorrect-mode\" is not valid lock mode"));
    assert_eq!(fx.connection.executed(), 0);
}

#[test]
fn test_share_mode_holders_coexist_across_sessions() {
    let fx = Fixture::new();
    let share = MutexOptions {
        mode: LockMode::Share,
        ..MutexOptions::default()
    };

    let other = Arc::new(SimulatedOracle::new(&fx.table));
    let mut reader_one = fx.mutex_with("catalog", share);
    let mut reader_two =
        NamedLock::oracle("catalog", other, share, LockRegistry::shared()).unwrap();
    let mut writer = fx.foreign_mutex("catalog");

    assert!(reader_one.acquire(0).unwrap());
    assert!(reader_two.acquire(0).unwrap());
    assert!(!writer.acquire(0).unwrap());

    reader_one.release().unwrap();
    reader_two.release().unwrap();
    assert!(writer.acquire(0).unwrap());
}

#[test]
fn test_store_failure_propagates() {
    let fx = Fixture::new();
    let mut mutex = fx.mutex("broken");

    fx.connection.fail_next_call();
    let err = mutex.acquire(0).unwrap_err();
    assert!(matches!(err, MutexError::Store(_)));
    assert!(err.to_string().contains("ORA-03113"));
    assert!(mutex.is_released());
    assert!(fx.is_free_locally("broken"));
}

#[test]
fn test_failed_release_is_an_error_and_keeps_state() {
    let fx = Fixture::new();
    let name = "stolen";
    let mut mutex = fx.mutex(name);
    assert!(mutex.acquire(0).unwrap());

    // Someone else's session cannot release it for us; simulate the lock
    // vanishing behind our back by releasing it through our own session.
    let client = OracleLockClient::new(Arc::clone(&fx.connection)).unwrap();
    assert!(client.release(name).unwrap());

    let err = mutex.release().unwrap_err();
    assert!(matches!(err, MutexError::Release { ref name } if name == "stolen"));
    assert!(mutex.is_held());
    assert!(!fx.is_free_locally(name));
}

#[test]
fn test_timeout_is_capped_at_max_wait() {
    let fx = Fixture::new();
    let client = OracleLockClient::new(Arc::clone(&fx.connection)).unwrap();

    // A free lock is granted immediately whatever the timeout.
    assert!(client.request("capped", LockMode::Exclusive, i64::MIN, false).unwrap());
    assert_eq!(fx.connection.last_timeout(), MAX_WAIT_SECS as i64);
    assert!(client.release("capped").unwrap());

    assert!(client.request("capped", LockMode::Exclusive, 40_000, false).unwrap());
    assert_eq!(fx.connection.last_timeout(), MAX_WAIT_SECS as i64);
    assert!(client.release("capped").unwrap());

    assert!(client.request("capped", LockMode::Exclusive, -7, false).unwrap());
    assert_eq!(fx.connection.last_timeout(), 7);
    assert!(client.release("capped").unwrap());
}
