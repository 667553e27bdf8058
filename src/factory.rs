//! Builds named mutexes for one configured backend.
//!
//! Every mutex a factory creates shares the factory's [`LockRegistry`], so
//! two mutexes with the same name from one factory never both hold the lock.

use crate::config::{BackendKind, Config};
use crate::error::{MutexError, Result};
use crate::file::FileLockService;
use crate::memory::{InMemoryLockTable, InMemorySession};
use crate::mutex::{LockRegistry, MutexOptions, NamedLock, NamedMutex};
use crate::oracle::{OracleLockClient, StoreConnection};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
enum Backend {
    Oracle(OracleLockClient<dyn StoreConnection>),
    File(FileLockService),
    Memory(InMemorySession),
}

/// Creates mutexes bound to one backend with fixed options.
#[derive(Debug, Clone)]
pub struct MutexFactory {
    backend: Backend,
    options: MutexOptions,
    registry: Arc<LockRegistry>,
}

impl MutexFactory {
    /// Mutexes held in Oracle `DBMS_LOCK` through `connection`.
    ///
    /// The connection is checked once here; it must report an Oracle driver.
    pub fn oracle(connection: Arc<dyn StoreConnection>, options: MutexOptions) -> Result<Self> {
        let client = OracleLockClient::new(connection)?;
        Ok(Self::with_backend(Backend::Oracle(client), options))
    }

    /// Mutexes held as lock files in `dir`.
    pub fn file(dir: impl Into<PathBuf>, options: MutexOptions) -> Self {
        Self::with_backend(Backend::File(FileLockService::new(dir)), options)
    }

    /// Mutexes held in an in-process lock table through `session`.
    pub fn in_memory(session: InMemorySession, options: MutexOptions) -> Self {
        Self::with_backend(Backend::Memory(session), options)
    }

    /// Build the factory described by `config`.
    ///
    /// The `memory` backend gets a fresh table, so its locks only exclude
    /// other mutexes of this factory.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let options = config.mutex_options();

        let factory = match config.backend {
            BackendKind::File => {
                let service = FileLockService::new(&config.lock_dir)
                    .with_poll_interval(config.poll_interval());
                Self::with_backend(Backend::File(service), options)
            }
            BackendKind::Memory => {
                Self::in_memory(InMemoryLockTable::new().open_session(), options)
            }
            BackendKind::Oracle => Self::oracle(connect_oracle(config)?, options)?,
        };

        debug!(backend = %config.backend, mode = %options.mode, "mutex factory ready");
        Ok(factory)
    }

    fn with_backend(backend: Backend, options: MutexOptions) -> Self {
        Self {
            backend,
            options,
            registry: LockRegistry::shared(),
        }
    }

    /// Share `registry` with mutexes built elsewhere in the process.
    pub fn with_registry(mut self, registry: Arc<LockRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// The registry shared by this factory's mutexes.
    pub fn registry(&self) -> &Arc<LockRegistry> {
        &self.registry
    }

    /// Options applied to every mutex.
    pub fn options(&self) -> &MutexOptions {
        &self.options
    }

    /// Short name of the backend.
    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Oracle(_) => "oracle",
            Backend::File(_) => "file",
            Backend::Memory(_) => "memory",
        }
    }

    /// A free mutex called `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn NamedMutex>> {
        let registry = Arc::clone(&self.registry);
        let mutex: Box<dyn NamedMutex> = match &self.backend {
            Backend::Oracle(client) => Box::new(NamedLock::new(
                name,
                client.clone(),
                self.options,
                registry,
            )?),
            Backend::File(service) => Box::new(NamedLock::new(
                name,
                service.clone(),
                self.options,
                registry,
            )?),
            Backend::Memory(session) => Box::new(NamedLock::new(
                name,
                session.clone(),
                self.options,
                registry,
            )?),
        };
        Ok(mutex)
    }

    /// A mutex called `name` that already holds the lock.
    ///
    /// Fails with [`MutexError::AcquireFailed`] when the lock could not be
    /// obtained within `timeout_secs`.
    pub fn create_and_acquire(&self, name: &str, timeout_secs: i64) -> Result<Box<dyn NamedMutex>> {
        let mut mutex = self.create(name)?;
        if !mutex.acquire(timeout_secs)? {
            return Err(MutexError::AcquireFailed {
                name: name.to_string(),
            });
        }
        Ok(mutex)
    }
}

#[cfg(feature = "oracle")]
fn connect_oracle(config: &Config) -> Result<Arc<dyn StoreConnection>> {
    let settings = config.oracle.as_ref().ok_or_else(|| {
        MutexError::Config("backend 'oracle' requires an 'oracle' section".to_string())
    })?;
    Ok(Arc::new(crate::oracle::connect(settings)?))
}

#[cfg(not(feature = "oracle"))]
fn connect_oracle(_config: &Config) -> Result<Arc<dyn StoreConnection>> {
    Err(MutexError::Config(
        "backend 'oracle' is not available: built without the 'oracle' feature".to_string(),
    ))
}
