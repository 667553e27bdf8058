//! Error types for named-mutex.
//!
//! Uses thiserror for derive macros. Contention is not an error: a lock that
//! could not be obtained is reported as `Ok(false)` by `acquire`.

use crate::exit_codes;
use thiserror::Error;

/// Error raised by a store connection. The original error is kept intact.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for named-mutex operations.
#[derive(Error, Debug)]
pub enum MutexError {
    /// The lock mode is not one of the six modes the lock service knows.
    #[error(
        "\"{value}\" is not valid lock mode for \"OracleMutex\". It must be one of the values of: {valid}."
    )]
    InvalidMode {
        /// The rejected value.
        value: String,
        /// The valid mode names, quoted and comma separated.
        valid: String,
    },

    /// The supplied connection does not belong to an Oracle driver.
    #[error("Oracle connection instance should be passed. Got \"{driver}\".")]
    IncompatibleDriver {
        /// Driver identity reported by the connection.
        driver: String,
    },

    /// Configuration could not be read, parsed, or validated.
    #[error("{0}")]
    Config(String),

    /// The store connection failed while executing a lock statement.
    #[error("lock store call failed: {0}")]
    Store(#[from] StoreError),

    /// Filesystem failure in the file backend.
    #[error("{context}: {source}")]
    Io {
        /// What was being done.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No lock file exists for the given name.
    #[error("no lock named \"{name}\" (expected '{}')", path.display())]
    LockNotFound {
        /// Lock name.
        name: String,
        /// Where the lock file was looked for.
        path: std::path::PathBuf,
    },

    /// `create_and_acquire` could not obtain the lock.
    #[error("Unable to acquire mutex \"{name}\".")]
    AcquireFailed {
        /// Lock name.
        name: String,
    },

    /// The backend refused to release a lock this instance held.
    #[error("Unable to release lock \"{name}\".")]
    Release {
        /// Lock name.
        name: String,
    },
}

impl MutexError {
    /// Build an `Io` error with a short description of the failed operation.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        MutexError::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            MutexError::InvalidMode { .. } => exit_codes::USER_ERROR,
            MutexError::IncompatibleDriver { .. } => exit_codes::USER_ERROR,
            MutexError::Config(_) => exit_codes::USER_ERROR,
            MutexError::Store(_) => exit_codes::STORE_FAILURE,
            MutexError::Io { .. } => exit_codes::STORE_FAILURE,
            MutexError::LockNotFound { .. } => exit_codes::USER_ERROR,
            MutexError::AcquireFailed { .. } => exit_codes::LOCK_FAILURE,
            MutexError::Release { .. } => exit_codes::RELEASE_FAILURE,
        }
    }
}

/// Result type alias for named-mutex operations.
pub type Result<T> = std::result::Result<T, MutexError>;
