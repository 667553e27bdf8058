//! Exit code constants for the named-mutex CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid configuration)
//! - 3: Store or filesystem failure
//! - 4: Lock could not be acquired (or is held, for `check`)
//! - 5: Lock could not be released

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid mode, incompatible connection, bad config.
pub const USER_ERROR: i32 = 1;

/// Store or filesystem failure while talking to the lock backend.
pub const STORE_FAILURE: i32 = 3;

/// Lock acquisition failure: the lock is held elsewhere or the wait timed out.
pub const LOCK_FAILURE: i32 = 4;

/// Release failure: the backend refused to release a lock we believed we held.
pub const RELEASE_FAILURE: i32 = 5;
