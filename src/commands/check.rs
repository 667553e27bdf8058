//! `named-mutex check`: probe whether a lock is free.

use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::Result;
use crate::exit_codes;
use crate::factory::MutexFactory;

/// Try the lock once without waiting and give it straight back.
///
/// Returns [`exit_codes::SUCCESS`] when free, [`exit_codes::LOCK_FAILURE`] when held.
pub fn cmd_check(config: &Config, args: CheckArgs) -> Result<i32> {
    let factory = MutexFactory::from_config(config)?;
    let mut mutex = factory.create(&args.name)?;

    if mutex.acquire(0)? {
        mutex.release()?;
        println!("{}: free", args.name);
        Ok(exit_codes::SUCCESS)
    } else {
        println!("{}: held", args.name);
        Ok(exit_codes::LOCK_FAILURE)
    }
}
