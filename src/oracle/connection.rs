//! The connection seam between the lock client and an Oracle driver.

use crate::error::StoreError;

/// Name of the output bind that receives a block's integer result.
pub const STATUS_BIND: &str = "status";

/// An input value bound to a named placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindValue<'a> {
    /// Character data.
    Text(&'a str),
    /// Integer data.
    Integer(i64),
}

/// A connection able to run an anonymous PL/SQL block.
///
/// The connection is owned by the caller; the lock client only runs
/// statements on it and never closes or reconfigures it.
pub trait StoreConnection {
    /// Identity of the driver behind this connection (for example `oci`).
    fn driver_name(&self) -> String;

    /// Execute `block` with the given named input binds and return the
    /// integer assigned to the `:status` output bind.
    ///
    /// Bind names are given without the leading colon.
    fn execute_for_status(
        &self,
        block: &str,
        params: &[(&str, BindValue<'_>)],
    ) -> std::result::Result<i64, StoreError>;
}
