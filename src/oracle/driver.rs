//! [`StoreConnection`] for connections of the `oracle` crate.

use super::connection::{BindValue, STATUS_BIND, StoreConnection};
use crate::config::OracleSettings;
use crate::error::{MutexError, Result, StoreError};
use oracle::sql_type::OracleType;

impl StoreConnection for oracle::Connection {
    fn driver_name(&self) -> String {
        "oci".to_string()
    }

    fn execute_for_status(
        &self,
        block: &str,
        params: &[(&str, BindValue<'_>)],
    ) -> std::result::Result<i64, StoreError> {
        let mut stmt = self.statement(block).build()?;
        stmt.bind(STATUS_BIND, &OracleType::Int64)?;

        for (name, value) in params {
            match value {
                BindValue::Text(text) => stmt.bind(*name, text)?,
                BindValue::Integer(number) => stmt.bind(*name, number)?,
            }
        }

        stmt.execute(&[])?;
        let status: i64 = stmt.bind_value(STATUS_BIND)?;
        Ok(status)
    }
}

/// Open a connection described by `settings`.
///
/// The password is read from the environment variable named by
/// `settings.password_env`.
pub fn connect(settings: &OracleSettings) -> Result<oracle::Connection> {
    let password = std::env::var(&settings.password_env).map_err(|_| {
        MutexError::Config(format!(
            "environment variable '{}' with the Oracle password is not set",
            settings.password_env
        ))
    })?;

    let connection = oracle::Connection::connect(
        &settings.username,
        &password,
        &settings.connect_string,
    )
    .map_err(|e| MutexError::Store(Box::new(e)))?;

    tracing::info!(
        connect_string = %settings.connect_string,
        username = %settings.username,
        "connected to Oracle"
    );
    Ok(connection)
}
