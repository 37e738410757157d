use axum::async_trait;

use crate::error::RegistryError;

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod rest;
pub mod timestamp;
pub mod types;

#[cfg(test)]
pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;
pub use rest::RestRecordStore;
pub use types::{NewUser, TableInfo, UserRecord, UserRow};

/// Table holding the registrations.
pub const TABLE: &str = "usuarios";

/// DDL for the table. It has to be run by hand on the backend; the service never executes it.
pub const CREATE_TABLE_SQL: &str = include_str!("../../sql/create_usuarios.sql");

/// Façade over the table backend.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert one row and return the id the backend assigned to it.
    async fn insert(&self, user: &NewUser) -> Result<i64, RegistryError>;

    /// All rows, newest `fecha_registro` first.
    async fn list_all(&self) -> Result<Vec<UserRecord>, RegistryError>;

    /// Read a single row to see whether the backend answers.
    async fn check_connectivity(&self) -> bool;

    async fn table_info(&self) -> Result<TableInfo, RegistryError>;
}
