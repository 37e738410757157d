use axum::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, error, info, instrument, warn};

use super::{NewUser, RecordStore, TableInfo, UserRecord, UserRow};
use crate::error::RegistryError;

/// Record store talking to Postgres directly.
///
/// Timestamps are selected as text so they go through the same conversion
/// as the REST backend.
#[derive(Clone)]
pub struct PgRecordStore {
    db: PgPool,
}

impl PgRecordStore {
    /// Builds the pool without connecting; the first query opens a connection.
    pub fn connect_lazy(database_url: &str) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect_lazy(database_url)?;
        Ok(Self::from_pool(db))
    }

    pub fn from_pool(db: PgPool) -> Self {
        Self { db }
    }
}

/// Constraint violations and other answers from the server mean the row was refused;
/// anything else (io, tls, pool timeouts) means we never got that far.
fn classify_write_error(e: sqlx::Error) -> RegistryError {
    match e {
        sqlx::Error::Database(db) => RegistryError::rejected(db),
        other => RegistryError::unavailable(other),
    }
}

const SELECT_USERS: &str = r#"
    SELECT id::int8 AS id, nombre, telefono, pais, fecha_registro::text AS fecha_registro
    FROM usuarios
"#;

// qualified so the ordering uses the timestamp column, not the text alias
fn list_users_sql() -> String {
    format!("{SELECT_USERS} ORDER BY usuarios.fecha_registro DESC")
}

#[async_trait]
impl RecordStore for PgRecordStore {
    #[instrument(skip(self, user), fields(nombre = %user.name))]
    async fn insert(&self, user: &NewUser) -> Result<i64, RegistryError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO usuarios (nombre, telefono, pais)
            VALUES ($1, $2, $3)
            RETURNING id::int8
            "#,
        )
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.country)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!(error = %e, "insert user failed");
            classify_write_error(e)
        })?;

        match id {
            Some(id) => {
                info!(id, "user inserted");
                Ok(id)
            }
            None => {
                warn!("insert returned no rows");
                Err(RegistryError::rejected("no row returned"))
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<UserRecord>, RegistryError> {
        let sql = list_users_sql();
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, "list users failed");
                RegistryError::unavailable(e)
            })?;
        debug!(count = rows.len(), "users fetched");
        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn check_connectivity(&self) -> bool {
        let sql = format!("{SELECT_USERS} LIMIT 1");
        match sqlx::query_as::<_, UserRow>(&sql)
            .fetch_optional(&self.db)
            .await
        {
            Ok(_) => {
                info!("backend reachable");
                true
            }
            Err(e) => {
                error!(error = %e, "connectivity check failed");
                false
            }
        }
    }

    #[instrument(skip(self))]
    async fn table_info(&self) -> Result<TableInfo, RegistryError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM usuarios")
            .fetch_one(&self.db)
            .await
            .map_err(RegistryError::unavailable)?;
        let sql = format!("{SELECT_USERS} LIMIT 1");
        let sample = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_optional(&self.db)
            .await
            .map_err(RegistryError::unavailable)?;
        Ok(TableInfo {
            count,
            sample: sample.map(UserRecord::from),
        })
    }
}
