use axum::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::{NewUser, RecordStore, TableInfo, UserRecord, UserRow, TABLE};
use crate::error::RegistryError;

/// Record store backed by a hosted PostgREST endpoint (a Supabase project).
#[derive(Clone)]
pub struct RestRecordStore {
    client: Client,
    table_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: i64,
}

impl RestRecordStore {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    pub fn with_client(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            table_url: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), TABLE),
            api_key: api_key.to_string(),
        }
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Send a read and turn transport errors and non-2xx answers into `BackendUnavailable`.
    async fn read(&self, query: &[(&str, &str)]) -> Result<Response, RegistryError> {
        let res = self
            .request(Method::GET)
            .query(query)
            .send()
            .await
            .map_err(RegistryError::unavailable)?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(RegistryError::unavailable(format!("{status}: {body}")));
        }
        Ok(res)
    }
}

fn classify_write_status(status: StatusCode, body: String) -> RegistryError {
    if status.is_server_error() {
        RegistryError::unavailable(format!("{status}: {body}"))
    } else {
        RegistryError::rejected(format!("{status}: {body}"))
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    #[instrument(skip(self, user), fields(nombre = %user.name))]
    async fn insert(&self, user: &NewUser) -> Result<i64, RegistryError> {
        let res = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(user)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "insert request failed");
                RegistryError::unavailable(e)
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let err = classify_write_status(status, body);
            error!(error = %err, "insert failed");
            return Err(err);
        }

        let rows: Vec<InsertedRow> = res.json().await.map_err(|e| {
            error!(error = %e, "insert response not understood");
            RegistryError::rejected(e)
        })?;

        match rows.first() {
            Some(row) => {
                info!(id = row.id, "user inserted");
                Ok(row.id)
            }
            None => {
                warn!("insert returned no rows");
                Err(RegistryError::rejected("empty representation"))
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> Result<Vec<UserRecord>, RegistryError> {
        let res = self
            .read(&[("select", "*"), ("order", "fecha_registro.desc")])
            .await
            .inspect_err(|e| error!(error = %e, "list users failed"))?;
        let rows: Vec<UserRow> = res.json().await.map_err(|e| {
            error!(error = %e, "list response not understood");
            RegistryError::unavailable(e)
        })?;
        debug!(count = rows.len(), "users fetched");
        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn check_connectivity(&self) -> bool {
        match self.read(&[("select", "*"), ("limit", "1")]).await {
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
        let counts: Vec<CountRow> = self
            .read(&[("select", "count")])
            .await?
            .json()
            .await
            .map_err(RegistryError::unavailable)?;
        let sample: Vec<UserRow> = self
            .read(&[("select", "*"), ("limit", "1")])
            .await?
            .json()
            .await
            .map_err(RegistryError::unavailable)?;
        Ok(TableInfo {
            count: counts.first().map(|c| c.count).unwrap_or(0),
            sample: sample.into_iter().next().map(UserRecord::from),
        })
    }
}
