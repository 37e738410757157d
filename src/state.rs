use crate::config::{AppConfig, BackendConfig};
use crate::store::{PgRecordStore, RecordStore, RestRecordStore};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = match &config.backend {
            BackendConfig::Rest { url, api_key } => {
                info!(url = %url, "using REST backend");
                Arc::new(RestRecordStore::new(url, api_key)?) as Arc<dyn RecordStore>
            }
            BackendConfig::Postgres { database_url } => {
                info!("using Postgres backend");
                Arc::new(PgRecordStore::connect_lazy(database_url)?) as Arc<dyn RecordStore>
            }
        };

        Ok(Self::from_parts(Arc::new(config), store))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn RecordStore>) -> Self {
        Self { config, store }
    }

    #[cfg(test)]
    pub fn fake(store: Arc<dyn RecordStore>) -> Self {
        let config = Arc::new(AppConfig {
            backend: BackendConfig::Rest {
                url: "http://fake.local".into(),
                api_key: "fake".into(),
            },
            secret_key: "test-secret".into(),
            host: "127.0.0.1".into(),
            port: 0,
        });
        Self::from_parts(config, store)
    }
}
