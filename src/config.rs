use anyhow::{bail, Context};
use tracing::warn;

const DEV_SECRET_KEY: &str = "dev-secret-change-me";

/// Which backend the record store talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// Hosted PostgREST endpoint (Supabase project URL + API key).
    Rest { url: String, api_key: String },
    /// Direct Postgres connection.
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub secret_key: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match get("DATABASE_URL") {
            Some(database_url) => BackendConfig::Postgres { database_url },
            None => {
                let url = get("SUPABASE_URL");
                let api_key = get("SUPABASE_KEY");
                match (url, api_key) {
                    (Some(url), Some(api_key)) => BackendConfig::Rest { url, api_key },
                    (None, _) => bail!("SUPABASE_URL is not set (or set DATABASE_URL)"),
                    (_, None) => bail!("SUPABASE_KEY is not set"),
                }
            }
        };

        let secret_key = get("SECRET_KEY").unwrap_or_else(|| {
            warn!("SECRET_KEY not set; flash notices are signed with a development key");
            DEV_SECRET_KEY.into()
        });

        let port = match get("APP_PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("invalid APP_PORT {v:?}"))?,
            None => 5000,
        };

        Ok(Self {
            backend,
            secret_key,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
        })
    }
}
