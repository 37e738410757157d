mod app;
mod config;
mod error;
mod flash;
mod state;
mod store;
mod usuarios;
mod views;

use tracing::{debug, info, warn};

use crate::{config::AppConfig, state::AppState, store::CREATE_TABLE_SQL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "registro_usuarios=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let app_state = AppState::init(config)?;

    // Startup diagnostics only; the service starts even if the backend is down
    if app_state.store.check_connectivity().await {
        match app_state.store.table_info().await {
            Ok(table) => debug!(count = table.count, sample = ?table.sample, "usuarios table"),
            Err(e) => warn!(error = %e, "could not read table info"),
        }
    } else {
        warn!("backend not reachable at startup");
    }
    info!(
        "the usuarios table must exist on the backend; run this SQL once if it does not:\n{}",
        CREATE_TABLE_SQL
    );

    let config = app_state.config.clone();
    let app = app::build_app(app_state);
    app::serve(app, &config).await
}
