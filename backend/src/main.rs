mod routes;
mod services;
mod store;

use std::sync::Arc;

use salesbook::config::StoreConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::routes::AppState;
use crate::store::PgLedgerStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("ENV").ok().as_deref() != Some("prod") {
        dotenvy::dotenv().ok();
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = StoreConfig::from_env()?;
    let store = PgLedgerStore::connect(&config).await?;
    store.ensure_schema().await?;
    let state = AppState {
        store: Arc::new(store),
    };

    let app = routes::app().with_state(state);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
