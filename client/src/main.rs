mod config;
mod stat;
mod tui;

use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::ClientConfig;
use stat::HttpLedgerStore;

fn main() -> Result<()> {
    if std::env::var("ENV").ok().as_deref() != Some("prod") {
        dotenvy::dotenv().ok();
    }
    let config = ClientConfig::from_env()?;

    // the terminal belongs to the UI, so logs go to a file
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    let store = HttpLedgerStore::new(&config.base_url, config.timeout)?;
    info!(base_url = %config.base_url, "starting sales client");
    tui::run_tui(Arc::new(store), &config)
}
