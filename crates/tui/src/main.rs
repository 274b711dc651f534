mod app;

use std::fs::{self, OpenOptions};

use anyhow::Result;
use crail_core::{config, ApiClient, AppConfig};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    tracing::info!(server = %config.server_url, "starting crail client");

    let client = ApiClient::new(&config)?;
    let mut app = app::CrailApp::new(client);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("crail.log");

    let env_filter = EnvFilter::from_default_env();

    // No stdout layer: the terminal belongs to ratatui.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
