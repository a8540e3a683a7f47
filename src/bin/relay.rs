//! Voice Relay Server
//!
//! Serves the connection endpoint and admin API, and keeps every tenant's
//! player positions in sync with its game server.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spatial_voice_relay::{
    config::AppConfig,
    network::RconConnector,
    position::{Scheduler, Synchronizer},
    tenant::TenantRegistry,
    ui::WebServer,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Voice Relay");

    let config = AppConfig::discover(std::env::args().nth(1).map(PathBuf::from))?;
    if config.relay.debug {
        tracing::warn!("Debug mode: existence filtering is disabled");
    }

    let tenants = Arc::new(TenantRegistry::new());
    config.seed(&tenants)?;

    // Position synchronizer, one pass per tenant per tick
    let connector = Arc::new(RconConnector::new(config.io_timeout()));
    let sync = Arc::new(Synchronizer::new(connector, config.backoff()));
    let scheduler = Scheduler::new(tenants.clone(), sync, config.update_interval());
    let scheduler_handle = scheduler.start_background();

    // Start web UI
    let web_server = WebServer::new(config.ui.clone(), tenants.clone(), config.relay_settings());
    let web_handle = web_server.start_background();

    tracing::info!("Web UI available at http://{}:{}", config.ui.bind_address, config.ui.http_port);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    scheduler_handle.abort();
    web_handle.abort();
    tenants.shutdown_all().await;

    Ok(())
}
