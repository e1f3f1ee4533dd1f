mod algorithms;
mod background;
mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod scheduler;
mod services;

use anyhow::Context;
use std::path::Path;

use crate::{config::Config, services::MasterServices};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize basic tracing subscriber
    tracing_subscriber::fmt::init();

    // Load configuration, from an explicit file if one is given
    let config = match std::env::args_os().nth(1) {
        Some(path) => Config::load_from(Path::new(&path))
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => Config::load().context("Failed to load configuration")?,
    };

    // In-memory services, shared by every handler
    let services = MasterServices::new(&config);
    let _cleaners = services.start_cleaners(&config);

    let app = routes::router(services, config.clone());

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind server to {}", address))?;
    tracing::info!("Master listening on {}", address);

    axum::serve(listener, app.into_make_service())
        .await
        .context("Failed to start server")?;
    Ok(())
}
