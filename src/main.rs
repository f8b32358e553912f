// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PawTrail API Server
//!
//! Backend for live GPS tracking of dog walks, runs, and hikes, plus the
//! activity log and stats built from the recorded sessions.

use pawtrail::{config::Config, db::MemoryStore, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        tick_ms = config.tick_interval.as_millis() as u64,
        "Starting PawTrail API"
    );

    let store = Arc::new(MemoryStore::new());
    tracing::info!("Activity store initialized (in-memory)");

    let state = Arc::new(AppState::new(config.clone(), store));

    // Build router
    let app = pawtrail::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pawtrail=debug,info"));

    tracing_subscriber::registry().with(filter).with(format).init();
}
