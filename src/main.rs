// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Notion Sync API Server
//!
//! Receives Strava webhook events and mirrors the athlete's activities into
//! a Notion database.

use std::sync::Arc;
use strava_notion_sync::{
    config::Config,
    db::{CredentialStore, PgCredentialStore},
    services::{http_client, NotionClient, StravaClient, StravaService},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Strava-Notion Sync");

    if config.admin_token.is_empty() {
        tracing::warn!("ADMIN_TOKEN not set, subscription management is disabled");
    }

    // Credential store
    let store: Arc<dyn CredentialStore> =
        Arc::new(PgCredentialStore::connect(&config.database_url).await?);

    // Outbound clients share one connection pool
    let http = http_client(&config)?;
    let strava = StravaService::new(
        StravaClient::new(http.clone(), &config),
        store,
        config.token_expiry_margin_secs,
    );
    let notion = NotionClient::new(http, &config);
    tracing::info!(
        database_id = %config.notion_database_id,
        exercises_database = config.notion_exercises_database_id.is_some(),
        "Notion client initialized"
    );

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), strava, notion));

    // Build router
    let app = strava_notion_sync::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strava_notion_sync=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
