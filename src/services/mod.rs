// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod index;
pub mod mapper;
pub mod notion;
pub mod reauth;
pub mod reconciler;
pub mod strava;

pub use notion::NotionClient;
pub use reconciler::{Outcome, Reconciler};
pub use strava::{OAuthResult, StravaClient, StravaService};

use crate::config::Config;
use crate::error::AppError;
use std::time::Duration;

/// Build the HTTP client shared by the Strava and Notion clients.
pub fn http_client(config: &Config) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))
}
