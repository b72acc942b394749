// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Notion Sync: mirror Strava activities into a Notion database
//!
//! This crate receives Strava webhook events and reconciles each one into a
//! create, update or archive of the matching Notion page.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod units;

use config::Config;
use services::{Reconciler, StravaService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub strava: StravaService,
    pub reconciler: Reconciler,
}

impl AppState {
    /// Wire the reconciler from already-built Strava and Notion services.
    pub fn new(config: Config, strava: StravaService, notion: services::NotionClient) -> Self {
        let reconciler = Reconciler::new(strava.clone(), notion);
        Self {
            config,
            strava,
            reconciler,
        }
    }
}
