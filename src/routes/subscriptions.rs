// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava webhook push subscription management (admin only).

use crate::error::Result;
use crate::services::strava::Subscription;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/strava/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route("/strava/subscriptions/{id}", delete(delete_subscription))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Subscribe this service's `/webhook` endpoint to Strava events.
async fn create_subscription(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Subscription>)> {
    let callback_url = format!("{}/webhook", state.config.base_url);
    tracing::info!(callback_url = %callback_url, "Creating Strava push subscription");

    let subscription = state
        .strava
        .client()
        .create_subscription(&callback_url, &state.config.webhook_verify_token)
        .await?;

    tracing::info!(subscription_id = subscription.id, "Strava push subscription created");
    Ok((StatusCode::CREATED, Json(subscription)))
}

async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Subscription>>> {
    let subscriptions = state.strava.client().list_subscriptions().await?;
    Ok(Json(subscriptions))
}

async fn delete_subscription(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<MessageResponse>> {
    state.strava.client().delete_subscription(id).await?;
    tracing::info!(subscription_id = id, "Strava push subscription deleted");
    Ok(Json(MessageResponse {
        message: "Subscription successfully deleted.".to_string(),
    }))
}
