// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook routes for Strava events.

use crate::models::WebhookEvent;
use crate::services::reconciler::{FlowFailure, Outcome};
use crate::AppState;
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Acknowledgement body returned to Strava for handled and ignored events.
pub const EVENT_RECEIVED: &str = "EVENT_RECEIVED";

/// Webhook routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhook", get(verify).post(handle_event))
}

/// Strava webhook verification query params.
#[derive(Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode", default)]
    mode: String,
    #[serde(rename = "hub.challenge", default)]
    challenge: String,
    #[serde(rename = "hub.verify_token", default)]
    verify_token: String,
}

/// Verification response.
#[derive(Serialize)]
struct VerifyResponse {
    #[serde(rename = "hub.challenge")]
    challenge: String,
}

/// Response body for event deliveries.
#[derive(Serialize)]
struct EventResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    reauthorize: bool,
}

impl EventResponse {
    fn received() -> Self {
        Self {
            message: EVENT_RECEIVED.to_string(),
            details: None,
            reauthorize: false,
        }
    }
}

/// Verify webhook subscription (GET).
async fn verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let expected = state.config.webhook_verify_token.as_str();
    if !expected.is_empty() && params.mode == "subscribe" && params.verify_token == expected {
        tracing::info!("Webhook subscription verified");
        (
            StatusCode::OK,
            Json(VerifyResponse {
                challenge: params.challenge,
            }),
        )
            .into_response()
    } else {
        tracing::warn!(
            mode = %params.mode,
            "Webhook verification failed: invalid mode or token"
        );
        (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "message": "Forbidden." })),
        )
            .into_response()
    }
}

/// Handle incoming webhook events (POST).
async fn handle_event(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> (StatusCode, Json<EventResponse>) {
    tracing::info!(payload = %payload, "Webhook event received (raw)");

    let event: WebhookEvent = match serde_json::from_value(payload) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(error = %e, "Failed to parse webhook event");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(EventResponse {
                    message: "Error processing Strava webhook event.".to_string(),
                    details: Some(e.to_string()),
                    reauthorize: false,
                }),
            );
        }
    };

    tracing::info!(
        object_type = %event.object_type,
        object_id = %event.object_id,
        aspect_type = %event.aspect_type,
        owner_id = %event.owner_id,
        "Webhook event parsed successfully"
    );

    match state.reconciler.handle(&event).await {
        Ok(outcome) => {
            log_outcome(&event, &outcome);
            (StatusCode::OK, Json(EventResponse::received()))
        }
        Err(FlowFailure {
            flow,
            error,
            reauthorization,
        }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(EventResponse {
                message: flow.failure_message().to_string(),
                details: Some(error.to_string()),
                reauthorize: reauthorization.is_some(),
            }),
        ),
    }
}

fn log_outcome(event: &WebhookEvent, outcome: &Outcome) {
    match outcome {
        Outcome::Created { page_id } | Outcome::Updated { page_id } | Outcome::Archived { page_id } => {
            tracing::info!(
                activity_id = %event.object_id,
                page_id = %page_id,
                outcome = ?outcome,
                "Webhook event reconciled"
            );
        }
        _ => {
            tracing::debug!(
                activity_id = %event.object_id,
                outcome = ?outcome,
                "Webhook event acknowledged without changes"
            );
        }
    }
}
