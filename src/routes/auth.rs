// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava OAuth token exchange.
//!
//! Strava redirects here with a short-lived `code` after the athlete approves
//! the app; the code is exchanged for tokens that land in the credential store.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/auth/exchange_token",
        get(exchange_from_query).post(exchange_from_body),
    )
}

#[derive(Deserialize)]
pub struct ExchangeParams {
    #[serde(default)]
    code: Option<String>,
    /// Set by Strava when the athlete denied access
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
pub struct ExchangeResponse {
    pub message: String,
    pub user_id: String,
    pub subscribe_url: String,
}

/// OAuth redirect target (GET with `?code=`).
async fn exchange_from_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExchangeParams>,
) -> Result<Json<ExchangeResponse>> {
    exchange(&state, params).await
}

/// Same exchange with the code in a JSON body.
async fn exchange_from_body(
    State(state): State<Arc<AppState>>,
    Json(params): Json<ExchangeParams>,
) -> Result<Json<ExchangeResponse>> {
    exchange(&state, params).await
}

async fn exchange(state: &AppState, params: ExchangeParams) -> Result<Json<ExchangeResponse>> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "Strava authorization denied");
        return Err(AppError::BadRequest(format!(
            "Strava authorization denied: {}",
            error
        )));
    }

    let code = params
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("request query code from strava not found".to_string()))?;

    let result = state.strava.handle_oauth_callback(code.trim()).await?;

    tracing::info!(
        user_id = %result.user_id,
        firstname = ?result.firstname,
        "Strava account connected"
    );

    Ok(Json(ExchangeResponse {
        message: "Successfully exchanged tokens.".to_string(),
        user_id: result.user_id,
        subscribe_url: format!("{}/strava/subscriptions", state.config.base_url),
    }))
}
