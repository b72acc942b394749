// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin bearer-token middleware for operator routes.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Require `Authorization: Bearer <ADMIN_TOKEN>`.
///
/// With no admin token configured every request is refused.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let expected = state.config.admin_token.as_bytes();
    if expected.is_empty() {
        tracing::warn!("Blocked admin request: ADMIN_TOKEN not configured");
        return Err(AppError::Forbidden);
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    if !bool::from(token.as_bytes().ct_eq(expected)) {
        tracing::warn!(path = %request.uri().path(), "Blocked admin request: invalid token");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
