// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Detection of failures caused by revoked or invalid Strava credentials.

use crate::error::AppError;

/// Diagnostic classification: the user must reauthorize the application.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Strava reauthorization required for user {user_id}: {reason}")]
pub struct ReauthorizationRequired {
    pub user_id: String,
    pub reason: String,
}

/// Classify an error as a credential problem.
///
/// Matches 401/403 from Strava or a message mentioning authorization.
/// Notion failures are never classified; they say nothing about Strava access.
pub fn classify(error: &AppError, user_id: &str) -> Option<ReauthorizationRequired> {
    let from_strava = matches!(
        error,
        AppError::TokenRefreshFailed { .. } | AppError::UpstreamFetchFailed { .. }
    );
    if !from_strava {
        return None;
    }

    let by_status = matches!(error.upstream_status(), Some(401) | Some(403));
    let message = error.to_string();
    let by_message = message.to_lowercase().contains("authoriz");

    (by_status || by_message).then(|| ReauthorizationRequired {
        user_id: user_id.to_string(),
        reason: message,
    })
}

/// Log a distinct alert when `error` means the user's Strava access is gone.
///
/// Purely diagnostic: the caller still reports the failure as usual.
pub fn intercept(error: &AppError, user_id: &str) -> Option<ReauthorizationRequired> {
    let classified = classify(error, user_id)?;
    tracing::error!(
        user_id = %classified.user_id,
        reason = %classified.reason,
        reauthorization_required = true,
        "Strava credentials rejected, user must reauthorize"
    );
    Some(classified)
}
