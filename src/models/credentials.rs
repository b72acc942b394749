// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user Strava OAuth credentials.

use serde::{Deserialize, Serialize};

/// OAuth credentials for one Strava athlete, as stored in the `tokens` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Credentials {
    /// Strava athlete ID (unique key)
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    /// When the access token expires (unix seconds); authoritative for `access_token`
    pub expires_at: i64,
}
