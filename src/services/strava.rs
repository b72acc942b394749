// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client and credential lifecycle.
//!
//! Handles:
//! - Activity fetching
//! - Token refresh when expired (persisted before use)
//! - OAuth code exchange
//! - Webhook push subscription management

use crate::config::Config;
use crate::error::AppError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    api_url: String,
    oauth_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials and base URLs from config.
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            api_url: config.strava_api_url.trim_end_matches('/').to_string(),
            oauth_url: config.strava_oauth_url.trim_end_matches('/').to_string(),
            client_id: config.strava_client_id.clone(),
            client_secret: config.strava_client_secret.clone(),
        }
    }

    /// Get a detailed activity by ID. `None` if Strava reports it gone.
    pub async fn get_activity(
        &self,
        access_token: &str,
        activity_id: &str,
    ) -> Result<Option<StravaActivity>, AppError> {
        let url = format!("{}/activities/{}", self.api_url, activity_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| fetch_error(None, e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        check_response_json(response).await.map(Some)
    }

    /// Refresh an expired access token.
    ///
    /// Anything but a 200 with a well-formed body is a `TokenRefreshFailed`.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::TokenRefreshFailed {
                status: 0,
                body: format!("Token refresh request failed: {}", e),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status != StatusCode::OK {
            return Err(AppError::TokenRefreshFailed {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| AppError::TokenRefreshFailed {
            status: status.as_u16(),
            body: format!("Malformed token response ({}): {}", e, body),
        })
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenExchangeResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/token", self.oauth_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| fetch_error(None, format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Strava token exchange failed");
            return Err(fetch_error(
                Some(status.as_u16()),
                format!("Token exchange failed with status {}", status),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| fetch_error(None, format!("Failed to parse token response: {}", e)))
    }

    /// Create the webhook push subscription for this application.
    pub async fn create_subscription(
        &self,
        callback_url: &str,
        verify_token: &str,
    ) -> Result<Subscription, AppError> {
        let response = self
            .http
            .post(format!("{}/push_subscriptions", self.api_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("callback_url", callback_url),
                ("verify_token", verify_token),
            ])
            .send()
            .await
            .map_err(|e| fetch_error(None, e.to_string()))?;

        check_response_json(response).await
    }

    /// List this application's push subscriptions.
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>, AppError> {
        let response = self
            .http
            .get(format!("{}/push_subscriptions", self.api_url))
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| fetch_error(None, e.to_string()))?;

        check_response_json(response).await
    }

    /// Delete a push subscription by ID.
    pub async fn delete_subscription(&self, subscription_id: u64) -> Result<(), AppError> {
        let response = self
            .http
            .delete(format!(
                "{}/push_subscriptions/{}",
                self.api_url, subscription_id
            ))
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| fetch_error(None, e.to_string()))?;

        check_response(response).await
    }
}

fn fetch_error(status: Option<u16>, message: String) -> AppError {
    AppError::UpstreamFetchFailed { status, message }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<(), AppError> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(status_error(response).await)
}

/// Check response and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(response).await);
    }

    response
        .json()
        .await
        .map_err(|e| fetch_error(Some(status.as_u16()), format!("JSON parse error: {}", e)))
}

/// Turn a non-success response into an error carrying status and body.
async fn status_error(response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!("Strava rate limit hit (429)");
    }

    fetch_error(Some(status.as_u16()), format!("HTTP {}: {}", status, body))
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

/// Token exchange response from Strava OAuth (includes athlete info).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub athlete: StravaAthlete,
}

/// Athlete info from OAuth token exchange.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}

/// Webhook push subscription.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Subscription {
    pub id: u64,
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Detailed Strava activity response (the fields the mapper consumes).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StravaActivity {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    /// Legacy activity type ("Hike", "Run", "WeightTraining", ...)
    #[serde(rename = "type", default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub sport_type: Option<String>,
    #[serde(default)]
    pub moving_time: Option<u64>,
    #[serde(default)]
    pub elapsed_time: Option<u64>,
    #[serde(default)]
    pub start_date_local: Option<String>,
    /// Meters
    #[serde(default)]
    pub distance: Option<f64>,
    /// Meters
    #[serde(default)]
    pub total_elevation_gain: Option<f64>,
    #[serde(default)]
    pub elev_high: Option<f64>,
    #[serde(default)]
    pub elev_low: Option<f64>,
    /// Meters per second
    #[serde(default)]
    pub average_speed: Option<f64>,
    #[serde(default)]
    pub max_speed: Option<f64>,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub max_heartrate: Option<f64>,
    /// Degrees Celsius
    #[serde(default)]
    pub average_temp: Option<f64>,
}

impl StravaActivity {
    /// Activity type, preferring the legacy `type` field over `sport_type`.
    pub fn kind(&self) -> Option<&str> {
        self.activity_type
            .as_deref()
            .or(self.sport_type.as_deref())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - High-level service with token management
// ─────────────────────────────────────────────────────────────────────────────

use crate::db::CredentialStore;
use crate::models::Credentials;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-user refresh locks, keyed by Strava athlete ID.
type RefreshLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// High-level Strava service that manages the token lifecycle and API calls.
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    store: Arc<dyn CredentialStore>,
    /// Per-user mutex to serialize token refresh operations.
    refresh_locks: RefreshLocks,
    expiry_margin_secs: i64,
}

impl StravaService {
    pub fn new(
        client: StravaClient,
        store: Arc<dyn CredentialStore>,
        expiry_margin_secs: i64,
    ) -> Self {
        Self {
            client,
            store,
            refresh_locks: Arc::new(DashMap::new()),
            expiry_margin_secs,
        }
    }

    pub fn client(&self) -> &StravaClient {
        &self.client
    }

    // ─── Token Management ────────────────────────────────────────────────────

    /// Get a valid (non-expired) access token for the given user.
    ///
    /// 1. Load credentials; a valid token is returned as-is
    /// 2. Otherwise take the per-user refresh lock and re-read (another
    ///    delivery may have refreshed while we waited)
    /// 3. Refresh with Strava, persist, then return the new token
    pub async fn ensure_valid_token(&self, user_id: &str) -> Result<String, AppError> {
        if user_id.is_empty() {
            return Err(AppError::InvalidArgument("user ID is required".to_string()));
        }

        let credentials = self.load_credentials(user_id).await?;
        if !self.is_expired(&credentials) {
            return Ok(credentials.access_token);
        }

        let lock = self
            .refresh_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let credentials = self.load_credentials(user_id).await?;
        if !self.is_expired(&credentials) {
            tracing::debug!(user_id, "Token already refreshed by a concurrent request");
            return Ok(credentials.access_token);
        }

        tracing::info!(
            user_id,
            expires_at = credentials.expires_at,
            "Access token expired, refreshing"
        );

        let new_tokens = match self.client.refresh_token(&credentials.refresh_token).await {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Error refreshing the tokens");
                return Err(e);
            }
        };

        let refreshed = Credentials {
            user_id: user_id.to_string(),
            access_token: new_tokens.access_token,
            refresh_token: new_tokens.refresh_token,
            expires_at: new_tokens.expires_at,
        };

        if let Err(e) = self.store.set(&refreshed).await {
            tracing::error!(
                user_id,
                error = %e,
                "Refreshed token could not be persisted"
            );
            return Err(AppError::CredentialPersistFailed(e.to_string()));
        }

        tracing::info!(user_id, expires_at = refreshed.expires_at, "Token refreshed and stored");
        Ok(refreshed.access_token)
    }

    async fn load_credentials(&self, user_id: &str) -> Result<Credentials, AppError> {
        self.store
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::CredentialsNotFound(user_id.to_string()))
    }

    fn is_expired(&self, credentials: &Credentials) -> bool {
        crate::units::is_expired(
            credentials.expires_at,
            chrono::Utc::now().timestamp(),
            self.expiry_margin_secs,
        )
    }

    // ─── API Wrappers ────────────────────────────────────────────────────────

    /// Fetch one activity. `None` means Strava no longer has it (nothing to do).
    pub async fn fetch_activity(
        &self,
        activity_id: &str,
        access_token: &str,
    ) -> Result<Option<StravaActivity>, AppError> {
        if activity_id.is_empty() {
            return Err(AppError::InvalidArgument(
                "activity ID is required".to_string(),
            ));
        }
        if access_token.is_empty() {
            return Err(AppError::InvalidArgument(
                "Strava access token is required to fetch activity".to_string(),
            ));
        }

        let activity = self.client.get_activity(access_token, activity_id).await?;
        if activity.is_none() {
            tracing::info!(activity_id, "Activity not found on Strava");
        }
        Ok(activity)
    }

    // ─── OAuth Callback Handling ─────────────────────────────────────────────

    /// Exchange an authorization code and store the athlete's credentials.
    pub async fn handle_oauth_callback(&self, code: &str) -> Result<OAuthResult, AppError> {
        let token_response = self.client.exchange_code(code).await?;
        let user_id = token_response.athlete.id.to_string();

        self.store
            .set(&Credentials {
                user_id: user_id.clone(),
                access_token: token_response.access_token,
                refresh_token: token_response.refresh_token,
                expires_at: token_response.expires_at,
            })
            .await?;

        tracing::info!(user_id = %user_id, "OAuth callback handled, credentials stored");

        Ok(OAuthResult {
            user_id,
            firstname: token_response.athlete.firstname,
        })
    }
}

/// Result of handling OAuth callback.
#[derive(Debug, Clone)]
pub struct OAuthResult {
    pub user_id: String,
    pub firstname: Option<String>,
}
