// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use strava_notion_sync::config::Config;
use strava_notion_sync::db::{CredentialStore, MemoryCredentialStore};
use strava_notion_sync::models::Credentials;
use strava_notion_sync::routes::create_router;
use strava_notion_sync::services::{http_client, NotionClient, StravaClient, StravaService};
use strava_notion_sync::AppState;
use tower::ServiceExt;
use wiremock::MockServer;

/// Athlete seeded into the credential store by `seed_credentials`.
#[allow(dead_code)]
pub const OWNER_ID: &str = "134815";

/// Check if a Postgres database is available via environment variable.
#[allow(dead_code)]
pub fn database_available() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

/// Skip test with message if no database is available.
#[macro_export]
macro_rules! require_database {
    () => {
        if !crate::common::database_available() {
            eprintln!("⚠️  Skipping: DATABASE_URL not set");
            return;
        }
    };
}

/// App wired to mock Strava and Notion servers and an in-memory store.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: MemoryCredentialStore,
    pub strava: MockServer,
    pub notion: MockServer,
}

#[allow(dead_code)]
impl TestApp {
    /// Send a request and return status plus JSON body (`Null` if empty).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// POST a webhook event.
    pub async fn post_event(&self, event: serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(event.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Store credentials for `OWNER_ID` expiring at `expires_at`.
    pub async fn seed_credentials(&self, expires_at: i64) {
        self.store
            .set(&test_credentials(OWNER_ID, expires_at))
            .await
            .unwrap();
    }
}

#[allow(dead_code)]
pub fn test_credentials(user_id: &str, expires_at: i64) -> Credentials {
    Credentials {
        user_id: user_id.to_string(),
        access_token: "access-current".to_string(),
        refresh_token: "refresh-current".to_string(),
        expires_at,
    }
}

/// A timestamp comfortably in the future.
#[allow(dead_code)]
pub fn far_future() -> i64 {
    chrono::Utc::now().timestamp() + 6 * 3600
}

/// Test config pointing the outbound clients at the given mock servers.
#[allow(dead_code)]
pub fn test_config(strava: &MockServer, notion: &MockServer) -> Config {
    Config {
        strava_api_url: format!("{}/api/v3", strava.uri()),
        strava_oauth_url: format!("{}/oauth", strava.uri()),
        notion_api_url: format!("{}/v1", notion.uri()),
        ..Config::test_default()
    }
}

/// Create a test app using `config` adjusted by `customize`.
#[allow(dead_code)]
pub async fn create_test_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let strava = MockServer::start().await;
    let notion = MockServer::start().await;

    let mut config = test_config(&strava, &notion);
    customize(&mut config);

    let store = MemoryCredentialStore::new();
    let http = http_client(&config).unwrap();
    let strava_service = StravaService::new(
        StravaClient::new(http.clone(), &config),
        Arc::new(store.clone()),
        config.token_expiry_margin_secs,
    );
    let notion_client = NotionClient::new(http, &config);

    let state = Arc::new(AppState::new(config, strava_service, notion_client));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        strava,
        notion,
    }
}

/// Create a test app with mock Strava and Notion servers.
#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    create_test_app_with(|_| {}).await
}
