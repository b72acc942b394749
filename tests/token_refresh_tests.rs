// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token lifecycle tests: refresh only when expired, persist before use.

mod common;

use async_trait::async_trait;
use common::{create_test_app, far_future, test_credentials, test_config, OWNER_ID};
use serde_json::json;
use std::sync::Arc;
use strava_notion_sync::config::Config;
use strava_notion_sync::db::{CredentialStore, MemoryCredentialStore};
use strava_notion_sync::error::AppError;
use strava_notion_sync::models::Credentials;
use strava_notion_sync::services::{http_client, StravaClient, StravaService};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_refresh(server: &MockServer, expires_at: i64, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "access-new",
            "refresh_token": "refresh-new",
            "expires_at": expires_at,
            "expires_in": 21600
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_valid_token_is_not_refreshed() {
    let app = create_test_app().await;
    app.seed_credentials(far_future()).await;
    mock_refresh(&app.strava, far_future(), 0).await;

    for _ in 0..2 {
        let token = app.state.strava.ensure_valid_token(OWNER_ID).await.unwrap();
        assert_eq!(token, "access-current");
    }
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_persisted() {
    let app = create_test_app().await;
    app.seed_credentials(0).await;
    let new_expiry = far_future();
    mock_refresh(&app.strava, new_expiry, 1).await;

    let token = app.state.strava.ensure_valid_token(OWNER_ID).await.unwrap();
    assert_eq!(token, "access-new");

    let stored = app.store.get(OWNER_ID).await.unwrap().unwrap();
    assert_eq!(stored.access_token, "access-new");
    assert_eq!(stored.refresh_token, "refresh-new");
    assert_eq!(stored.expires_at, new_expiry);

    // Second call reads the persisted token
    let token = app.state.strava.ensure_valid_token(OWNER_ID).await.unwrap();
    assert_eq!(token, "access-new");
}

#[tokio::test]
async fn test_concurrent_expired_requests_refresh_once() {
    let app = create_test_app().await;
    app.seed_credentials(0).await;
    mock_refresh(&app.strava, far_future(), 1).await;

    let strava = &app.state.strava;
    let (a, b, c) = tokio::join!(
        strava.ensure_valid_token(OWNER_ID),
        strava.ensure_valid_token(OWNER_ID),
        strava.ensure_valid_token(OWNER_ID),
    );

    for token in [a, b, c] {
        assert_eq!(token.unwrap(), "access-new");
    }
}

#[tokio::test]
async fn test_expiry_margin_refreshes_early() {
    let app = common::create_test_app_with(|config| config.token_expiry_margin_secs = 300).await;
    // Still valid for one minute, inside the five minute margin
    app.seed_credentials(chrono::Utc::now().timestamp() + 60).await;
    mock_refresh(&app.strava, far_future(), 1).await;

    let token = app.state.strava.ensure_valid_token(OWNER_ID).await.unwrap();
    assert_eq!(token, "access-new");
}

#[tokio::test]
async fn test_refresh_failure_leaves_store_unchanged() {
    let app = create_test_app().await;
    app.seed_credentials(0).await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request"))
        .expect(1)
        .mount(&app.strava)
        .await;

    let err = app.state.strava.ensure_valid_token(OWNER_ID).await.unwrap_err();
    assert!(matches!(err, AppError::TokenRefreshFailed { status: 400, .. }));

    let stored = app.store.get(OWNER_ID).await.unwrap().unwrap();
    assert_eq!(stored, test_credentials(OWNER_ID, 0));
}

#[tokio::test]
async fn test_malformed_refresh_response_fails() {
    let app = create_test_app().await;
    app.seed_credentials(0).await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "only" })))
        .mount(&app.strava)
        .await;

    let err = app.state.strava.ensure_valid_token(OWNER_ID).await.unwrap_err();
    assert!(matches!(err, AppError::TokenRefreshFailed { status: 200, .. }));
}

#[tokio::test]
async fn test_missing_credentials() {
    let app = create_test_app().await;

    let err = app.state.strava.ensure_valid_token("404").await.unwrap_err();
    assert!(matches!(err, AppError::CredentialsNotFound(ref id) if id == "404"));
}

#[tokio::test]
async fn test_empty_user_id_is_invalid() {
    let app = create_test_app().await;

    let err = app.state.strava.ensure_valid_token("").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_fetch_activity_requires_arguments() {
    let app = create_test_app().await;

    let err = app.state.strava.fetch_activity("", "token").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    let err = app.state.strava.fetch_activity("123", "").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));

    assert!(app.strava.received_requests().await.unwrap().is_empty());
}

/// Store whose writes always fail.
struct ReadOnlyStore(MemoryCredentialStore);

#[async_trait]
impl CredentialStore for ReadOnlyStore {
    async fn get(&self, user_id: &str) -> Result<Option<Credentials>, AppError> {
        self.0.get(user_id).await
    }

    async fn set(&self, _credentials: &Credentials) -> Result<(), AppError> {
        Err(AppError::Database("connection reset".to_string()))
    }
}

#[tokio::test]
async fn test_persist_failure_aborts_with_new_token_unused() {
    let strava_server = MockServer::start().await;
    let notion_server = MockServer::start().await;
    let config: Config = test_config(&strava_server, &notion_server);

    let inner = MemoryCredentialStore::new();
    inner.set(&test_credentials(OWNER_ID, 0)).await.unwrap();

    let service = StravaService::new(
        StravaClient::new(http_client(&config).unwrap(), &config),
        Arc::new(ReadOnlyStore(inner)),
        0,
    );
    mock_refresh(&strava_server, far_future(), 1).await;

    let err = service.ensure_valid_token(OWNER_ID).await.unwrap_err();
    assert!(matches!(err, AppError::CredentialPersistFailed(_)));
}
