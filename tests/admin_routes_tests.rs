// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription management and OAuth exchange route tests.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{create_test_app, create_test_app_with};
use serde_json::json;
use strava_notion_sync::db::CredentialStore;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn admin_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_subscriptions_require_token() {
    let app = create_test_app().await;

    let (status, json) = app
        .send(admin_request("GET", "/strava/subscriptions", None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized.");

    let (status, json) = app
        .send(admin_request("GET", "/strava/subscriptions", Some("wrong")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Forbidden.");

    assert!(app.strava.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_subscriptions_disabled_without_admin_token() {
    let app = create_test_app_with(|config| config.admin_token = String::new()).await;

    let (status, json) = app
        .send(admin_request("POST", "/strava/subscriptions", Some("")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["message"], "Forbidden.");
    assert!(app.strava.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_subscription_uses_webhook_callback() {
    let app = create_test_app().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/push_subscriptions"))
        .and(body_string_contains("verify_token=test_verify_token"))
        .and(body_string_contains(
            "callback_url=http%3A%2F%2Flocalhost%3A8080%2Fwebhook",
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 120475 })))
        .expect(1)
        .mount(&app.strava)
        .await;

    let (status, json) = app
        .send(admin_request(
            "POST",
            "/strava/subscriptions",
            Some("test_admin_token"),
        ))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["id"], 120475);
}

#[tokio::test]
async fn test_list_and_delete_subscriptions() {
    let app = create_test_app().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/push_subscriptions"))
        .and(query_param("client_id", "test_client_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 120475,
            "callback_url": "http://localhost:8080/webhook",
            "created_at": "2022-01-30T09:58:22Z"
        }])))
        .expect(1)
        .mount(&app.strava)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/v3/push_subscriptions/120475"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.strava)
        .await;

    let (status, json) = app
        .send(admin_request(
            "GET",
            "/strava/subscriptions",
            Some("test_admin_token"),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["callback_url"], "http://localhost:8080/webhook");

    let (status, _) = app
        .send(admin_request(
            "DELETE",
            "/strava/subscriptions/120475",
            Some("test_admin_token"),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_subscription_upstream_error_is_bad_gateway() {
    let app = create_test_app().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/push_subscriptions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.strava)
        .await;

    let (status, _) = app
        .send(admin_request(
            "GET",
            "/strava/subscriptions",
            Some("test_admin_token"),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

// ─── OAuth exchange ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_exchange_token_stores_credentials() {
    let app = create_test_app().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "access-first",
            "refresh_token": "refresh-first",
            "expires_at": 1700000000,
            "athlete": { "id": 134815, "firstname": "Ada", "lastname": "L" }
        })))
        .expect(1)
        .mount(&app.strava)
        .await;

    let (status, json) = app
        .send(
            Request::builder()
                .uri("/auth/exchange_token?state=&code=abc123&scope=read,activity:read_all")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user_id"], "134815");

    let stored = app.store.get("134815").await.unwrap().unwrap();
    assert_eq!(stored.access_token, "access-first");
    assert_eq!(stored.refresh_token, "refresh-first");
    assert_eq!(stored.expires_at, 1700000000);
}

#[tokio::test]
async fn test_exchange_token_without_code() {
    let app = create_test_app().await;

    let (status, json) = app
        .send(
            Request::builder()
                .uri("/auth/exchange_token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid request.");
    assert!(json["details"]
        .as_str()
        .unwrap()
        .contains("request query code from strava not found"));
}

#[tokio::test]
async fn test_exchange_token_access_denied() {
    let app = create_test_app().await;

    let (status, _) = app
        .send(
            Request::builder()
                .uri("/auth/exchange_token?state=&error=access_denied")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty());
}
