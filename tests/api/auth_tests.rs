//! Authentication Middleware Tests
//!
//! Every /api/v1 route sits behind JWT validation; these tests cover
//! the reject paths, which never reach the database.

use axum::http::StatusCode;

use crate::common::{expired_token, valid_token, TestApp};

/// Test protected route without a token is rejected
#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.get("/api/v1/clients").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test malformed Authorization header is rejected
#[tokio::test]
async fn test_malformed_header_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.get_auth("/api/v1/clients", "").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test garbage token is rejected
#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.get_auth("/api/v1/clients", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test expired token is rejected
#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app.get_auth("/api/v1/clients", &expired_token()).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test a valid token passes the middleware
///
/// The lazy pool fails once the handler touches the database, so
/// anything other than 401 proves the token was accepted.
#[tokio::test]
async fn test_valid_token_passes_middleware() {
    let app = TestApp::new().await;

    let response = app.get_auth("/api/v1/clients", &valid_token()).await;

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Test unknown routes return 404
#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new().await;

    let response = app.get_auth("/api/v1/unknown", &valid_token()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Test invalid request bodies are rejected before any database work
#[tokio::test]
async fn test_invalid_body_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .post_json_auth("/api/v1/clients", r#"{"name":""}"#, &valid_token())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
