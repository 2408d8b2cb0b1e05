//! Authentication integration tests.
//!
//! Tests verify:
//! - Signup and login succeed and hand out a usable token
//! - Duplicate usernames and bad bodies are rejected
//! - Wrong passwords and unknown users fail identically
//! - The gate rejects missing, malformed, expired and forged tokens

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{header, Method, Request, StatusCode};
use axum::body::Body;
use serde_json::json;

use camwatch::auth::TokenService;

use super::test_utils::{json_request, raw_json_request, request, TestApp, TEST_SECRET};

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

// =============================================================================
// Signup
// =============================================================================

#[tokio::test]
async fn test_signup_returns_user_id() {
    let app = TestApp::new();
    let body = json!({ "username": "alice", "password": "secret1" });

    let (status, json) = app
        .send_json(json_request(Method::POST, "/auth/signup", None, &body))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "message": "User created successfully", "userId": 1 })
    );
}

#[tokio::test]
async fn test_signup_ids_increase() {
    let app = TestApp::new();

    for (expected, name) in [(1, "alice"), (2, "bob")] {
        let body = json!({ "username": name, "password": "pw" });
        let (_, json) = app
            .send_json(json_request(Method::POST, "/auth/signup", None, &body))
            .await;
        assert_eq!(json["userId"], expected);
    }
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let app = TestApp::new();
    let body = json!({ "username": "alice", "password": "secret1" });

    let (status, _) = app
        .send_json(json_request(Method::POST, "/auth/signup", None, &body))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = app
        .send_json(json_request(Method::POST, "/auth/signup", None, &body))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "conflict");
    assert_eq!(json["status"], 409);
}

#[tokio::test]
async fn test_signup_validation_errors() {
    let app = TestApp::new();

    let cases = [
        json!({ "username": "", "password": "secret1" }),
        json!({ "username": "alice", "password": "" }),
        json!({ "username": "alice" }),
    ];

    for body in cases {
        let (status, json) = app
            .send_json(json_request(Method::POST, "/auth/signup", None, &body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json["error"], "validation_error");
    }
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let app = TestApp::new();

    let (status, json) = app
        .send_json(raw_json_request(Method::POST, "/auth/signup", None, "{not json"))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["field"], "body");
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_returns_verifiable_token() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;

    assert!(!token.is_empty());
    let user_id = TokenService::new(TEST_SECRET).verify(&token).unwrap();
    assert_eq!(user_id, 1);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.token_for("alice", "secret1").await;

    let wrong_password = json!({ "username": "alice", "password": "nope" });
    let unknown_user = json!({ "username": "mallory", "password": "secret1" });

    let (status_a, json_a) = app
        .send_json(json_request(Method::POST, "/auth/login", None, &wrong_password))
        .await;
    let (status_b, json_b) = app
        .send_json(json_request(Method::POST, "/auth/login", None, &unknown_user))
        .await;

    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_b, StatusCode::UNAUTHORIZED);
    assert_eq!(json_a, json_b);
    assert_eq!(json_a["message"], "Invalid credentials");
}

// =============================================================================
// Gate
// =============================================================================

#[tokio::test]
async fn test_missing_header_rejected() {
    let app = TestApp::new();

    let (status, json) = app.send_json(request(Method::GET, "/alert", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized");
    assert_eq!(json["message"], "Unauthorized");
}

#[tokio::test]
async fn test_wrong_scheme_rejected() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;

    let request = Request::builder()
        .uri("/camera")
        .header(header::AUTHORIZATION, format!("Token {}", token))
        .body(Body::empty())
        .unwrap();

    let (status, json) = app.send_json(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized");
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let app = TestApp::new();

    let (status, _) = app
        .send_json(request(Method::GET, "/camera", Some("not.a.token")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = TestApp::new();
    let tokens = TokenService::new(TEST_SECRET);

    // Issued two days ago with a one-day lifetime
    let expired = tokens.issue_at(1, now() - 2 * 24 * 60 * 60);

    let (status, json) = app
        .send_json(request(Method::GET, "/camera", Some(&expired)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized");
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let app = TestApp::new();
    let forged = TokenService::new("some-other-secret").issue(1);

    let (status, _) = app
        .send_json(request(Method::GET, "/camera", Some(&forged)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_routes_need_no_token() {
    let app = TestApp::new();

    let (status, body) = app.send(request(Method::GET, "/", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Backend is running");

    let (status, json) = app.send_json(request(Method::GET, "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route_is_not_gated() {
    let app = TestApp::new();

    let (status, _) = app.send(request(Method::GET, "/nowhere", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
