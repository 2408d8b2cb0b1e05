//! Camera registry integration tests.
//!
//! Tests verify:
//! - The full create / list / get / replace / delete flow
//! - Not-found and bad-id responses
//! - Field validation on create and replace
//! - Deleting a camera removes its alerts from the feed

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::test_utils::{json_request, raw_json_request, request, TestApp};

#[tokio::test]
async fn test_camera_lifecycle() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;

    let (status, json) = app
        .send_json(request(Method::GET, "/camera", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));

    let lobby = json!({ "name": "Lobby", "rtspUrl": "rtsp://x", "location": "1F" });
    let (status, created) = app
        .send_json(json_request(Method::POST, "/camera", Some(&token), &lobby))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        created,
        json!({ "id": 1, "name": "Lobby", "rtspUrl": "rtsp://x", "location": "1F" })
    );

    let (status, fetched) = app
        .send_json(request(Method::GET, "/camera/1", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let replacement = json!({ "name": "Lobby East", "rtspUrl": "rtsp://y", "location": "2F" });
    let (status, updated) = app
        .send_json(json_request(Method::PUT, "/camera/1", Some(&token), &replacement))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        updated,
        json!({ "id": 1, "name": "Lobby East", "rtspUrl": "rtsp://y", "location": "2F" })
    );

    let (status, body) = app
        .send(request(Method::DELETE, "/camera/1", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Camera deleted");

    let (status, json) = app
        .send_json(request(Method::GET, "/camera/1", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Camera not found");
}

#[tokio::test]
async fn test_list_is_ordered_by_id() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;

    for name in ["Gate", "Garage", "Yard"] {
        app.create_camera(&token, name).await;
    }

    let (_, json) = app
        .send_json(request(Method::GET, "/camera", Some(&token)))
        .await;
    let ids: Vec<i64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_cameras_are_shared_between_users() {
    let app = TestApp::new();
    let alice = app.token_for("alice", "secret1").await;
    let bob = app.token_for("bob", "secret2").await;

    let id = app.create_camera(&alice, "Lobby").await;

    let (status, _) = app
        .send_json(request(Method::GET, &format!("/camera/{}", id), Some(&bob)))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_camera_is_not_found() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;
    let body = json!({ "name": "Lobby", "rtspUrl": "rtsp://x", "location": "1F" });

    let (status, json) = app
        .send_json(request(Method::GET, "/camera/99", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
    assert_eq!(json["message"], "Camera not found");

    let (status, _) = app
        .send_json(json_request(Method::PUT, "/camera/99", Some(&token), &body))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = app
        .send_json(request(Method::DELETE, "/camera/99", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "Camera not found");
}

#[tokio::test]
async fn test_bad_camera_id_rejected() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;

    let (status, json) = app
        .send_json(request(Method::GET, "/camera/lobby", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["field"], "id");
}

#[tokio::test]
async fn test_camera_field_validation() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;

    let cases = [
        (json!({ "name": "", "rtspUrl": "rtsp://x", "location": "1F" }), "name"),
        (json!({ "name": "   ", "rtspUrl": "rtsp://x", "location": "1F" }), "name"),
        (json!({ "name": "Lobby", "rtspUrl": "", "location": "1F" }), "rtspUrl"),
        (json!({ "name": "Lobby", "rtspUrl": "not a url", "location": "1F" }), "rtspUrl"),
        (json!({ "name": "Lobby", "location": "1F" }), "body"),
    ];

    for (body, field) in cases {
        let (status, json) = app
            .send_json(json_request(Method::POST, "/camera", Some(&token), &body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json["field"], field, "{body}");
    }

    let (_, json) = app
        .send_json(request(Method::GET, "/camera", Some(&token)))
        .await;
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_malformed_camera_body() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;

    let (status, json) = app
        .send_json(raw_json_request(Method::POST, "/camera", Some(&token), "[1, 2"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
}

#[tokio::test]
async fn test_camera_routes_require_token() {
    let app = TestApp::new();
    let body = json!({ "name": "Lobby", "rtspUrl": "rtsp://x", "location": "1F" });

    let (status, _) = app
        .send_json(json_request(Method::POST, "/camera", None, &body))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send_json(request(Method::DELETE, "/camera/1", None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_removes_camera_alerts() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;

    let doomed = app.create_camera(&token, "Doomed").await;
    let kept = app.create_camera(&token, "Kept").await;
    app.record_alert(doomed, 10, 1).await;
    app.record_alert(kept, 20, 2).await;

    let (status, _) = app
        .send(request(Method::DELETE, &format!("/camera/{}", doomed), Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = app
        .send_json(request(Method::GET, "/alert", Some(&token)))
        .await;
    let alerts = json.as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["cameraId"], kept);
}
