//! Alert feed integration tests.
//!
//! Tests verify:
//! - Alerts come back newest first with their camera embedded
//! - The cameraId filter
//! - Page/limit windows, defaults, clamping and rejection of bad values

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use super::test_utils::{request, TestApp};

fn ids(json: &Value) -> Vec<i64> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_empty_feed() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;

    let (status, json) = app
        .send_json(request(Method::GET, "/alert", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn test_alerts_newest_first_with_camera() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;
    let camera = app.create_camera(&token, "Lobby").await;

    let oldest = app.record_alert(camera, 0, 1).await;
    let newest = app.record_alert(camera, 120, 3).await;
    let middle = app.record_alert(camera, 60, 2).await;

    let (status, json) = app
        .send_json(request(Method::GET, "/alert", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec![newest, middle, oldest]);

    let first = &json[0];
    assert_eq!(first["cameraId"], camera);
    assert_eq!(first["faces"], 3);
    assert!(first["timestamp"].is_string());
    assert_eq!(first["camera"]["id"], camera);
    assert_eq!(first["camera"]["name"], "Lobby");
    assert_eq!(first["camera"]["rtspUrl"], "rtsp://cam.local/stream");
}

#[tokio::test]
async fn test_equal_timestamps_break_ties_by_id() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;
    let camera = app.create_camera(&token, "Lobby").await;

    let first = app.record_alert(camera, 30, 1).await;
    let second = app.record_alert(camera, 30, 1).await;

    let (_, json) = app
        .send_json(request(Method::GET, "/alert", Some(&token)))
        .await;
    assert_eq!(ids(&json), vec![second, first]);
}

#[tokio::test]
async fn test_camera_filter() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;
    let lobby = app.create_camera(&token, "Lobby").await;
    let yard = app.create_camera(&token, "Yard").await;

    let lobby_alert = app.record_alert(lobby, 10, 1).await;
    app.record_alert(yard, 20, 1).await;

    let (status, json) = app
        .send_json(request(
            Method::GET,
            &format!("/alert?cameraId={}", lobby),
            Some(&token),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec![lobby_alert]);

    let (status, json) = app
        .send_json(request(Method::GET, "/alert?cameraId=999", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));

    let (status, json) = app
        .send_json(request(Method::GET, "/alert?cameraId=lobby", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["field"], "cameraId");
}

#[tokio::test]
async fn test_pagination_windows() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;
    let camera = app.create_camera(&token, "Lobby").await;

    let mut recorded = Vec::new();
    for i in 0..5 {
        recorded.push(app.record_alert(camera, i * 10, 1).await);
    }
    recorded.reverse();

    let (_, page1) = app
        .send_json(request(Method::GET, "/alert?page=1&limit=2", Some(&token)))
        .await;
    let (_, page2) = app
        .send_json(request(Method::GET, "/alert?page=2&limit=2", Some(&token)))
        .await;
    let (_, page3) = app
        .send_json(request(Method::GET, "/alert?page=3&limit=2", Some(&token)))
        .await;
    let (_, page4) = app
        .send_json(request(Method::GET, "/alert?page=4&limit=2", Some(&token)))
        .await;

    assert_eq!(ids(&page1), recorded[0..2].to_vec());
    assert_eq!(ids(&page2), recorded[2..4].to_vec());
    assert_eq!(ids(&page3), recorded[4..5].to_vec());
    assert_eq!(page4, json!([]));
}

#[tokio::test]
async fn test_default_and_clamped_limit() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;
    let camera = app.create_camera(&token, "Lobby").await;

    for i in 0..105 {
        app.record_alert(camera, i, 1).await;
    }

    let (_, json) = app
        .send_json(request(Method::GET, "/alert", Some(&token)))
        .await;
    assert_eq!(json.as_array().unwrap().len(), 20);

    let (status, json) = app
        .send_json(request(Method::GET, "/alert?limit=500", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 100);

    let (status, json) = app
        .send_json(request(Method::GET, "/alert?page=&limit=", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_invalid_pagination_rejected() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;

    for (query, field) in [
        ("page=0", "page"),
        ("limit=-1", "limit"),
        ("limit=0", "limit"),
        ("page=two", "page"),
    ] {
        let (status, json) = app
            .send_json(request(
                Method::GET,
                &format!("/alert?{}", query),
                Some(&token),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
        assert_eq!(json["error"], "validation_error", "{query}");
        assert_eq!(json["field"], field, "{query}");
    }
}

#[tokio::test]
async fn test_single_page_returns_every_alert() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;
    let camera = app.create_camera(&token, "Lobby").await;

    let mut recorded = Vec::new();
    for i in 0..5 {
        recorded.push(app.record_alert(camera, i * 10, 1).await);
    }
    recorded.reverse();

    for uri in ["/alert", "/alert?page=1&limit=20"] {
        let (status, json) = app.send_json(request(Method::GET, uri, Some(&token))).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(ids(&json), recorded, "{uri}");
    }
}

#[tokio::test]
async fn test_repeated_query_key_is_json_validation_error() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret1").await;

    let (status, json) = app
        .send_json(request(Method::GET, "/alert?page=1&page=2", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert_eq!(json["field"], "query");
    assert_eq!(json["status"], 400);
}
