//! HTTP contract tests for the queue API

use crate::fixtures::{create_test_router, send_json};
use axum::http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_complete_http_workflow() {
    let (router, _state) = create_test_router();

    let (status, body) = send_json(&router, "POST", "/user", Some(json!({"name": "Alice"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counter"], 0);

    let (status, body) = send_json(&router, "POST", "/user", Some(json!({"name": "Bob"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counter"], 1);

    let (status, body) =
        send_json(&router, "PATCH", "/user/0/0", Some(json!({"status": "red"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, body) = send_json(&router, "POST", "/user", Some(json!({"name": "Carol"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counter"], 0);
    assert_eq!(body["position"], 1);

    let (status, counters) = send_json(&router, "GET", "/counters", None).await;
    assert_eq!(status, StatusCode::OK);

    let counter0 = counters["0"].as_array().unwrap();
    assert_eq!(counter0.len(), 2);
    assert_eq!(counter0[0]["name"], "Alice");
    assert_eq!(counter0[0]["status"], "red");
    assert_eq!(counter0[1]["name"], "Carol");
    assert_eq!(counter0[1]["status"], "unset");
    assert_eq!(counters["1"][0]["name"], "Bob");
    assert_eq!(counters["2"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_rotate_via_http() {
    let (router, _state) = create_test_router();
    for name in ["A", "B", "C", "D"] {
        send_json(&router, "POST", "/user", Some(json!({ "name": name }))).await;
    }

    // A and D share counter 0
    let (status, body) = send_json(&router, "POST", "/user/0/rotate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["name"], "A");

    let (_, counters) = send_json(&router, "GET", "/counters", None).await;
    assert_eq!(counters["0"][0]["name"], "D");
    assert_eq!(counters["0"][1]["name"], "A");
}

#[tokio::test]
async fn test_error_statuses() {
    let (router, state) = create_test_router();

    let cases: Vec<(&str, &str, Option<Value>, StatusCode)> = vec![
        ("POST", "/user", Some(json!({})), StatusCode::BAD_REQUEST),
        ("POST", "/user", Some(json!({"name": ""})), StatusCode::BAD_REQUEST),
        ("POST", "/user", Some(json!({"name": 42})), StatusCode::BAD_REQUEST),
        ("PATCH", "/user/0/0", Some(json!({"status": "unset"})), StatusCode::BAD_REQUEST),
        ("PATCH", "/user/0/0", Some(json!({})), StatusCode::BAD_REQUEST),
        ("PATCH", "/user/0/0", Some(json!({"status": "green"})), StatusCode::NOT_FOUND),
        ("PATCH", "/user/3/0", Some(json!({"status": "green"})), StatusCode::NOT_FOUND),
        ("PATCH", "/user/zero/0", Some(json!({"status": "green"})), StatusCode::BAD_REQUEST),
        ("POST", "/user/0/rotate", None, StatusCode::NOT_FOUND),
        ("POST", "/user/3/rotate", None, StatusCode::NOT_FOUND),
        ("POST", "/user/abc/rotate", None, StatusCode::BAD_REQUEST),
    ];

    for (method, uri, body, expected) in cases {
        let (status, response) = send_json(&router, method, uri, body.clone()).await;
        assert_eq!(status, expected, "{} {} {:?}", method, uri, body);
        assert_eq!(response["success"], false);
    }

    // Nothing was enrolled or changed by the rejected requests
    assert_eq!(state.engine.stats().total_users, 0);
}

#[tokio::test]
async fn test_status_by_stable_id() {
    let (router, state) = create_test_router();
    let engine = state.engine.clone();
    let alice = engine.enroll("Alice").unwrap();
    engine.enroll("Bob").unwrap();
    engine.enroll("Carol").unwrap();
    engine.enroll("Dave").unwrap();

    // Dave joins Alice at counter 0; rotate so Alice is no longer at position 0
    engine.rotate(0).unwrap();

    let uri = format!("/counters/0/users/{}", alice.user.id);
    let (status, _) = send_json(&router, "PATCH", &uri, Some(json!({"status": "green"}))).await;
    assert_eq!(status, StatusCode::OK);

    let counter0 = &engine.list_counters()[&0];
    assert_eq!(counter0[1].name, "Alice");
    assert_eq!(counter0[1].status.as_str(), "green");
    assert_eq!(counter0[0].status.as_str(), "unset");

    let (status, _) = send_json(
        &router,
        "PATCH",
        "/counters/0/users/not-a-uuid",
        Some(json!({"status": "green"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/counters/1/users/{}", alice.user.id);
    let (status, _) = send_json(&router, "PATCH", &uri, Some(json!({"status": "red"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_endpoint() {
    let (router, state) = create_test_router();
    state.set_running(true).await;
    send_json(&router, "POST", "/user", Some(json!({"name": "Alice"}))).await;

    let (status, body) = send_json(&router, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "smart-queue-test");
    assert_eq!(body["stats"]["total_users"], 1);
    assert_eq!(body["stats"]["counter_count"], 3);
}
