//! Test fixtures shared by the integration and load tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use smart_queue::config::HttpSettings;
use smart_queue::http::{create_router, ApiState};
use smart_queue::metrics::MetricsCollector;
use smart_queue::queue::CounterQueueEngine;
use smart_queue::types::{CounterIndex, UserStatus};
use std::sync::Arc;
use tower::ServiceExt;

/// Engine with the reference three counters and a metrics collector attached
pub fn create_test_engine() -> Arc<CounterQueueEngine> {
    create_engine_with_counters(3)
}

pub fn create_engine_with_counters(counter_count: usize) -> Arc<CounterQueueEngine> {
    let metrics = Arc::new(MetricsCollector::new().expect("Failed to create collector"));
    Arc::new(
        CounterQueueEngine::new(counter_count)
            .expect("Failed to create engine")
            .with_metrics(metrics),
    )
}

/// Router over a fresh engine, without static files
pub fn create_test_router() -> (Router, ApiState) {
    let metrics = Arc::new(MetricsCollector::new().expect("Failed to create collector"));
    let engine = Arc::new(
        CounterQueueEngine::new(3)
            .expect("Failed to create engine")
            .with_metrics(metrics.clone()),
    );
    let state = ApiState::new(engine, metrics, "smart-queue-test");
    let settings = HttpSettings {
        static_dir: None,
        enable_cors: true,
    };
    (create_router(state.clone(), &settings), state)
}

/// Send a request through the router and decode the JSON response
pub async fn send_json(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).expect("Failed to build request"))
        .await
        .expect("Router failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Names and statuses at one counter, front to back
pub fn queue_of(engine: &CounterQueueEngine, counter: CounterIndex) -> Vec<(String, UserStatus)> {
    engine.list_counters()[&counter]
        .iter()
        .map(|user| (user.name.clone(), user.status))
        .collect()
}

pub fn total_users(engine: &CounterQueueEngine) -> usize {
    engine.list_counters().values().map(Vec::len).sum()
}
