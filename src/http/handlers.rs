//! Request handlers for the queue API
//!
//! Handlers only check the shape of a request; every queue rule lives in
//! the engine.

use crate::error::QueueError;
use crate::http::ApiState;
use crate::metrics;
use crate::service::health::{HealthCheck, HealthStatus};
use crate::types::{CounterIndex, CountersSnapshot, UserId, UserStatus};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

/// Body of `POST /user`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnrollRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of the status update endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
}

fn parse_index(what: &str, raw: &str) -> Result<usize, QueueError> {
    raw.parse()
        .map_err(|_| QueueError::validation(format!("Malformed {} index '{}'", what, raw)))
}

fn parse_status(
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<UserStatus, QueueError> {
    let Json(request) = payload?;
    request.status.unwrap_or_default().parse()
}

/// `GET /counters`
pub async fn list_counters(State(state): State<ApiState>) -> Json<CountersSnapshot> {
    debug!("Counter listing requested");
    Json(state.engine.list_counters())
}

/// `POST /user`
pub async fn enroll_user(
    State(state): State<ApiState>,
    payload: Result<Json<EnrollRequest>, JsonRejection>,
) -> Result<Json<Value>, QueueError> {
    let Json(request) = payload?;
    let name = request.name.unwrap_or_default();

    let enrollment = state.engine.enroll(&name)?;

    Ok(Json(json!({
        "success": true,
        "counter": enrollment.counter,
        "position": enrollment.position,
        "user": enrollment.user,
    })))
}

/// `PATCH /user/{counter_index}/{user_index}`
pub async fn update_user_status(
    State(state): State<ApiState>,
    Path((counter_index, user_index)): Path<(String, String)>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Json<Value>, QueueError> {
    let status = parse_status(payload)?;
    let counter: CounterIndex = parse_index("counter", &counter_index)?;
    let position = parse_index("user", &user_index)?;

    state.engine.set_status(counter, position, status)?;

    Ok(Json(json!({ "success": true })))
}

/// `PATCH /counters/{counter_index}/users/{user_id}`
pub async fn update_user_status_by_id(
    State(state): State<ApiState>,
    Path((counter_index, user_id)): Path<(String, String)>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Json<Value>, QueueError> {
    let status = parse_status(payload)?;
    let counter = parse_index("counter", &counter_index)?;
    let user_id: UserId = user_id
        .parse()
        .map_err(|_| QueueError::validation(format!("Malformed user id '{}'", user_id)))?;

    state.engine.set_status_by_id(counter, user_id, status)?;

    Ok(Json(json!({ "success": true })))
}

/// `POST /user/{counter_index}/rotate`
pub async fn rotate_counter(
    State(state): State<ApiState>,
    Path(counter_index): Path<String>,
) -> Result<Json<Value>, QueueError> {
    let counter = parse_index("counter", &counter_index)?;

    let moved = state.engine.rotate(counter)?;

    Ok(Json(json!({ "success": true, "user": moved })))
}

/// Lightweight health check endpoint handler
pub async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    debug!("Health check requested");

    let status = HealthCheck::liveness_check(&state).await;
    let code = match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        code,
        Json(json!({
            "status": status,
            "service": state.service_name,
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Detailed service statistics endpoint handler
pub async fn stats_handler(State(state): State<ApiState>) -> impl IntoResponse {
    debug!("Stats endpoint requested");

    let health = HealthCheck::check(&state).await;
    let code = match health.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (code, Json(health))
}

/// Prometheus metrics endpoint handler
pub async fn metrics_handler(State(state): State<ApiState>) -> Response {
    debug!("Metrics endpoint requested");

    state
        .metrics_collector
        .update_uptime((crate::utils::current_timestamp() - state.started_at).num_seconds());

    match metrics::encode_text(&state.metrics_collector) {
        Ok((body, content_type)) => {
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}
