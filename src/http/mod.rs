//! HTTP API for the counter queue service
//!
//! This module wires the queue routes, health and metrics endpoints and the
//! static front-end onto an Axum router, and runs it with graceful shutdown.

pub mod error;
pub mod handlers;

use crate::config::HttpSettings;
use crate::metrics::MetricsCollector;
use crate::queue::CounterQueueEngine;
use anyhow::{Context, Result};
use axum::{
    routing::{get, patch, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{watch, RwLock};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use handlers::{
    enroll_user, health_handler, list_counters, metrics_handler, rotate_counter, stats_handler,
    update_user_status, update_user_status_by_id,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<CounterQueueEngine>,
    pub metrics_collector: Arc<MetricsCollector>,
    pub service_name: String,
    pub started_at: DateTime<Utc>,
    pub is_running: Arc<RwLock<bool>>,
}

impl ApiState {
    pub fn new(
        engine: Arc<CounterQueueEngine>,
        metrics_collector: Arc<MetricsCollector>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            metrics_collector,
            service_name: service_name.into(),
            started_at: crate::utils::current_timestamp(),
            is_running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub async fn set_running(&self, running: bool) {
        *self.is_running.write().await = running;
    }
}

/// Build the API router
pub fn create_router(state: ApiState, settings: &HttpSettings) -> Router {
    let mut router = Router::new()
        .route("/counters", get(list_counters))
        .route("/user", post(enroll_user))
        .route("/user/{counter_index}/{user_index}", patch(update_user_status))
        .route("/user/{counter_index}/rotate", post(rotate_counter))
        .route(
            "/counters/{counter_index}/users/{user_id}",
            patch(update_user_status_by_id),
        )
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    if let Some(static_dir) = &settings.static_dir {
        router = router.fallback_service(ServeDir::new(static_dir));
    }

    if settings.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(TraceLayer::new_for_http())
}

/// HTTP server for the queue API
pub struct ApiServer {
    addr: String,
    router: Router,
    shutdown_tx: watch::Sender<bool>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(addr: impl Into<String>, state: ApiState, settings: &HttpSettings) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            addr: addr.into(),
            router: create_router(state, settings),
            shutdown_tx,
        }
    }

    /// Bind the listen address
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr: SocketAddr = self
            .addr
            .parse()
            .with_context(|| format!("Invalid listen address '{}'", self.addr))?;

        TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))
    }

    /// Serve on a bound listener until [`ApiServer::stop`] is called
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        info!("Queue server running at http://{}", listener.local_addr()?);

        // wait_for sees a stop that was requested before this point
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.wait_for(|stopped| *stopped).await;
                info!("API server shutdown signal received");
            })
            .await?;

        info!("API server stopped");
        Ok(())
    }

    /// Stop the API server
    pub fn stop(&self) {
        info!("Stopping API server...");

        if self.shutdown_tx.send_replace(true) {
            warn!("API server was already asked to stop");
        }
    }
}
