//! Main application state and service coordination
//!
//! This module contains the AppState that owns the queue engine, the
//! metrics collector and the API server, and manages their lifecycle.

use crate::config::AppConfig;
use crate::http::{ApiServer, ApiState};
use crate::metrics::MetricsCollector;
use crate::queue::CounterQueueEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// State shared with the HTTP handlers, including the engine
    api_state: ApiState,

    /// HTTP server for the queue API
    api_server: Arc<ApiServer>,

    /// Address the API server is bound to once started
    local_addr: Option<SocketAddr>,

    /// Background task handles
    background_tasks: Vec<JoinHandle<()>>,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing {} service", config.service.name);

        crate::config::validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        let metrics_collector =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );

        let engine = CounterQueueEngine::new(config.queue.counter_count).map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create queue engine: {}", e),
            }
        })?;
        let engine = Arc::new(engine.with_metrics(metrics_collector.clone()));

        let api_state = ApiState::new(engine, metrics_collector, config.service.name.clone());
        let api_server = Arc::new(ApiServer::new(
            config.listen_addr(),
            api_state.clone(),
            &config.http,
        ));

        Ok(Self {
            config,
            api_state,
            api_server,
            local_addr: None,
            background_tasks: Vec::new(),
        })
    }

    /// Bind the listen address and start the API server
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting {} service", self.config.service.name);

        let listener =
            self.api_server
                .bind()
                .await
                .map_err(|e| ServiceError::Initialization {
                    message: format!("{:#}", e),
                })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServiceError::Initialization {
                message: format!("Failed to read bound address: {}", e),
            })?;
        self.local_addr = Some(local_addr);

        self.api_state.set_running(true).await;

        let api_server = self.api_server.clone();
        let api_state = self.api_state.clone();
        let server_handle = tokio::spawn(async move {
            if let Err(e) = api_server.serve(listener).await {
                error!("API server failed: {:#}", e);
            } else {
                info!("API server task completed");
            }
            api_state.set_running(false).await;
        });
        self.background_tasks.push(server_handle);

        info!(
            "✅ Service started on {} with {} counters",
            local_addr,
            self.config.queue.counter_count
        );
        Ok(())
    }

    /// Perform graceful shutdown
    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of {}", self.config.service.name);

        self.api_state.set_running(false).await;
        self.api_server.stop();

        for handle in self.background_tasks.drain(..) {
            if let Err(e) = handle.await {
                warn!("Background task ended abnormally: {}", e);
            }
        }

        let final_stats = self.api_state.engine.stats();
        info!("Final service statistics: {:?}", final_stats);
        info!("✅ Service shutdown completed");

        Ok(())
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Address the API server is listening on, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Check if service is running
    pub async fn is_running(&self) -> bool {
        self.api_state.is_running().await
    }

    /// State shared with HTTP handlers
    pub fn api_state(&self) -> ApiState {
        self.api_state.clone()
    }

    /// Get the queue engine
    pub fn engine(&self) -> Arc<CounterQueueEngine> {
        self.api_state.engine.clone()
    }

    /// Get the metrics collector
    pub fn metrics_collector(&self) -> Arc<MetricsCollector> {
        self.api_state.metrics_collector.clone()
    }
}
