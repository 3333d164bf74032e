//! Health check reporting
//!
//! This module provides health check functionality for the smart-queue
//! service, including the liveness probe and the detailed stats report.

use crate::http::ApiState;
use crate::types::CounterLoad;
use crate::utils::{current_timestamp, format_uptime};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Health check status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Gauge value exported to Prometheus
    pub fn as_gauge(self) -> u8 {
        match self {
            HealthStatus::Healthy => 2,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 0,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
            HealthStatus::Unhealthy => write!(f, "❌ unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Detailed component checks
    pub checks: Vec<ComponentCheck>,
    /// Service statistics
    pub stats: ServiceStats,
}

/// Individual component health check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCheck {
    /// Component name
    pub name: String,
    /// Component status
    pub status: HealthStatus,
    /// Optional message if not healthy
    pub message: Option<String>,
}

/// Service statistics for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStats {
    /// Number of service counters
    pub counter_count: usize,
    /// Users currently queued
    pub total_users: usize,
    /// Users currently counting toward load
    pub active_users: usize,
    /// Users enrolled since service start
    pub users_enrolled: u64,
    /// Status updates since service start
    pub status_updates: u64,
    /// Rotations since service start
    pub rotations: u64,
    /// Rejected operations since service start
    pub rejected_operations: u64,
    /// Per-counter load
    pub counters: Vec<CounterLoad>,
    /// Service uptime information
    pub uptime_info: String,
}

impl HealthCheck {
    /// Perform a full health check of the service
    pub async fn check(state: &ApiState) -> Self {
        let mut checks = Vec::new();

        let service_check = Self::check_service_running(state).await;
        let mut overall_status = service_check.status;
        checks.push(service_check);

        let engine_check = Self::check_queue_engine(state);
        if engine_check.status == HealthStatus::Unhealthy {
            overall_status = HealthStatus::Unhealthy;
        } else if engine_check.status == HealthStatus::Degraded
            && overall_status == HealthStatus::Healthy
        {
            overall_status = HealthStatus::Degraded;
        }
        checks.push(engine_check);

        let stats = Self::gather_service_stats(state);
        state
            .metrics_collector
            .update_health_status(overall_status.as_gauge());

        debug!("Health check completed: {}", overall_status);

        HealthCheck {
            status: overall_status,
            service: state.service_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: current_timestamp(),
            checks,
            stats,
        }
    }

    /// Liveness probe: the service is alive while it is accepting requests
    pub async fn liveness_check(state: &ApiState) -> HealthStatus {
        if state.is_running().await {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }

    async fn check_service_running(state: &ApiState) -> ComponentCheck {
        let running = state.is_running().await;

        ComponentCheck {
            name: "service".to_string(),
            status: if running {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            },
            message: (!running).then(|| "Service is not running".to_string()),
        }
    }

    fn check_queue_engine(state: &ApiState) -> ComponentCheck {
        let poisoned = state.engine.poisoned_counters();

        if poisoned.is_empty() {
            ComponentCheck {
                name: "queue_engine".to_string(),
                status: HealthStatus::Healthy,
                message: None,
            }
        } else {
            ComponentCheck {
                name: "queue_engine".to_string(),
                status: HealthStatus::Degraded,
                message: Some(format!(
                    "Counters {:?} recovered from a panic during a mutation",
                    poisoned
                )),
            }
        }
    }

    fn gather_service_stats(state: &ApiState) -> ServiceStats {
        let stats = state.engine.stats();
        state.metrics_collector.update_from_engine_stats(&stats);

        ServiceStats {
            counter_count: stats.counters.len(),
            total_users: stats.total_users,
            active_users: stats.active_users,
            users_enrolled: stats.users_enrolled,
            status_updates: stats.status_updates,
            rotations: stats.rotations,
            rejected_operations: stats.rejected_operations,
            counters: stats.counters,
            uptime_info: format_uptime(state.started_at),
        }
    }
}
