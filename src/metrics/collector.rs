//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the counter queue service
//! using Prometheus metrics.

use crate::queue::engine::EngineStats;
use crate::types::{CounterIndex, CounterLoad, UserStatus};
use anyhow::Result;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the counter queue service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Service-level metrics
    service_metrics: ServiceMetrics,

    /// Queue-related metrics
    queue_metrics: QueueMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Service-level metrics
#[derive(Clone)]
pub struct ServiceMetrics {
    /// Service uptime in seconds
    pub uptime_seconds: IntGauge,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,
}

/// Queue-related metrics
#[derive(Clone)]
pub struct QueueMetrics {
    /// Total users enrolled, by counter
    pub enrollments_total: IntCounterVec,

    /// Total status updates, by new status
    pub status_updates_total: IntCounterVec,

    /// Total rotations, by counter
    pub rotations_total: IntCounterVec,

    /// Rejected operations, by operation and error kind
    pub rejected_operations_total: IntCounterVec,

    /// Users currently queued, by counter
    pub queue_length: IntGaugeVec,

    /// Users currently counting toward load, by counter
    pub active_users: IntGaugeVec,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Engine operation durations
    pub operation_duration: HistogramVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let service_metrics = ServiceMetrics::new(&registry)?;
        let queue_metrics = QueueMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            service_metrics,
            queue_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get service metrics
    pub fn service(&self) -> &ServiceMetrics {
        &self.service_metrics
    }

    /// Get queue metrics
    pub fn queue(&self) -> &QueueMetrics {
        &self.queue_metrics
    }

    /// Record a user being enrolled at a counter
    pub fn record_enrollment(&self, counter: CounterIndex) {
        self.queue_metrics
            .enrollments_total
            .with_label_values(&[counter.to_string().as_str()])
            .inc();
    }

    /// Record a status change
    pub fn record_status_update(&self, status: UserStatus) {
        self.queue_metrics
            .status_updates_total
            .with_label_values(&[status.as_str()])
            .inc();
    }

    /// Record a counter rotation
    pub fn record_rotation(&self, counter: CounterIndex) {
        self.queue_metrics
            .rotations_total
            .with_label_values(&[counter.to_string().as_str()])
            .inc();
    }

    /// Record an operation rejected by the engine
    pub fn record_rejection(&self, operation: &str, kind: &str) {
        self.queue_metrics
            .rejected_operations_total
            .with_label_values(&[operation, kind])
            .inc();
    }

    /// Refresh the gauges for one counter
    pub fn update_counter_load(&self, load: CounterLoad) {
        let label = load.counter.to_string();
        self.queue_metrics
            .queue_length
            .with_label_values(&[label.as_str()])
            .set(load.queued as i64);
        self.queue_metrics
            .active_users
            .with_label_values(&[label.as_str()])
            .set(load.active as i64);
    }

    /// Update gauges from a full engine stats snapshot
    pub fn update_from_engine_stats(&self, stats: &EngineStats) {
        for load in &stats.counters {
            self.update_counter_load(*load);
        }
    }

    /// Record engine operation duration
    pub fn record_operation(&self, operation: &str, duration: Duration) {
        self.performance_metrics
            .operation_duration
            .with_label_values(&[operation])
            .observe(duration.as_secs_f64());
    }

    /// Update uptime
    pub fn update_uptime(&self, seconds: i64) {
        self.service_metrics.uptime_seconds.set(seconds);
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.service_metrics.health_status.set(status as i64);
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl ServiceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let uptime_seconds =
            IntGauge::new("smart_queue_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let health_status = IntGauge::new(
            "smart_queue_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        Ok(Self {
            uptime_seconds,
            health_status,
        })
    }
}

impl QueueMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let enrollments_total = IntCounterVec::new(
            Opts::new("smart_queue_enrollments_total", "Total users enrolled"),
            &["counter"],
        )?;
        registry.register(Box::new(enrollments_total.clone()))?;

        let status_updates_total = IntCounterVec::new(
            Opts::new(
                "smart_queue_status_updates_total",
                "Total user status updates",
            ),
            &["status"],
        )?;
        registry.register(Box::new(status_updates_total.clone()))?;

        let rotations_total = IntCounterVec::new(
            Opts::new("smart_queue_rotations_total", "Total counter rotations"),
            &["counter"],
        )?;
        registry.register(Box::new(rotations_total.clone()))?;

        let rejected_operations_total = IntCounterVec::new(
            Opts::new(
                "smart_queue_rejected_operations_total",
                "Operations rejected by the queue engine",
            ),
            &["operation", "kind"],
        )?;
        registry.register(Box::new(rejected_operations_total.clone()))?;

        let queue_length = IntGaugeVec::new(
            Opts::new("smart_queue_queue_length", "Users currently queued"),
            &["counter"],
        )?;
        registry.register(Box::new(queue_length.clone()))?;

        let active_users = IntGaugeVec::new(
            Opts::new(
                "smart_queue_active_users",
                "Users currently counting toward counter load",
            ),
            &["counter"],
        )?;
        registry.register(Box::new(active_users.clone()))?;

        Ok(Self {
            enrollments_total,
            status_updates_total,
            rotations_total,
            rejected_operations_total,
            queue_length,
            active_users,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "smart_queue_operation_duration_seconds",
                "Queue engine operation duration",
            )
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self { operation_duration })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
