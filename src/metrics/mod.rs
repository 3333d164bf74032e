//! Metrics and monitoring for the counter queue service
//!
//! This module provides Prometheus metrics collection for queue operations.
//! The `/metrics` endpoint itself is served by the HTTP API.

pub mod collector;

pub use collector::{MetricsCollector, MetricsTimer, PerformanceMetrics, QueueMetrics, ServiceMetrics};

use prometheus::{Encoder, TextEncoder};

/// Encode every metric in the collector's registry in Prometheus text format
pub fn encode_text(collector: &MetricsCollector) -> anyhow::Result<(String, String)> {
    let metric_families = collector.registry().gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {}", e))?;

    let text = String::from_utf8(buffer)
        .map_err(|e| anyhow::anyhow!("Metrics output is not UTF-8: {}", e))?;
    Ok((text, encoder.format_type().to_string()))
}
