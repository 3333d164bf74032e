//! Smart Queue - service counter queueing microservice
//!
//! This crate provides an in-memory engine that assigns users to the
//! least-loaded service counter, tracks their service status and rotates
//! counter queues, plus the HTTP API that exposes it.

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod queue;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{QueueError, Result};
pub use types::*;

// Re-export key components
pub use queue::{CounterQueueEngine, CounterSelector, LeastLoadedSelector};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
