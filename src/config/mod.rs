//! Configuration management for the smart-queue service
//!
//! This module handles configuration loading from defaults, environment
//! variables and TOML files, plus validation.

pub mod app;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, HttpSettings, QueueSettings, ServiceSettings};
