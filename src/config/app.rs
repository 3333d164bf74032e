//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! smart-queue service, including environment variable loading, TOML file
//! loading and validation.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub queue: QueueSettings,
    pub http: HttpSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and health reports
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Address the HTTP API binds to
    pub host: String,
    /// Port the HTTP API listens on
    pub port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
    /// Interval between periodic health log lines in seconds
    pub health_log_interval_seconds: u64,
}

/// Queue engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Number of service counters, fixed for the life of the process
    pub counter_count: usize,
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Directory of static front-end files served for unmatched GET requests
    pub static_dir: Option<PathBuf>,
    /// Allow cross-origin requests from any origin
    pub enable_cors: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "smart-queue".to_string(),
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            shutdown_timeout_seconds: 30,
            health_log_interval_seconds: 30,
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self { counter_count: 3 }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            static_dir: Some(PathBuf::from("public")),
            enable_cors: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        if let Ok(host) = env::var("HOST") {
            self.service.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.service.port = port
                .parse()
                .map_err(|_| anyhow!("Invalid PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            self.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }
        if let Ok(interval) = env::var("HEALTH_LOG_INTERVAL_SECONDS") {
            self.service.health_log_interval_seconds = interval.parse().map_err(|_| {
                anyhow!("Invalid HEALTH_LOG_INTERVAL_SECONDS value: {}", interval)
            })?;
        }

        // Queue settings
        if let Ok(count) = env::var("COUNTER_COUNT") {
            self.queue.counter_count = count
                .parse()
                .map_err(|_| anyhow!("Invalid COUNTER_COUNT value: {}", count))?;
        }

        // HTTP settings
        if let Ok(dir) = env::var("STATIC_DIR") {
            self.http.static_dir = if dir.is_empty() {
                None
            } else {
                Some(PathBuf::from(dir))
            };
        }
        if let Ok(enable_cors) = env::var("ENABLE_CORS") {
            self.http.enable_cors = enable_cors
                .parse()
                .map_err(|_| anyhow!("Invalid ENABLE_CORS value: {}", enable_cors))?;
        }

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get health log interval as Duration
    pub fn health_log_interval(&self) -> Duration {
        Duration::from_secs(self.service.health_log_interval_seconds)
    }

    /// Socket address string for the HTTP API
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.service.host, self.service.port)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    // Validate ports
    if config.service.port == 0 {
        return Err(anyhow!("Port cannot be 0"));
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.service.health_log_interval_seconds == 0 {
        return Err(anyhow!("Health log interval must be greater than 0"));
    }

    // Validate queue settings
    if config.queue.counter_count == 0 {
        return Err(anyhow!("Counter count must be greater than 0"));
    }

    Ok(())
}
