//! Main entry point for the Smart Queue service
//!
//! This is the production entry point that initializes and runs the
//! counter queue service with proper error handling, logging, and
//! graceful shutdown.

use anyhow::Result;
use clap::Parser;
use smart_queue::config::{validate_config, AppConfig};
use smart_queue::http::ApiState;
use smart_queue::service::{AppState, HealthCheck};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// Smart Queue Service - least-loaded service counter queueing
#[derive(Parser)]
#[command(
    name = "smart-queue",
    version,
    about = "A service-counter queueing microservice",
    long_about = "Smart Queue keeps an ordered queue of users for each service counter, \
                 enrolls new users into the counter with the fewest active users, and \
                 exposes an HTTP API to mark users and rotate counter queues."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Bind address override
    #[arg(long, value_name = "HOST", help = "Override HTTP bind address")]
    host: Option<String>,

    /// HTTP port override
    #[arg(short, long, value_name = "PORT", help = "Override HTTP server port")]
    port: Option<u16>,

    /// Counter count override
    #[arg(long, value_name = "N", help = "Override the number of service counters")]
    counters: Option<usize>,

    /// Static directory override
    #[arg(
        long,
        value_name = "DIR",
        help = "Serve static front-end files from this directory"
    )]
    static_dir: Option<PathBuf>,

    /// Disable CORS
    #[arg(long, help = "Disable permissive cross-origin requests")]
    no_cors: bool,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Log a health summary periodically
async fn health_check_task(api_state: ApiState, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately
    interval.tick().await;

    while api_state.is_running().await {
        interval.tick().await;

        let health = HealthCheck::check(&api_state).await;
        info!(
            "Health check: {} - {} users queued ({} active), {} enrolled, uptime {}",
            health.status,
            health.stats.total_users,
            health.stats.active_users,
            health.stats.users_enrolled,
            health.stats.uptime_info
        );
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("🚀 Smart Queue Service");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    info!("   Listen: {}", config.listen_addr());
    info!("   Counters: {}", config.queue.counter_count);
    match &config.http.static_dir {
        Some(dir) => info!("   Static files: {}", dir.display()),
        None => info!("   Static files: disabled"),
    }
    info!("   CORS: {}", config.http.enable_cors);
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment, file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(host) = &args.host {
        config.service.host = host.clone();
    }

    if let Some(port) = args.port {
        config.service.port = port;
    }

    if let Some(counters) = args.counters {
        config.queue.counter_count = counters;
    }

    if let Some(static_dir) = &args.static_dir {
        config.http.static_dir = Some(static_dir.clone());
    }

    if args.no_cors {
        config.http.enable_cors = false;
    }

    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {:#}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    display_startup_banner(&config);

    info!("Initializing service components...");
    let mut app_state = match AppState::new(config.clone()) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting service...");
    if let Err(e) = app_state.start().await {
        error!("Failed to start service: {}", e);
        std::process::exit(1);
    }

    let health_task = tokio::spawn(health_check_task(
        app_state.api_state(),
        config.health_log_interval(),
    ));

    info!("✅ Smart Queue Service is running");
    info!("Press Ctrl+C to shutdown gracefully...");

    wait_for_shutdown_signal().await;

    info!("🛑 Shutdown signal received, beginning graceful shutdown...");

    health_task.abort();

    match tokio::time::timeout(config.shutdown_timeout(), app_state.shutdown()).await {
        Ok(Ok(())) => {
            info!("✅ Graceful shutdown completed successfully");
        }
        Ok(Err(e)) => {
            error!("Shutdown failed: {}", e);
        }
        Err(_) => {
            warn!("⚠️  Shutdown timeout exceeded, forcing exit");
        }
    }

    info!("🛑 Smart Queue Service stopped");
    Ok(())
}
