//! # Callback Hub Runtime
//!
//! Entry point for the hub process.
//!
//! ## Configuration
//!
//! Starts from `HubConfig::default()`, then applies in order:
//!
//! - `HUB_CONFIG`: path to a JSON file with any subset of the config
//! - `HUB_HOST`, `HUB_PORT`
//! - `HUB_VERIFY_TIMEOUT_MS`, `HUB_DELIVERY_TIMEOUT_MS`
//! - `HUB_MAX_CONCURRENT_DELIVERIES`
//!
//! Log level comes from `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use hub_core::{build_router, HubApi, HubConfig, HubService, ReqwestCallbackClient};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Load configuration from an optional file and the environment.
fn load_config() -> Result<HubConfig> {
    let mut config = match std::env::var("HUB_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file {path}"))?;
            let config: HubConfig = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse config file {path}"))?;
            info!(path = %path, "Loaded configuration file");
            config
        }
        Err(_) => HubConfig::default(),
    };

    if let Some(host) = env_override("HUB_HOST") {
        config.http.host = host;
    }
    if let Some(port) = env_override("HUB_PORT") {
        config.http.port = port;
    }
    if let Some(ms) = env_override::<u64>("HUB_VERIFY_TIMEOUT_MS") {
        config.verification.timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = env_override::<u64>("HUB_DELIVERY_TIMEOUT_MS") {
        config.distribution.timeout = Duration::from_millis(ms);
    }
    if let Some(n) = env_override("HUB_MAX_CONCURRENT_DELIVERIES") {
        config.distribution.max_concurrent_deliveries = n;
    }

    config.validate().context("invalid hub configuration")?;
    Ok(config)
}

/// Parsed value of `name`, or `None` (with a warning) if unset or unparsable.
fn env_override<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    info!("Initiating graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = load_config()?;

    let client = Arc::new(
        ReqwestCallbackClient::new(&config).context("failed to build callback client")?,
    );
    let hub: Arc<dyn HubApi> = Arc::new(HubService::new(config.clone(), client)?);
    let router = build_router(hub, &config);

    let addr = config.http_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("===========================================");
    info!("  Callback Hub v{}", hub_core::VERSION);
    info!("===========================================");
    info!(
        addr = %addr,
        verify_timeout_ms = config.verification.timeout.as_millis() as u64,
        delivery_timeout_ms = config.distribution.timeout.as_millis() as u64,
        max_concurrent_deliveries = config.distribution.max_concurrent_deliveries,
        "Hub listening. Press Ctrl+C to stop."
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutdown complete");
    Ok(())
}
