//! TTL Cache demo binary
//!
//! Starts an engine from environment configuration, serves a couple of
//! fetches so hits and misses show up in the logs, then idles until
//! shutdown.

use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::{CacheEngine, CacheOptions, Config};

/// Main entry point for the demo.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Start the cache engine (backend + sweeper)
/// 4. Run a few fetches against it
/// 5. Shut down on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={:?}, sweep_interval={}ms, adapter={}",
        config.default_ttl, config.sweep_interval_ms, config.adapter
    );

    let engine: CacheEngine<String> =
        CacheEngine::start(&config).context("failed to start cache engine")?;
    let cache = engine.client_with(CacheOptions::new().name("demo"));

    for attempt in 1..=2 {
        let started = tokio::time::Instant::now();
        let greeting: anyhow::Result<String> = cache
            .fetch("greeting", &CacheOptions::new().ttl(10_000i64), || async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok("hello from a slow computation".to_string())
            })
            .await;
        info!(
            "Fetch #{}: {:?} in {:?}",
            attempt,
            greeting.context("computation failed")?,
            started.elapsed()
        );
    }

    if let Some(stats) = engine.stats() {
        info!("Stats: {}", serde_json::to_string(&stats)?);
    }

    shutdown_signal().await;
    engine.shutdown();
    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
