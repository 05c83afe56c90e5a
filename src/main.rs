// =============================================================================
// Ticker Board - Main Entry Point
// =============================================================================
//
// Loads the configured price histories once, then serves the chart JSON API
// until Ctrl+C. Set ALPHAVANTAGE_API_KEY and `alpha_vantage.refresh_on_start`
// to download fresh history before loading.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod chart;
mod indicators;
mod market_data;
mod registry;
mod runtime_config;
mod types;
mod window;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::DashboardConfig;

const CONFIG_PATH: &str = "dashboard_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Ticker Board starting up");

    let mut config = DashboardConfig::load(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        DashboardConfig::default()
    });
    config.apply_env_overrides();

    info!(
        tickers = ?config.tickers.iter().map(|t| t.symbol.as_str()).collect::<Vec<_>>(),
        default_ticker = %config.default_ticker,
        data_dir = %config.data_dir.display(),
        "Configured tickers"
    );

    // ── 2. Optional history refresh ──────────────────────────────────────
    if config.alpha_vantage.refresh_on_start {
        match std::env::var("ALPHAVANTAGE_API_KEY") {
            Ok(key) if !key.trim().is_empty() => {
                if let Err(e) = app_state::refresh_from_alpha_vantage(&config, &key).await {
                    error!(error = %e, "History refresh failed, using existing files");
                }
            }
            _ => warn!("refresh_on_start is set but ALPHAVANTAGE_API_KEY is missing"),
        }
    }

    // ── 3. Load price histories & build shared state ─────────────────────
    let store = app_state::load_price_store(&config)?;
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, CONFIG_PATH, store));

    // ── 4. Serve the API ─────────────────────────────────────────────────
    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening. Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            warn!("Shutdown signal received, stopping gracefully");
        })
        .await
        .context("API server failed")?;

    info!("Ticker Board shut down complete.");
    Ok(())
}
