// =============================================================================
// Central Application State
// =============================================================================
//
// Ties together the loaded price histories, the selection registries and the
// live configuration, and exposes the one operation the HTTP layer needs:
// render a chart for a set of selections.
//
// Thread safety:
//   - The price store is immutable after startup and shared via Arc.
//   - parking_lot::RwLock guards the configuration (study parameters can be
//     changed at runtime).
//   - An atomic counter tracks configuration changes.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use parking_lot::RwLock;
use tracing::{error, info, warn};

use crate::chart::{ChartEngine, ChartRequest, ChartResponse};
use crate::market_data::alpha_vantage::{AlphaVantageClient, SeriesRequest};
use crate::market_data::loader::write_csv;
use crate::market_data::{load_csv, PriceStore};
use crate::registry::Registries;
use crate::runtime_config::DashboardConfig;
use crate::types::Timestamp;
use crate::window::WindowSelector;

// =============================================================================
// AppState
// =============================================================================

/// Shared state handed to every request handler via `Arc<AppState>`.
pub struct AppState {
    /// Incremented on every configuration change.
    pub config_version: AtomicU64,
    pub config: RwLock<DashboardConfig>,
    /// Where runtime changes are persisted.
    pub config_path: PathBuf,
    pub store: Arc<PriceStore>,
    pub registries: Registries,
    pub started_at: i64,
}

impl AppState {
    pub fn new(config: DashboardConfig, config_path: impl Into<PathBuf>, store: PriceStore) -> Self {
        let registries = Registries::from_config(&config);
        info!(
            tickers = store.len(),
            periods = registries.periods.len(),
            chart_types = registries.chart_types.len(),
            studies = registries.studies.len(),
            "application state initialised"
        );
        Self {
            config_version: AtomicU64::new(1),
            config: RwLock::new(config),
            config_path: config_path.into(),
            store: Arc::new(store),
            registries,
            started_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn increment_version(&self) -> u64 {
        self.config_version.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_version(&self) -> u64 {
        self.config_version.load(Ordering::SeqCst)
    }

    /// Render a chart as of `now` with the current study parameters.
    pub fn render(&self, req: &ChartRequest, now: Timestamp) -> ChartResponse {
        let config = self.config.read();
        let engine = ChartEngine {
            store: &self.store,
            registries: &self.registries,
            params: &config.study_params,
            selector: WindowSelector::new(config.pad_window_start),
            default_ticker: &config.default_ticker,
        };
        engine.render_request(req, now)
    }
}

// =============================================================================
// Startup loading
// =============================================================================

/// Load every configured ticker's CSV.
///
/// A ticker whose file is missing or malformed is logged and skipped; startup
/// only fails when tickers are configured and none of them load.
pub fn load_price_store(config: &DashboardConfig) -> Result<PriceStore> {
    let mut store = PriceStore::new();
    for source in &config.tickers {
        let path = config.resolve_path(source);
        match load_csv(&path) {
            Ok(series) => {
                if series.is_empty() {
                    warn!(ticker = %source.symbol, path = %path.display(), "price history is empty");
                }
                store.insert(&source.symbol, series);
            }
            Err(e) => {
                error!(ticker = %source.symbol, path = %path.display(), error = %e, "failed to load price history");
            }
        }
    }

    if !config.tickers.is_empty() && store.is_empty() {
        bail!(
            "none of the {} configured tickers could be loaded from {}",
            config.tickers.len(),
            config.data_dir.display()
        );
    }
    info!(loaded = store.len(), configured = config.tickers.len(), "price store ready");
    Ok(store)
}

/// Download fresh history for every configured ticker and overwrite its CSV.
///
/// Returns the number of tickers refreshed. Individual failures are logged
/// and leave the existing file untouched.
pub async fn refresh_from_alpha_vantage(config: &DashboardConfig, api_key: &str) -> Result<usize> {
    let client = AlphaVantageClient::new(api_key)?;
    let request = SeriesRequest::from_interval(&config.alpha_vantage.interval);

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        warn!(dir = %config.data_dir.display(), error = %e, "failed to create data directory");
    }

    let mut refreshed = 0;
    for source in &config.tickers {
        let records = match client
            .fetch_series(&source.symbol, &request, &config.alpha_vantage.output_size)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                error!(ticker = %source.symbol, error = %e, "alpha vantage refresh failed");
                continue;
            }
        };
        let path = config.resolve_path(source);
        match write_csv(&path, &records) {
            Ok(()) => refreshed += 1,
            Err(e) => error!(ticker = %source.symbol, error = %e, "failed to write refreshed history"),
        }
    }
    info!(refreshed, configured = config.tickers.len(), "alpha vantage refresh complete");
    Ok(refreshed)
}
