// =============================================================================
// Dashboard Configuration - JSON settings with atomic save
// =============================================================================
//
// Every tunable of the service lives here: where price history comes from,
// which tickers are served, the indicator defaults, and any extra study or
// period labels to add to the selectors.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::indicators::{bollinger, cci, momentum, moving_average, roc};
use crate::registry::{StudyKind, StudySpec};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_bind_addr() -> String {
    "0.0.0.0:8050".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_tickers() -> Vec<TickerSource> {
    vec![TickerSource {
        symbol: "MSFT".to_string(),
        file: PathBuf::from("msft_prices.csv"),
    }]
}

fn default_ticker() -> String {
    "MSFT".to_string()
}

fn default_ma_window() -> usize {
    moving_average::DEFAULT_MA_WINDOW
}

fn default_ema_window() -> usize {
    moving_average::DEFAULT_EMA_WINDOW
}

fn default_bollinger_window() -> usize {
    bollinger::DEFAULT_WINDOW
}

fn default_bollinger_num_std() -> f64 {
    bollinger::DEFAULT_NUM_STD
}

fn default_cci_window() -> usize {
    cci::DEFAULT_WINDOW
}

fn default_roc_period() -> usize {
    roc::DEFAULT_PERIOD
}

fn default_momentum_period() -> usize {
    momentum::DEFAULT_PERIOD
}

fn default_av_interval() -> String {
    "1min".to_string()
}

fn default_av_output_size() -> String {
    "full".to_string()
}

// =============================================================================
// StudyParams
// =============================================================================

/// Default window sizes and multipliers for every study. Individual registry
/// entries may override the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyParams {
    /// "Moving average" window.
    #[serde(default = "default_ma_window")]
    pub ma_window: usize,

    /// "Exponential moving average" window (a simple mean, see indicators).
    #[serde(default = "default_ema_window")]
    pub ema_window: usize,

    #[serde(default = "default_bollinger_window")]
    pub bollinger_window: usize,

    /// Band distance in standard deviations.
    #[serde(default = "default_bollinger_num_std")]
    pub bollinger_num_std: f64,

    #[serde(default = "default_cci_window")]
    pub cci_window: usize,

    #[serde(default = "default_roc_period")]
    pub roc_period: usize,

    #[serde(default = "default_momentum_period")]
    pub momentum_period: usize,
}

impl Default for StudyParams {
    fn default() -> Self {
        Self {
            ma_window: default_ma_window(),
            ema_window: default_ema_window(),
            bollinger_window: default_bollinger_window(),
            bollinger_num_std: default_bollinger_num_std(),
            cci_window: default_cci_window(),
            roc_period: default_roc_period(),
            momentum_period: default_momentum_period(),
        }
    }
}

// =============================================================================
// Sources and custom labels
// =============================================================================

/// A ticker and the CSV file (relative to `data_dir` unless absolute) that
/// holds its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSource {
    pub symbol: String,
    pub file: PathBuf,
}

impl TickerSource {
    /// Conventional `<symbol>_prices.csv` source for a bare ticker symbol.
    pub fn for_symbol(symbol: &str) -> Self {
        let symbol = symbol.trim().to_uppercase();
        Self {
            file: PathBuf::from(format!("{}_prices.csv", symbol.to_lowercase())),
            symbol,
        }
    }
}

/// An extra study label registered on top of the built-in ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomStudy {
    pub label: String,
    pub kind: StudyKind,
    #[serde(default)]
    pub window: Option<usize>,
    #[serde(default)]
    pub num_std: Option<f64>,
}

impl CustomStudy {
    pub fn spec(&self) -> StudySpec {
        StudySpec {
            kind: self.kind,
            window: self.window,
            num_std: self.num_std,
        }
    }
}

/// Optional refresh of the CSV files from Alpha Vantage at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlphaVantageSettings {
    /// Download fresh history for every ticker before loading. Requires
    /// `ALPHAVANTAGE_API_KEY`.
    #[serde(default)]
    pub refresh_on_start: bool,

    /// `1min`, `5min`, `15min`, `30min`, `60min` or `daily`.
    #[serde(default = "default_av_interval")]
    pub interval: String,

    /// `compact` (last 100 bars) or `full`.
    #[serde(default = "default_av_output_size")]
    pub output_size: String,
}

impl Default for AlphaVantageSettings {
    fn default() -> Self {
        Self {
            refresh_on_start: false,
            interval: default_av_interval(),
            output_size: default_av_output_size(),
        }
    }
}

// =============================================================================
// DashboardConfig
// =============================================================================

/// Top-level configuration.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Address the JSON API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory holding the per-ticker CSV files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_tickers")]
    pub tickers: Vec<TickerSource>,

    /// Ticker used when a request names none.
    #[serde(default = "default_ticker")]
    pub default_ticker: String,

    /// Anchor chart windows at their requested start when history begins
    /// later than that.
    #[serde(default = "default_true")]
    pub pad_window_start: bool,

    #[serde(default)]
    pub study_params: StudyParams,

    /// Extra study labels, e.g. `{ "label": "MA 50", "kind": "moving_average", "window": 50 }`.
    #[serde(default)]
    pub custom_studies: Vec<CustomStudy>,

    /// Extra period labels in compact form, e.g. `"8h"` or `"2J"`.
    #[serde(default)]
    pub custom_periods: Vec<String>,

    #[serde(default)]
    pub alpha_vantage: AlphaVantageSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            data_dir: default_data_dir(),
            tickers: default_tickers(),
            default_ticker: default_ticker(),
            pad_window_start: true,
            study_params: StudyParams::default(),
            custom_studies: Vec::new(),
            custom_periods: Vec::new(),
            alpha_vantage: AlphaVantageSettings::default(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        info!(
            path = %path.display(),
            tickers = config.tickers.len(),
            data_dir = %config.data_dir.display(),
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise dashboard config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "dashboard config saved (atomic)");
        Ok(())
    }

    /// Apply `TICKER_BOARD_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("TICKER_BOARD_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Ok(dir) = std::env::var("TICKER_BOARD_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(list) = std::env::var("TICKER_BOARD_TICKERS") {
            self.set_tickers_from_list(&list);
        }
    }

    /// Replace the ticker list from a comma-separated list of symbols, each
    /// mapped to its conventional `<symbol>_prices.csv` file.
    pub fn set_tickers_from_list(&mut self, list: &str) {
        let tickers: Vec<TickerSource> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(TickerSource::for_symbol)
            .collect();
        if tickers.is_empty() {
            warn!(list, "ticker override is empty, keeping configured tickers");
            return;
        }
        if !tickers.iter().any(|t| t.symbol == self.default_ticker.to_uppercase()) {
            self.default_ticker = tickers[0].symbol.clone();
        }
        self.tickers = tickers;
    }

    /// Absolute or `data_dir`-relative path of a ticker's CSV.
    pub fn resolve_path(&self, source: &TickerSource) -> PathBuf {
        if source.file.is_absolute() {
            source.file.clone()
        } else {
            self.data_dir.join(&source.file)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8050");
        assert_eq!(cfg.tickers.len(), 1);
        assert_eq!(cfg.tickers[0].symbol, "MSFT");
        assert_eq!(cfg.default_ticker, "MSFT");
        assert!(cfg.pad_window_start);
        assert_eq!(cfg.study_params.ma_window, 5);
        assert_eq!(cfg.study_params.ema_window, 20);
        assert_eq!(cfg.study_params.bollinger_window, 10);
        assert!((cfg.study_params.bollinger_num_std - 5.0).abs() < f64::EPSILON);
        assert_eq!(cfg.study_params.cci_window, 20);
        assert_eq!(cfg.study_params.roc_period, 5);
        assert_eq!(cfg.study_params.momentum_period, 5);
        assert!(!cfg.alpha_vantage.refresh_on_start);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, DashboardConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "study_params": { "cci_window": 10 },
            "custom_studies": [ { "label": "MA 50", "kind": "moving_average", "window": 50 } ]
        }"#;
        let cfg: DashboardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.study_params.cci_window, 10);
        assert_eq!(cfg.study_params.ma_window, 5);
        assert_eq!(cfg.custom_studies[0].spec().window, Some(50));
        assert_eq!(cfg.tickers[0].symbol, "MSFT");
    }

    #[test]
    fn roundtrip_serialisation() {
        let mut cfg = DashboardConfig::default();
        cfg.custom_periods.push("8h".to_string());
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: DashboardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, cfg2);
    }

    #[test]
    fn ticker_list_override() {
        let mut cfg = DashboardConfig::default();
        cfg.set_tickers_from_list(" aapl, ibm ,,");
        assert_eq!(cfg.tickers.len(), 2);
        assert_eq!(cfg.tickers[0].symbol, "AAPL");
        assert_eq!(cfg.tickers[0].file, PathBuf::from("aapl_prices.csv"));
        assert_eq!(cfg.default_ticker, "AAPL");

        cfg.set_tickers_from_list(" , ");
        assert_eq!(cfg.tickers.len(), 2);
    }

    #[test]
    fn relative_paths_join_data_dir() {
        let cfg = DashboardConfig::default();
        let p = cfg.resolve_path(&cfg.tickers[0]);
        assert_eq!(p, PathBuf::from("data").join("msft_prices.csv"));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("ticker-board-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dashboard_config.json");

        let mut cfg = DashboardConfig::default();
        cfg.study_params.bollinger_num_std = 2.0;
        cfg.save(&path).unwrap();
        let loaded = DashboardConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert!(!path.with_extension("json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
