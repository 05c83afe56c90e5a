// =============================================================================
// REST API Endpoints - Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. This is the thin JSON boundary a chart
// front end talks to: it lists the selectable options, renders charts for a
// set of selections, and reads or tunes the study parameters.
//
// Unknown selection labels never produce a 4xx; they resolve to the registry
// defaults and are reported back in `fallbacks`.
//
// CORS is configured permissively for development.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::chart::ChartRequest;
use crate::market_data::loader::parse_timestamp;
use crate::market_data::price_store::TickerSummary;
use crate::runtime_config::StudyParams;

type ApiError = (StatusCode, Json<serde_json::Value>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/tickers", get(tickers))
        .route("/api/v1/options", get(options))
        .route("/api/v1/chart", get(chart))
        .route("/api/v1/study-params", get(get_study_params).post(set_study_params))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    tickers_loaded: usize,
    config_version: u64,
    started_at: i64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        tickers_loaded: state.store.len(),
        config_version: state.current_version(),
        started_at: state.started_at,
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Tickers & options
// =============================================================================

#[derive(Serialize)]
struct TickersResponse {
    default_ticker: String,
    tickers: Vec<TickerSummary>,
}

async fn tickers(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(TickersResponse {
        default_ticker: state.config.read().default_ticker.clone(),
        tickers: state.store.summaries(),
    })
}

async fn options(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.registries.options())
}

// =============================================================================
// Chart
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChartQuery {
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    chart_type: Option<String>,
    /// Comma-separated study labels.
    #[serde(default)]
    studies: Option<String>,
    /// Render as of this timestamp instead of the current local time.
    #[serde(default)]
    as_of: Option<String>,
}

async fn chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let now = match query.as_of.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => parse_timestamp(raw).ok_or_else(|| bad_request(format!("invalid as_of timestamp: {raw}")))?,
        None => chrono::Local::now().naive_local(),
    };

    let req = ChartRequest {
        ticker: query.ticker,
        period: query.period,
        chart_type: query.chart_type,
        studies: query
            .studies
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
    };

    Ok(Json(state.render(&req, now)))
}

// =============================================================================
// Study parameters
// =============================================================================

async fn get_study_params(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.config.read().study_params.clone())
}

#[derive(Debug, Default, Deserialize)]
struct StudyParamsUpdate {
    #[serde(default)]
    ma_window: Option<usize>,
    #[serde(default)]
    ema_window: Option<usize>,
    #[serde(default)]
    bollinger_window: Option<usize>,
    #[serde(default)]
    bollinger_num_std: Option<f64>,
    #[serde(default)]
    cci_window: Option<usize>,
    #[serde(default)]
    roc_period: Option<usize>,
    #[serde(default)]
    momentum_period: Option<usize>,
}

impl StudyParamsUpdate {
    fn validate(&self) -> Result<(), String> {
        let windows = [
            ("ma_window", self.ma_window),
            ("ema_window", self.ema_window),
            ("bollinger_window", self.bollinger_window),
            ("cci_window", self.cci_window),
            ("roc_period", self.roc_period),
            ("momentum_period", self.momentum_period),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, v)| *v == Some(0)) {
            return Err(format!("{name} must be at least 1"));
        }
        if let Some(k) = self.bollinger_num_std {
            if !k.is_finite() || k <= 0.0 {
                return Err("bollinger_num_std must be a positive number".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct StudyParamsResponse {
    #[serde(flatten)]
    params: StudyParams,
    changes: Vec<String>,
}

async fn set_study_params(
    State(state): State<Arc<AppState>>,
    Json(update): Json<StudyParamsUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    update.validate().map_err(bad_request)?;

    let mut config = state.config.write();
    let mut changes = Vec::new();

    macro_rules! apply_param {
        ($field:ident) => {
            if let Some(val) = update.$field {
                if config.study_params.$field != val {
                    changes.push(format!(
                        "{}: {} -> {}",
                        stringify!($field),
                        config.study_params.$field,
                        val
                    ));
                    config.study_params.$field = val;
                }
            }
        };
    }

    apply_param!(ma_window);
    apply_param!(ema_window);
    apply_param!(bollinger_window);
    apply_param!(bollinger_num_std);
    apply_param!(cci_window);
    apply_param!(roc_period);
    apply_param!(momentum_period);

    // Clone config and drop write lock before saving.
    let config_clone = config.clone();
    drop(config);

    if !changes.is_empty() {
        info!(changes = ?changes, "study parameters updated");

        // Save to disk (best-effort).
        if let Err(e) = config_clone.save(&state.config_path) {
            warn!(error = %e, "failed to save study parameters to disk");
        }

        state.increment_version();
    }

    Ok(Json(StudyParamsResponse {
        params: config_clone.study_params,
        changes,
    }))
}
