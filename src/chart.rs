// =============================================================================
// Chart Rendering Requests
// =============================================================================
//
// The single entry point the presentation layer calls on every refresh:
//
//   (ticker, period label, chart-type label, study labels[])
//     -> main price series + overlay series + subplot series
//
// Each call re-selects the window and recomputes every requested study from
// scratch; nothing is cached between calls. Unknown labels fall back to the
// registry defaults and an unknown ticker yields an empty "no data" response.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::market_data::price_store::normalize_ticker;
use crate::market_data::PriceStore;
use crate::registry::{ChartStyle, Registries};
use crate::runtime_config::StudyParams;
use crate::types::{IndicatorSeries, Placement, PriceRecord, Timestamp};
use crate::window::WindowSelector;

// =============================================================================
// Request / response types
// =============================================================================

/// Selections made in the UI. Every field is optional; absent values use the
/// registry defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChartRequest {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub studies: Vec<String>,
}

/// One main-chart point. Prices are `None` for the window anchor, and
/// open/high/low are `None` for close-only styles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OhlcPoint {
    pub timestamp: Timestamp,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl From<&PriceRecord> for OhlcPoint {
    fn from(r: &PriceRecord) -> Self {
        let finite = |v: f64| Some(v).filter(|x| x.is_finite());
        Self {
            timestamp: r.timestamp,
            open: finite(r.open),
            high: finite(r.high),
            low: finite(r.low),
            close: finite(r.close),
            volume: finite(r.volume),
        }
    }
}

impl OhlcPoint {
    /// Line and area charts carry only the close.
    pub fn for_style(r: &PriceRecord, style: ChartStyle) -> Self {
        let point = Self::from(r);
        if !style.close_only() {
            return point;
        }
        Self {
            open: None,
            high: None,
            low: None,
            ..point
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MainSeries {
    pub style: ChartStyle,
    pub points: Vec<OhlcPoint>,
}

/// All series produced by one selected study.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyOutput {
    pub label: String,
    pub placement: Placement,
    pub series: Vec<IndicatorSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartResponse {
    pub ticker: String,
    /// False when the ticker is unknown; all series are then empty.
    pub has_data: bool,
    pub period: String,
    pub period_hours: u64,
    pub chart_type: String,
    pub start: Timestamp,
    pub end: Timestamp,
    /// True when the first main point is the synthetic window anchor.
    pub anchored: bool,
    pub main: MainSeries,
    pub overlays: Vec<StudyOutput>,
    pub subplots: Vec<StudyOutput>,
    /// Requested labels that were unknown and replaced by a default.
    pub fallbacks: Vec<String>,
}

// =============================================================================
// ChartEngine
// =============================================================================

/// Borrowed view over everything a render needs.
pub struct ChartEngine<'a> {
    pub store: &'a PriceStore,
    pub registries: &'a Registries,
    pub params: &'a StudyParams,
    pub selector: WindowSelector,
    pub default_ticker: &'a str,
}

impl<'a> ChartEngine<'a> {
    /// Compute the chart for `req` as of `now`.
    pub fn render_request(&self, req: &ChartRequest, now: Timestamp) -> ChartResponse {
        let mut fallbacks = Vec::new();

        let ticker = normalize_ticker(
            req.ticker
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(self.default_ticker),
        );

        let period = self.registries.periods.resolve(req.period.as_deref());
        if period.fell_back {
            fallbacks.extend(req.period.clone());
        }
        let chart_type = self.registries.chart_types.resolve(req.chart_type.as_deref());
        if chart_type.fell_back {
            fallbacks.extend(req.chart_type.clone());
        }

        let period_hours = period.entry.value.hours();
        let style = chart_type.entry.value;

        let Some(series) = self.store.get(&ticker) else {
            info!(ticker = %ticker, "no price history for ticker");
            let start = crate::window::window_start(now, period_hours);
            return ChartResponse {
                ticker,
                has_data: false,
                period: period.entry.label.clone(),
                period_hours,
                chart_type: chart_type.entry.label.clone(),
                start,
                end: now,
                anchored: false,
                main: MainSeries {
                    style,
                    points: Vec::new(),
                },
                overlays: Vec::new(),
                subplots: Vec::new(),
                fallbacks,
            };
        };

        let window = self.selector.select(&series, now, period_hours);
        let records = window.records();

        let mut overlays = Vec::new();
        let mut subplots = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        for requested in &req.studies {
            let study = self.registries.studies.resolve(Some(requested));
            if study.fell_back {
                fallbacks.push(requested.clone());
            }
            let label = study.entry.label.as_str();
            if seen.contains(&label) {
                continue;
            }
            seen.push(label);

            let spec = &study.entry.value;
            let output = StudyOutput {
                label: label.to_string(),
                placement: spec.placement(),
                series: spec.compute(records, self.params),
            };
            match output.placement {
                Placement::Overlay => overlays.push(output),
                Placement::Subplot => subplots.push(output),
            }
        }

        debug!(
            ticker = %ticker,
            period = %period.entry.label,
            chart_type = %chart_type.entry.label,
            points = records.len(),
            overlays = overlays.len(),
            subplots = subplots.len(),
            "chart rendered"
        );

        ChartResponse {
            ticker,
            has_data: true,
            period: period.entry.label.clone(),
            period_hours,
            chart_type: chart_type.entry.label.clone(),
            start: window.start,
            end: window.end,
            anchored: window.anchored,
            main: MainSeries {
                style,
                points: records.iter().map(|r| OhlcPoint::for_style(r, style)).collect(),
            },
            overlays,
            subplots,
            fallbacks,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::PriceSeries;
    use crate::types::test_support::{flat_bars, ts};

    fn store_with_msft(hours: usize) -> PriceStore {
        let closes: Vec<f64> = (0..hours).map(|i| 100.0 + (i % 7) as f64).collect();
        let mut store = PriceStore::new();
        store.insert("MSFT", PriceSeries::from_sorted(flat_bars(&closes)));
        store
    }

    fn engine<'a>(store: &'a PriceStore, regs: &'a Registries, params: &'a StudyParams, anchor: bool) -> ChartEngine<'a> {
        ChartEngine {
            store,
            registries: regs,
            params,
            selector: WindowSelector::new(anchor),
            default_ticker: "MSFT",
        }
    }

    fn req(period: &str, chart: &str, studies: &[&str]) -> ChartRequest {
        ChartRequest {
            ticker: Some("msft".to_string()),
            period: Some(period.to_string()),
            chart_type: Some(chart.to_string()),
            studies: studies.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn splits_overlays_and_subplots() {
        let store = store_with_msft(200);
        let (regs, params) = (Registries::default(), StudyParams::default());
        let resp = engine(&store, &regs, &params, false).render_request(
            &req("7d", "Line", &["Moving average", "CCI", "PP", "MOM"]),
            ts(199),
        );
        assert!(resp.has_data);
        assert_eq!(resp.ticker, "MSFT");
        assert_eq!(resp.period_hours, 168);
        assert_eq!(resp.main.style, ChartStyle::Line);
        assert_eq!(resp.main.points.len(), 169);
        assert_eq!(resp.overlays.iter().map(|o| o.label.as_str()).collect::<Vec<_>>(), vec!["Moving average", "PP"]);
        assert_eq!(resp.subplots.iter().map(|o| o.label.as_str()).collect::<Vec<_>>(), vec!["CCI", "MOM"]);
        for out in resp.overlays.iter().chain(&resp.subplots) {
            for s in &out.series {
                assert_eq!(s.len(), resp.main.points.len());
                assert_eq!(s.points[0].timestamp, resp.main.points[0].timestamp);
            }
        }
        assert!(resp.fallbacks.is_empty());
    }

    #[test]
    fn unknown_ticker_is_no_data() {
        let store = store_with_msft(10);
        let (regs, params) = (Registries::default(), StudyParams::default());
        let mut r = req("24h", "Candlestick", &["CCI"]);
        r.ticker = Some("NOPE".to_string());
        let resp = engine(&store, &regs, &params, true).render_request(&r, ts(9));
        assert!(!resp.has_data);
        assert!(resp.main.points.is_empty());
        assert!(resp.overlays.is_empty() && resp.subplots.is_empty());
    }

    #[test]
    fn unknown_labels_fall_back_to_defaults() {
        let store = store_with_msft(48);
        let (regs, params) = (Registries::default(), StudyParams::default());
        let resp = engine(&store, &regs, &params, false)
            .render_request(&req("13X", "Hologram", &["Astrology"]), ts(47));
        assert_eq!(resp.period, "24h");
        assert_eq!(resp.chart_type, "Candlestick");
        assert_eq!(resp.overlays[0].label, "Moving average");
        assert_eq!(resp.fallbacks, vec!["13X", "Hologram", "Astrology"]);
    }

    #[test]
    fn missing_ticker_uses_default() {
        let store = store_with_msft(5);
        let (regs, params) = (Registries::default(), StudyParams::default());
        let resp = engine(&store, &regs, &params, false).render_request(&ChartRequest::default(), ts(4));
        assert_eq!(resp.ticker, "MSFT");
        assert!(resp.has_data);
        assert_eq!(resp.main.points.len(), 5);
    }

    #[test]
    fn anchored_window_keeps_studies_aligned() {
        let store = store_with_msft(10);
        let (regs, params) = (Registries::default(), StudyParams::default());
        let resp = engine(&store, &regs, &params, true)
            .render_request(&req("24h", "Bar", &["STOC", "Bollinger Band"]), ts(9));
        assert!(resp.anchored);
        assert_eq!(resp.main.points.len(), 11);
        assert_eq!(resp.main.points[0].close, None);
        assert_eq!(resp.main.points[0].timestamp, resp.start);
        let stoc = &resp.subplots[0].series[0];
        assert_eq!(stoc.len(), 11);
        assert_eq!(stoc.points[0].value, None);
        assert_eq!(resp.overlays[0].series.len(), 3);
    }

    #[test]
    fn empty_window_yields_empty_series() {
        let store = store_with_msft(10);
        let (regs, params) = (Registries::default(), StudyParams::default());
        let resp = engine(&store, &regs, &params, false)
            .render_request(&req("24h", "Line", &["ROC", "PP"]), ts(500));
        assert!(resp.has_data);
        assert!(resp.main.points.is_empty());
        assert!(resp.subplots[0].series[0].is_empty());
        assert!(resp.overlays[0].series.iter().all(|s| s.is_empty()));
    }

    #[test]
    fn line_and_area_send_close_only() {
        let store = store_with_msft(10);
        let (regs, params) = (Registries::default(), StudyParams::default());
        let eng = engine(&store, &regs, &params, false);

        let line = eng.render_request(&req("24h", "Area", &[]), ts(9));
        let p = line.main.points[3];
        assert_eq!(p.close, Some(103.0));
        assert_eq!((p.open, p.high, p.low), (None, None, None));

        let candles = eng.render_request(&req("24h", "Candlestick", &[]), ts(9));
        assert!(candles.main.points[3].open.is_some());
        assert!(candles.main.points[3].high.is_some());
    }

    #[test]
    fn duplicate_studies_render_once() {
        let store = store_with_msft(30);
        let (regs, params) = (Registries::default(), StudyParams::default());
        let resp = engine(&store, &regs, &params, false)
            .render_request(&req("24h", "Line", &["MOM", "MOM"]), ts(29));
        assert_eq!(resp.subplots.len(), 1);
    }

    #[test]
    fn serialises_undefined_as_null() {
        let store = store_with_msft(10);
        let (regs, params) = (Registries::default(), StudyParams::default());
        let resp = engine(&store, &regs, &params, false)
            .render_request(&req("24h", "Line", &["MOM"]), ts(9));
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["subplots"][0]["series"][0]["points"][0]["value"].is_null());
        assert_eq!(json["main"]["style"], "line");
    }
}
