// =============================================================================
// Shared types used across the Ticker Board service
// =============================================================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamps are naive exchange-local wall-clock times, exactly as they
/// appear in the source CSV.
pub type Timestamp = NaiveDateTime;

/// A single OHLCV price bar.
///
/// Loaded records always carry finite prices. The only record with
/// non-finite (NaN) prices is the anchor sentinel produced by the window
/// selector; every indicator maps it to an undefined output point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub timestamp: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceRecord {
    /// Record with every price field undefined, used to anchor a chart axis
    /// at the requested window start.
    pub fn sentinel(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            open: f64::NAN,
            high: f64::NAN,
            low: f64::NAN,
            close: f64::NAN,
            volume: f64::NAN,
        }
    }

    #[cfg(test)]
    pub fn is_sentinel(&self) -> bool {
        self.close.is_nan() && self.open.is_nan()
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// One point of a derived series. `value == None` is the explicit
/// "undefined" marker (insufficient history, zero divisor, missing input).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub timestamp: Timestamp,
    pub value: Option<f64>,
}

/// A named derived series aligned point-for-point with the price window it
/// was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub name: String,
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Zip raw values with the timestamps of `records`.
    ///
    /// Non-finite values are normalised to `None` here so that no NaN or
    /// infinity ever leaves the indicator layer.
    pub fn aligned(name: impl Into<String>, records: &[PriceRecord], values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(records.len(), values.len());
        let points = records
            .iter()
            .zip(values)
            .map(|(r, v)| IndicatorPoint {
                timestamp: r.timestamp,
                value: v.filter(|x| x.is_finite()),
            })
            .collect();
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Where a study is drawn relative to the main price chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Same axes as price (moving averages, bands, pivots).
    Overlay,
    /// Separate panel sharing the time axis (oscillators).
    Subplot,
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overlay => write!(f, "overlay"),
            Self::Subplot => write!(f, "subplot"),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::{Duration, NaiveDate};

    pub fn ts(hour_offset: i64) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|t| t + Duration::hours(hour_offset))
            .unwrap()
    }

    /// Hourly bars with open = high = low = close = `close[i]`.
    pub fn flat_bars(closes: &[f64]) -> Vec<PriceRecord> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceRecord {
                timestamp: ts(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1_000.0,
            })
            .collect()
    }

    pub fn bar(i: i64, high: f64, low: f64, close: f64) -> PriceRecord {
        PriceRecord {
            timestamp: ts(i),
            open: close,
            high,
            low,
            close,
            volume: 1_000.0,
        }
    }
}
