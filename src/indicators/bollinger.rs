// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Three aligned series around a rolling mean of the close:
//   BB_upper = SMA(close, n) + k * σ(close, n)
//   BB_mean  = SMA(close, n)
//   BB_lower = SMA(close, n) - k * σ(close, n)
//
// σ is the sample standard deviation. Defaults: n = 10, k = 5. The wide
// multiplier is the long-standing dashboard default, not a typo for 2.

use super::{closes, rolling::{rolling_mean, rolling_std}};
use crate::types::{IndicatorSeries, PriceRecord};

pub const DEFAULT_WINDOW: usize = 10;
pub const DEFAULT_NUM_STD: f64 = 5.0;

/// Result of a Bollinger Band calculation.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub upper: IndicatorSeries,
    pub mean: IndicatorSeries,
    pub lower: IndicatorSeries,
}

impl BollingerBands {
    pub fn into_series(self) -> Vec<IndicatorSeries> {
        vec![self.upper, self.mean, self.lower]
    }
}

/// Calculate Bollinger Bands over the closes of `records`.
///
/// Every output series has `records.len()` points; the first `window - 1`
/// are undefined.
pub fn calculate_bollinger(records: &[PriceRecord], window: usize, num_std: f64) -> BollingerBands {
    let closes = closes(records);
    let mean = rolling_mean(&closes, window);
    let std = rolling_std(&closes, window);

    let band = |sign: f64| -> Vec<Option<f64>> {
        mean.iter()
            .zip(&std)
            .map(|(m, s)| Some((*m)? + sign * num_std * (*s)?))
            .collect()
    };

    BollingerBands {
        upper: IndicatorSeries::aligned("BB_upper", records, band(1.0)),
        lower: IndicatorSeries::aligned("BB_lower", records, band(-1.0)),
        mean: IndicatorSeries::aligned("BB_mean", records, mean),
    }
}
