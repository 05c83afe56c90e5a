// =============================================================================
// Moving Averages (price overlay)
// =============================================================================
//
// Both studies are simple rolling means of the close:
//   MA  = SMA(close, 5)
//   EMA = SMA(close, 20)
//
// The "EMA" study keeps its historical label but is NOT exponentially
// weighted; it is a second, slower simple mean. Charts already published
// with that label depend on the values staying as they are.
// =============================================================================

use super::{closes, rolling::rolling_mean};
use crate::types::{IndicatorSeries, PriceRecord};

pub const DEFAULT_MA_WINDOW: usize = 5;
pub const DEFAULT_EMA_WINDOW: usize = 20;

/// Rolling mean of the close over `window` bars, named `MA`.
pub fn moving_average(records: &[PriceRecord], window: usize) -> IndicatorSeries {
    IndicatorSeries::aligned("MA", records, rolling_mean(&closes(records), window))
}

/// Rolling mean of the close over `window` bars, named `EMA`.
pub fn e_moving_average(records: &[PriceRecord], window: usize) -> IndicatorSeries {
    IndicatorSeries::aligned("EMA", records, rolling_mean(&closes(records), window))
}
