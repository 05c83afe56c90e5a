// =============================================================================
// Accumulation / Distribution (close location value)
// =============================================================================
//
//   AD = ((close − low) − (high − close)) / (high − low)
//
// Pointwise, in [-1, 1]. No running total and no volume weighting. A bar
// with high == low is undefined.

use super::rolling::checked_div;
use crate::types::{IndicatorSeries, PriceRecord};

pub fn calculate_accumulation(records: &[PriceRecord]) -> IndicatorSeries {
    let values = records
        .iter()
        .map(|r| {
            checked_div(
                Some((r.close - r.low) - (r.high - r.close)),
                Some(r.high - r.low),
            )
        })
        .collect();
    IndicatorSeries::aligned("Accumulation", records, values)
}
