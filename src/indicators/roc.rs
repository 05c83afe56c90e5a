// =============================================================================
// Rate of Change (ROC) - Momentum Indicator
// =============================================================================
//
// ROC is the fractional change in close over a look-back of n bars:
//   ROC = diff(close, n) / shift(close, n)
//
// The result is a ratio (0.05 == +5 %), not a percentage. A zero close at
// i - n yields an undefined point.

use super::{
    closes,
    rolling::{checked_div, diff, shift},
};
use crate::types::{IndicatorSeries, PriceRecord};

pub const DEFAULT_PERIOD: usize = 5;

/// Calculate the Rate of Change for the closes of `records`.
pub fn calculate_roc(records: &[PriceRecord], period: usize) -> IndicatorSeries {
    let closes = closes(records);
    let values = diff(&closes, period)
        .into_iter()
        .zip(shift(&closes, period))
        .map(|(n, d)| checked_div(n, d))
        .collect();
    IndicatorSeries::aligned("ROC", records, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::flat_bars;

    #[test]
    fn roc_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let roc = calculate_roc(&flat_bars(&closes), 14);
        assert_eq!(roc.len(), 20);
        assert!(roc.values()[..14].iter().all(Option::is_none));
        // From 1 to 15: ROC = (15 - 1) / 1 = 14
        assert!((roc.values()[14].unwrap() - 14.0).abs() < 1e-10);
    }

    #[test]
    fn roc_zero_base_is_undefined() {
        let roc = calculate_roc(&flat_bars(&[0.0, 1.0, 2.0]), 1);
        assert_eq!(roc.values(), vec![None, None, Some(1.0)]);
    }

    #[test]
    fn roc_insufficient_data() {
        let roc = calculate_roc(&flat_bars(&[1.0, 2.0, 3.0]), 5);
        assert_eq!(roc.values(), vec![None, None, None]);
    }
}
