// =============================================================================
// Momentum
// =============================================================================
//
//   MOM = close[i] - close[i - n]      (default n = 5)

use super::{closes, rolling::diff};
use crate::types::{IndicatorSeries, PriceRecord};

pub const DEFAULT_PERIOD: usize = 5;

pub fn calculate_momentum(records: &[PriceRecord], period: usize) -> IndicatorSeries {
    IndicatorSeries::aligned("MOM", records, diff(&closes(records), period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::flat_bars;

    #[test]
    fn momentum_two_bar_lag() {
        let m = calculate_momentum(&flat_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]), 2);
        assert_eq!(m.values(), vec![None, None, Some(2.0), Some(2.0), Some(2.0)]);
    }

    #[test]
    fn momentum_negative() {
        let m = calculate_momentum(&flat_bars(&[5.0, 3.0]), 1);
        assert_eq!(m.values(), vec![None, Some(-2.0)]);
    }
}
