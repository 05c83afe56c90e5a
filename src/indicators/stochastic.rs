// =============================================================================
// Stochastic Oscillator %K (single bar)
// =============================================================================
//
//   %K = (close - low) / (high - low)
//
// Computed from each bar's own high/low. There is no n-period extreme here;
// the dashboard has always plotted this single-bar variant and the values
// must stay comparable with earlier charts. A bar with high == low is
// undefined.

use super::rolling::checked_div;
use crate::types::{IndicatorSeries, PriceRecord};

pub fn calculate_stochastic_k(records: &[PriceRecord]) -> IndicatorSeries {
    let values = records
        .iter()
        .map(|r| checked_div(Some(r.close - r.low), Some(r.high - r.low)))
        .collect();
    IndicatorSeries::aligned("SO%k", records, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::bar;

    #[test]
    fn pointwise_values() {
        let bars = vec![bar(0, 12.0, 8.0, 10.0), bar(1, 20.0, 10.0, 20.0), bar(2, 5.0, 5.0, 5.0)];
        let k = calculate_stochastic_k(&bars);
        assert_eq!(k.values(), vec![Some(0.5), Some(1.0), None]);
    }

    #[test]
    fn no_warmup_period() {
        let k = calculate_stochastic_k(&[bar(0, 2.0, 0.0, 1.5)]);
        assert_eq!(k.values(), vec![Some(0.75)]);
    }
}
