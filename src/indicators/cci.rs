// =============================================================================
// Commodity Channel Index (CCI)
// =============================================================================
//
//   TP  = (high + low + close) / 3
//   CCI = (TP - SMA(TP, n)) / (0.015 * σ(TP, n))
//
// σ is the rolling sample standard deviation (not the mean absolute
// deviation of the textbook CCI). A flat window has σ = 0 and produces an
// undefined point rather than an infinity.
//
// Default n = 20.
// =============================================================================

use super::rolling::{checked_div, rolling_mean, rolling_std};
use crate::types::{IndicatorSeries, PriceRecord};

pub const DEFAULT_WINDOW: usize = 20;

/// Lambert's scaling constant.
const CCI_CONSTANT: f64 = 0.015;

pub fn calculate_cci(records: &[PriceRecord], window: usize) -> IndicatorSeries {
    let tp: Vec<f64> = records.iter().map(PriceRecord::typical_price).collect();
    let mean = rolling_mean(&tp, window);
    let std = rolling_std(&tp, window);

    let values = tp
        .iter()
        .zip(mean.iter().zip(&std))
        .map(|(&t, (&m, &s))| checked_div(m.map(|m| t - m), s.map(|s| CCI_CONSTANT * s)))
        .collect();

    IndicatorSeries::aligned("CCI", records, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::{bar, flat_bars};

    #[test]
    fn flat_prices_are_undefined_not_infinite() {
        let bars = flat_bars(&[10.0; 5]);
        let cci = calculate_cci(&bars, 3);
        assert_eq!(cci.len(), 5);
        assert!(cci.values().iter().all(Option::is_none));

        // Prices without an exact binary form.
        for price in [0.1, 10.1, 123.45, 33.3] {
            let cci = calculate_cci(&flat_bars(&[price; 25]), DEFAULT_WINDOW);
            assert_eq!(cci.len(), 25);
            assert!(cci.values().iter().all(Option::is_none), "price {price}");
        }
    }

    #[test]
    fn known_value() {
        // TP = close for flat bars: window [1, 2, 3] -> mean 2, sample std 1
        // CCI = (3 - 2) / (0.015 * 1)
        let cci = calculate_cci(&flat_bars(&[1.0, 2.0, 3.0]), 3);
        let v = cci.values()[2].unwrap();
        assert!((v - 1.0 / 0.015).abs() < 1e-9);
    }

    #[test]
    fn uses_typical_price() {
        let bars = vec![bar(0, 12.0, 8.0, 10.0), bar(1, 15.0, 9.0, 12.0), bar(2, 11.0, 5.0, 8.0)];
        let cci = calculate_cci(&bars, 2);
        // TP = 10, 12, 8
        let m = 10.0;
        let s = (8.0_f64).sqrt();
        let expected = (8.0 - m) / (0.015 * s);
        assert!((cci.values()[2].unwrap() - expected).abs() < 1e-9);
        assert_eq!(cci.values()[0], None);
    }

    #[test]
    fn default_window_pads_nineteen_points() {
        let closes: Vec<f64> = (1..=25).map(|x| x as f64).collect();
        let cci = calculate_cci(&flat_bars(&closes), DEFAULT_WINDOW);
        assert!(cci.values()[..19].iter().all(Option::is_none));
        assert!(cci.values()[19..].iter().all(Option::is_some));
    }
}
