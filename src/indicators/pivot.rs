// =============================================================================
// Pivot Points (classic, per bar)
// =============================================================================
//
// From each bar's own high (h), low (l) and close (c):
//
//   PP = (h + l + c) / 3
//   R1 = 2·PP − l          S1 = 2·PP − h
//   R2 = PP + h − l        S2 = PP − h + l
//   R3 = h + 2·(PP − l)    S3 = l − 2·(h − PP)
// =============================================================================

use crate::types::{IndicatorSeries, PriceRecord};

/// Seven aligned pivot series.
#[derive(Debug, Clone)]
pub struct PivotPoints {
    pub pp: IndicatorSeries,
    pub r1: IndicatorSeries,
    pub s1: IndicatorSeries,
    pub r2: IndicatorSeries,
    pub s2: IndicatorSeries,
    pub r3: IndicatorSeries,
    pub s3: IndicatorSeries,
}

impl PivotPoints {
    /// Series in plotting order: PP, R1, S1, R2, S2, R3, S3.
    pub fn into_series(self) -> Vec<IndicatorSeries> {
        vec![self.pp, self.r1, self.s1, self.r2, self.s2, self.r3, self.s3]
    }
}

pub fn calculate_pivot_points(records: &[PriceRecord]) -> PivotPoints {
    let level = |name: &str, f: fn(f64, f64, f64, f64) -> f64| {
        let values = records
            .iter()
            .map(|r| Some(f(r.typical_price(), r.high, r.low, r.close)))
            .collect();
        IndicatorSeries::aligned(name, records, values)
    };

    PivotPoints {
        pp: level("PP", |pp, _, _, _| pp),
        r1: level("R1", |pp, _, l, _| 2.0 * pp - l),
        s1: level("S1", |pp, h, _, _| 2.0 * pp - h),
        r2: level("R2", |pp, h, l, _| pp + h - l),
        s2: level("S2", |pp, h, l, _| pp - h + l),
        r3: level("R3", |pp, h, l, _| h + 2.0 * (pp - l)),
        s3: level("S3", |pp, h, l, _| l - 2.0 * (h - pp)),
    }
}
