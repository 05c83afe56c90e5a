// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free studies over a window of price records. Every
// public function returns series exactly as long as its input, aligned to
// the input timestamps; points that cannot be computed carry `None` instead
// of being dropped or zero-filled. An empty window yields empty series.

pub mod accumulation;
pub mod bollinger;
pub mod cci;
pub mod momentum;
pub mod moving_average;
pub mod pivot;
pub mod roc;
pub mod rolling;
pub mod stochastic;

use crate::types::PriceRecord;

/// Close prices of `records`, in order.
pub(crate) fn closes(records: &[PriceRecord]) -> Vec<f64> {
    records.iter().map(|r| r.close).collect()
}
