// =============================================================================
// Studies
// =============================================================================
//
// `StudyKind` is the closed set of indicator functions; the registry maps
// open-ended labels onto a kind plus optional parameter overrides, so a
// config file can add e.g. "MA 50" without touching any caller.

use serde::{Deserialize, Serialize};

use super::Registry;
use crate::indicators::{
    accumulation::calculate_accumulation,
    bollinger::calculate_bollinger,
    cci::calculate_cci,
    momentum::calculate_momentum,
    moving_average::{e_moving_average, moving_average},
    pivot::calculate_pivot_points,
    roc::calculate_roc,
    stochastic::calculate_stochastic_k,
};
use crate::runtime_config::StudyParams;
use crate::types::{IndicatorSeries, Placement, PriceRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyKind {
    Accumulation,
    Cci,
    Roc,
    Stochastic,
    Momentum,
    PivotPoints,
    Bollinger,
    MovingAverage,
    EMovingAverage,
}

impl StudyKind {
    pub fn placement(self) -> Placement {
        match self {
            Self::PivotPoints | Self::Bollinger | Self::MovingAverage | Self::EMovingAverage => {
                Placement::Overlay
            }
            Self::Accumulation | Self::Cci | Self::Roc | Self::Stochastic | Self::Momentum => {
                Placement::Subplot
            }
        }
    }

    /// Window (or lag) this kind uses when the entry does not override it.
    /// `None` for pointwise studies.
    pub fn default_window(self, params: &StudyParams) -> Option<usize> {
        match self {
            Self::Cci => Some(params.cci_window),
            Self::Roc => Some(params.roc_period),
            Self::Momentum => Some(params.momentum_period),
            Self::Bollinger => Some(params.bollinger_window),
            Self::MovingAverage => Some(params.ma_window),
            Self::EMovingAverage => Some(params.ema_window),
            Self::Accumulation | Self::Stochastic | Self::PivotPoints => None,
        }
    }
}

impl std::fmt::Display for StudyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Accumulation => "accumulation",
            Self::Cci => "cci",
            Self::Roc => "roc",
            Self::Stochastic => "stochastic",
            Self::Momentum => "momentum",
            Self::PivotPoints => "pivot_points",
            Self::Bollinger => "bollinger",
            Self::MovingAverage => "moving_average",
            Self::EMovingAverage => "e_moving_average",
        };
        f.write_str(name)
    }
}

/// A registered study: which function to run and any per-entry overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudySpec {
    pub kind: StudyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_std: Option<f64>,
}

impl StudySpec {
    pub const fn of(kind: StudyKind) -> Self {
        Self {
            kind,
            window: None,
            num_std: None,
        }
    }

    pub fn placement(&self) -> Placement {
        self.kind.placement()
    }

    /// Run the study over `records`. Every returned series has
    /// `records.len()` points.
    pub fn compute(&self, records: &[PriceRecord], params: &StudyParams) -> Vec<IndicatorSeries> {
        let window = self
            .window
            .or_else(|| self.kind.default_window(params))
            .unwrap_or_default();
        match self.kind {
            StudyKind::Accumulation => vec![calculate_accumulation(records)],
            StudyKind::Cci => vec![calculate_cci(records, window)],
            StudyKind::Roc => vec![calculate_roc(records, window)],
            StudyKind::Stochastic => vec![calculate_stochastic_k(records)],
            StudyKind::Momentum => vec![calculate_momentum(records, window)],
            StudyKind::PivotPoints => calculate_pivot_points(records).into_series(),
            StudyKind::Bollinger => {
                let k = self.num_std.unwrap_or(params.bollinger_num_std);
                calculate_bollinger(records, window, k).into_series()
            }
            StudyKind::MovingAverage => vec![moving_average(records, window)],
            StudyKind::EMovingAverage => vec![e_moving_average(records, window)],
        }
    }
}

pub fn default_registry() -> Registry<StudySpec> {
    use StudyKind::*;
    Registry::new("study", "Moving average", StudySpec::of(MovingAverage))
        .with("Exponential moving average", StudySpec::of(EMovingAverage))
        .with("Bollinger Band", StudySpec::of(Bollinger))
        .with("PP", StudySpec::of(PivotPoints))
        .with("Accumulation", StudySpec::of(Accumulation))
        .with("CCI", StudySpec::of(Cci))
        .with("ROC", StudySpec::of(Roc))
        .with("STOC", StudySpec::of(Stochastic))
        .with("MOM", StudySpec::of(Momentum))
}
