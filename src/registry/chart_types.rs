// =============================================================================
// Main chart styles
// =============================================================================

use serde::{Deserialize, Serialize};

use super::Registry;

/// How the main price series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStyle {
    /// Close as a line.
    Line,
    /// Close as a filled area.
    Area,
    /// Red/green candles.
    Candlestick,
    /// OHLC bars coloured by direction.
    Bar,
    /// OHLC bars in a single neutral colour.
    GreyBar,
}

impl ChartStyle {
    /// Line and area charts only need the close.
    pub fn close_only(self) -> bool {
        matches!(self, Self::Line | Self::Area)
    }
}

impl std::fmt::Display for ChartStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Line => write!(f, "line"),
            Self::Area => write!(f, "area"),
            Self::Candlestick => write!(f, "candlestick"),
            Self::Bar => write!(f, "bar"),
            Self::GreyBar => write!(f, "grey_bar"),
        }
    }
}

pub fn default_registry() -> Registry<ChartStyle> {
    Registry::new("chart_type", "Candlestick", ChartStyle::Candlestick)
        .with("Line", ChartStyle::Line)
        .with("Area", ChartStyle::Area)
        .with("Bar", ChartStyle::Bar)
        .with("Grey Bar", ChartStyle::GreyBar)
}
