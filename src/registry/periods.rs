// =============================================================================
// Look-back periods
// =============================================================================
//
// A period label is a value plus a unit code:
//
//   H -> hours   d -> days (24 h)   M -> months (30 d)   J -> years (365 d)
//
// so "7d" is 168 hours and "1J" is 8760 hours.

use serde::{Deserialize, Serialize};

use super::Registry;

const HOURS_PER_DAY: u64 = 24;
const HOURS_PER_MONTH: u64 = HOURS_PER_DAY * 30;
const HOURS_PER_YEAR: u64 = HOURS_PER_DAY * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookBackUnit {
    Hours,
    Days,
    Months,
    Years,
}

impl LookBackUnit {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'H' | 'h' => Some(Self::Hours),
            'd' | 'D' => Some(Self::Days),
            'M' => Some(Self::Months),
            'J' | 'Y' | 'y' => Some(Self::Years),
            _ => None,
        }
    }

    pub fn hours(self) -> u64 {
        match self {
            Self::Hours => 1,
            Self::Days => HOURS_PER_DAY,
            Self::Months => HOURS_PER_MONTH,
            Self::Years => HOURS_PER_YEAR,
        }
    }
}

/// A look-back span such as "3 months".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookBack {
    pub value: u32,
    pub unit: LookBackUnit,
}

impl LookBack {
    pub const fn new(value: u32, unit: LookBackUnit) -> Self {
        Self { value, unit }
    }

    pub fn hours(&self) -> u64 {
        u64::from(self.value).saturating_mul(self.unit.hours())
    }

    /// Parse a compact label like `"24h"`, `"7d"`, `"3M"`, `"5J"`.
    ///
    /// Case matters for the unit: `M` is months; there is no minute unit.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        let code = label.chars().last()?;
        let unit = LookBackUnit::from_code(code)?;
        let value = label[..label.len() - code.len_utf8()].parse().ok()?;
        Some(Self { value, unit })
    }
}

pub fn default_registry() -> Registry<LookBack> {
    use LookBackUnit::*;
    Registry::new("period", "24h", LookBack::new(24, Hours))
        .with("7d", LookBack::new(7, Days))
        .with("1M", LookBack::new(1, Months))
        .with("3M", LookBack::new(3, Months))
        .with("6M", LookBack::new(6, Months))
        .with("1J", LookBack::new(1, Years))
        .with("5J", LookBack::new(5, Years))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_hours() {
        let reg = default_registry();
        let hours: Vec<(&str, u64)> = reg
            .entries()
            .iter()
            .map(|e| (e.label.as_str(), e.value.hours()))
            .collect();
        assert_eq!(
            hours,
            vec![
                ("24h", 24),
                ("7d", 168),
                ("1M", 720),
                ("3M", 2160),
                ("6M", 4320),
                ("1J", 8760),
                ("5J", 43800)
            ]
        );
    }

    #[test]
    fn parse_labels() {
        assert_eq!(LookBack::parse("8h"), Some(LookBack::new(8, LookBackUnit::Hours)));
        assert_eq!(LookBack::parse("2M").map(|l| l.hours()), Some(1440));
        assert_eq!(LookBack::parse("1J").map(|l| l.hours()), Some(8760));
        assert_eq!(LookBack::parse("5x"), None);
        assert_eq!(LookBack::parse("h"), None);
        assert_eq!(LookBack::parse(""), None);
    }

    #[test]
    fn default_is_24h() {
        assert_eq!(default_registry().default_entry().value.hours(), 24);
    }
}
