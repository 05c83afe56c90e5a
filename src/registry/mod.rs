// =============================================================================
// Selection Registries
// =============================================================================
//
// Label -> entry tables behind the period, chart-type and study selectors.
// Lookups are exact-match; an unknown (or absent) label resolves to the
// registry's default entry, which is always the first one registered. New
// labels are added by registering entries, never by editing callers.
//
// - periods:     label -> look-back (hours)
// - chart_types: label -> main-series style
// - studies:     label -> indicator kind + optional parameter overrides

pub mod chart_types;
pub mod periods;
pub mod studies;

use serde::Serialize;
use tracing::warn;

use crate::runtime_config::DashboardConfig;

pub use chart_types::ChartStyle;
pub use periods::LookBack;
pub use studies::{StudyKind, StudySpec};

/// One labelled entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub label: String,
    pub value: T,
}

/// Outcome of a lookup: the entry used and whether it was a fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'a, T> {
    pub entry: &'a Entry<T>,
    pub fell_back: bool,
}

/// Ordered label table with a stable default (the first entry).
#[derive(Debug, Clone, PartialEq)]
pub struct Registry<T> {
    category: &'static str,
    entries: Vec<Entry<T>>,
}

impl<T> Registry<T> {
    /// Create a registry whose default entry is `(default_label, default_value)`.
    pub fn new(category: &'static str, default_label: impl Into<String>, default_value: T) -> Self {
        Self {
            category,
            entries: vec![Entry {
                label: default_label.into(),
                value: default_value,
            }],
        }
    }

    /// Builder form of [`Registry::register`].
    pub fn with(mut self, label: impl Into<String>, value: T) -> Self {
        self.register(label, value);
        self
    }

    /// Add an entry, replacing the value of an existing entry with the same
    /// label (its position, and therefore the default, is kept).
    pub fn register(&mut self, label: impl Into<String>, value: T) {
        let label = label.into();
        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(existing) => existing.value = value,
            None => self.entries.push(Entry { label, value }),
        }
    }

    /// Exact-match lookup.
    pub fn get(&self, label: &str) -> Option<&Entry<T>> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn default_entry(&self) -> &Entry<T> {
        &self.entries[0]
    }

    /// Exact-match lookup falling back to the default entry.
    ///
    /// A missing label is a silent default; an unknown label is logged.
    pub fn resolve(&self, label: Option<&str>) -> Resolved<'_, T> {
        match label.map(str::trim).filter(|l| !l.is_empty()) {
            None => Resolved {
                entry: self.default_entry(),
                fell_back: false,
            },
            Some(l) => match self.get(l) {
                Some(entry) => Resolved {
                    entry,
                    fell_back: false,
                },
                None => {
                    let entry = self.default_entry();
                    warn!(
                        category = self.category,
                        label = l,
                        default = %entry.label,
                        "unknown selection label, using default"
                    );
                    Resolved {
                        entry,
                        fell_back: true,
                    }
                }
            },
        }
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    #[cfg(test)]
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// =============================================================================
// Registries bundle + selector options
// =============================================================================

/// All three selection tables.
#[derive(Debug, Clone)]
pub struct Registries {
    pub periods: Registry<LookBack>,
    pub chart_types: Registry<ChartStyle>,
    pub studies: Registry<StudySpec>,
}

impl Default for Registries {
    fn default() -> Self {
        Self {
            periods: periods::default_registry(),
            chart_types: chart_types::default_registry(),
            studies: studies::default_registry(),
        }
    }
}

impl Registries {
    /// Built-in tables plus the config's custom studies.
    pub fn from_config(config: &DashboardConfig) -> Self {
        let mut registries = Self::default();
        for label in &config.custom_periods {
            match LookBack::parse(label) {
                Some(lb) => registries.periods.register(label.trim(), lb),
                None => warn!(label = %label, "ignoring unparseable custom period"),
            }
        }
        for custom in &config.custom_studies {
            registries.studies.register(custom.label.clone(), custom.spec());
        }
        registries
    }

    pub fn options(&self) -> SelectionOptions {
        SelectionOptions {
            periods: self
                .periods
                .entries()
                .iter()
                .map(|e| SelectionOption {
                    label: e.label.clone(),
                    value: e.value.hours().to_string(),
                    placement: None,
                })
                .collect(),
            chart_types: self
                .chart_types
                .entries()
                .iter()
                .map(|e| SelectionOption {
                    label: e.label.clone(),
                    value: e.value.to_string(),
                    placement: None,
                })
                .collect(),
            studies: self
                .studies
                .entries()
                .iter()
                .map(|e| SelectionOption {
                    label: e.label.clone(),
                    value: e.value.kind.to_string(),
                    placement: Some(e.value.kind.placement().to_string()),
                })
                .collect(),
            default_period: self.periods.default_entry().label.clone(),
            default_chart_type: self.chart_types.default_entry().label.clone(),
            default_study: self.studies.default_entry().label.clone(),
        }
    }
}

/// Option entry as a selection control consumes it.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionOption {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
}

/// Everything a UI needs to populate its dropdowns.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionOptions {
    pub periods: Vec<SelectionOption>,
    pub chart_types: Vec<SelectionOption>,
    pub studies: Vec<SelectionOption>,
    pub default_period: String,
    pub default_chart_type: String,
    pub default_study: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime_config::CustomStudy;

    fn sample() -> Registry<u32> {
        Registry::new("test", "a", 1).with("b", 2).with("c", 3)
    }

    #[test]
    fn exact_match_lookup() {
        let r = sample();
        assert_eq!(r.get("b").map(|e| e.value), Some(2));
        assert!(r.get("B").is_none());
    }

    #[test]
    fn unknown_label_falls_back_to_default() {
        let r = sample();
        let res = r.resolve(Some("zzz"));
        assert!(res.fell_back);
        assert_eq!(res.entry.label, "a");
    }

    #[test]
    fn missing_label_is_default_without_fallback_flag() {
        let r = sample();
        let res = r.resolve(None);
        assert!(!res.fell_back);
        assert_eq!(res.entry.value, 1);
        assert!(!r.resolve(Some("  ")).fell_back);
    }

    #[test]
    fn register_replaces_in_place() {
        let mut r = sample();
        r.register("a", 10);
        r.register("d", 4);
        assert_eq!(r.labels(), vec!["a", "b", "c", "d"]);
        assert_eq!(r.default_entry().value, 10);
    }

    #[test]
    fn config_custom_studies_are_registered() {
        let mut cfg = DashboardConfig::default();
        cfg.custom_studies.push(CustomStudy {
            label: "MA 50".to_string(),
            kind: StudyKind::MovingAverage,
            window: Some(50),
            num_std: None,
        });
        let regs = Registries::from_config(&cfg);
        let entry = regs.studies.get("MA 50").unwrap();
        assert_eq!(entry.value.window, Some(50));
        assert_eq!(regs.studies.default_entry().label, "Moving average");
    }

    #[test]
    fn config_custom_periods_are_parsed() {
        let mut cfg = DashboardConfig::default();
        cfg.custom_periods = vec!["8h".to_string(), "nonsense".to_string()];
        let regs = Registries::from_config(&cfg);
        assert_eq!(regs.periods.get("8h").map(|e| e.value.hours()), Some(8));
        assert!(regs.periods.get("nonsense").is_none());
        assert_eq!(regs.periods.len(), 8);
    }

    #[test]
    fn options_list_every_label() {
        let opts = Registries::default().options();
        assert_eq!(opts.periods.len(), 7);
        assert_eq!(opts.periods[0].label, "24h");
        assert_eq!(opts.periods[0].value, "24");
        assert_eq!(opts.default_chart_type, "Candlestick");
        assert!(opts
            .studies
            .iter()
            .any(|s| s.label == "CCI" && s.placement.as_deref() == Some("subplot")));
    }
}
