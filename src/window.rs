// =============================================================================
// Window Selector
// =============================================================================
//
// Turns "the last N hours up to now" into a contiguous read-only view of a
// ticker's history:
//
//   start = now - period_hours
//   view  = { r | start <= r.timestamp <= now }
//
// An empty view is a valid result. Optionally, when the history begins after
// `start`, a sentinel record with undefined prices is placed at exactly
// `start` so that a chart's time axis still opens at the requested start.
// =============================================================================

use std::borrow::Cow;

use chrono::Duration;

use crate::market_data::PriceSeries;
use crate::types::{PriceRecord, Timestamp};

/// Records of `series` within `[now - period_hours, now]`.
pub fn select_window(series: &PriceSeries, now: Timestamp, period_hours: u64) -> &[PriceRecord] {
    series.range(window_start(now, period_hours), now)
}

/// `now - period_hours`, saturating at the earliest representable time.
pub fn window_start(now: Timestamp, period_hours: u64) -> Timestamp {
    i64::try_from(period_hours)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(Timestamp::MIN)
}

/// A windowed view plus the bounds that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceWindow<'a> {
    pub start: Timestamp,
    pub end: Timestamp,
    /// True when the first record is the synthetic anchor at `start`.
    pub anchored: bool,
    pub records: Cow<'a, [PriceRecord]>,
}

impl<'a> PriceWindow<'a> {
    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Window selection with the optional start anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSelector {
    pub anchor_start: bool,
}

impl WindowSelector {
    pub fn new(anchor_start: bool) -> Self {
        Self { anchor_start }
    }

    pub fn select<'a>(&self, series: &'a PriceSeries, now: Timestamp, period_hours: u64) -> PriceWindow<'a> {
        let start = window_start(now, period_hours);
        let view = select_window(series, now, period_hours);

        // "No record exists at or before start": the history begins later.
        let history_starts_late = series.first_timestamp().is_some_and(|first| first > start);

        if self.anchor_start && history_starts_late && start <= now {
            let mut padded = Vec::with_capacity(view.len() + 1);
            padded.push(PriceRecord::sentinel(start));
            padded.extend_from_slice(view);
            return PriceWindow {
                start,
                end: now,
                anchored: true,
                records: Cow::Owned(padded),
            };
        }

        PriceWindow {
            start,
            end: now,
            anchored: false,
            records: Cow::Borrowed(view),
        }
    }
}
