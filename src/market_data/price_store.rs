use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::types::{PriceRecord, Timestamp};

// ---------------------------------------------------------------------------
// PriceSeries -- immutable, time-ordered history for one ticker
// ---------------------------------------------------------------------------

/// Full price history for a single ticker, sorted by timestamp ascending with
/// unique timestamps. Built once by the loader and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    /// Build a series from records that are already sorted and unique.
    ///
    /// The loader is responsible for establishing that ordering; callers
    /// constructing a series by hand must uphold it too.
    pub fn from_sorted(records: Vec<PriceRecord>) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        Self { records }
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.records.first().map(|r| r.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.records.last().map(|r| r.timestamp)
    }

    /// Contiguous slice of records with `start <= timestamp <= end`.
    ///
    /// Returns an empty slice when the range is inverted or holds no data.
    pub fn range(&self, start: Timestamp, end: Timestamp) -> &[PriceRecord] {
        if start > end {
            return &[];
        }
        let lo = self.records.partition_point(|r| r.timestamp < start);
        let hi = self.records.partition_point(|r| r.timestamp <= end);
        &self.records[lo..hi]
    }
}

// ---------------------------------------------------------------------------
// PriceStore -- ticker -> history
// ---------------------------------------------------------------------------

/// Summary of one stored ticker, for the health endpoint and startup logs.
#[derive(Debug, Clone, Serialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub records: usize,
    pub first: Option<Timestamp>,
    pub last: Option<Timestamp>,
}

/// Read-only collection of loaded histories keyed by upper-cased ticker.
///
/// Populated during startup before the API begins serving; afterwards it is
/// only ever read, so it is shared behind a plain `Arc` without a lock.
#[derive(Debug, Default)]
pub struct PriceStore {
    series: HashMap<String, Arc<PriceSeries>>,
}

impl PriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the history for `ticker`.
    pub fn insert(&mut self, ticker: &str, series: PriceSeries) {
        self.series.insert(normalize_ticker(ticker), Arc::new(series));
    }

    /// Look up a ticker case-insensitively.
    pub fn get(&self, ticker: &str) -> Option<Arc<PriceSeries>> {
        self.series.get(&normalize_ticker(ticker)).cloned()
    }

    /// Sorted list of loaded tickers.
    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.series.keys().cloned().collect();
        tickers.sort();
        tickers
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn summaries(&self) -> Vec<TickerSummary> {
        self.tickers()
            .into_iter()
            .filter_map(|t| {
                let s = self.series.get(&t)?;
                Some(TickerSummary {
                    records: s.len(),
                    first: s.first_timestamp(),
                    last: s.last_timestamp(),
                    ticker: t,
                })
            })
            .collect()
    }
}

pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
