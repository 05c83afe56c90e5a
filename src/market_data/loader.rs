// =============================================================================
// CSV Price Loader
// =============================================================================
//
// Reads tabular OHLCV history into a `PriceSeries`. Header names differ
// between exports ("1. open" from the Alpha Vantage dump, "Open" from
// spreadsheets, "open" from our own writer), so every header is normalised
// to the canonical schema before any row is read:
//
//   date | open | high | low | close | volume
//
// This is the only place malformed data is rejected. Anything that gets past
// the loader is a finite, time-ordered, duplicate-free series.
// =============================================================================

use std::io::{Read, Write};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;
use tracing::{debug, info};

use super::price_store::PriceSeries;
use crate::types::{PriceRecord, Timestamp};

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const DATE_FORMAT: &str = "%Y-%m-%d";
const WRITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("line {line}: unparseable timestamp '{value}'")]
    InvalidTimestamp { line: usize, value: String },
    #[error("line {line}: column '{column}' has non-numeric value '{value}'")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        value: String,
    },
    #[error("line {line}: duplicate timestamp {timestamp}")]
    DuplicateTimestamp { line: usize, timestamp: Timestamp },
}

/// Canonical column positions resolved from a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let names: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |canonical: &'static str| -> Result<usize, LoadError> {
            names
                .iter()
                .position(|n| n == canonical)
                .ok_or(LoadError::MissingColumn(canonical))
        };
        Ok(Self {
            timestamp: find("date")?,
            open: find("open")?,
            high: find("high")?,
            low: find("low")?,
            close: find("close")?,
            volume: find("volume")?,
        })
    }
}

/// Map a raw header to its canonical name.
///
/// `"1. open"` -> `"open"`, `" Close "` -> `"close"`, `"timestamp"` -> `"date"`.
/// An unnamed first column (a dataframe index written without a label) is
/// also treated as the date column.
fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let stripped = match lowered.split_once(". ") {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) => {
            rest.trim().to_string()
        }
        _ => lowered,
    };
    match stripped.as_str() {
        "" | "date" | "timestamp" | "datetime" | "time" | "unnamed: 0" => "date".to_string(),
        "vol" => "volume".to_string(),
        _ => stripped,
    }
}

pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    let value = value.trim();
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_number(record: &csv::StringRecord, idx: usize, column: &'static str, line: usize) -> Result<f64, LoadError> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LoadError::InvalidNumber {
            line,
            column,
            value: raw.to_string(),
        })
}

/// Parse CSV from any reader into a sorted, validated series.
pub fn load_from_reader<R: Read>(reader: R) -> Result<PriceSeries, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(rdr.headers()?)?;
    debug!(?columns, "csv columns resolved");

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        // Line 1 is the header.
        let line = i + 2;
        let raw_ts = row.get(columns.timestamp).unwrap_or("");
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| LoadError::InvalidTimestamp {
            line,
            value: raw_ts.to_string(),
        })?;
        records.push((
            line,
            PriceRecord {
                timestamp,
                open: parse_number(&row, columns.open, "open", line)?,
                high: parse_number(&row, columns.high, "high", line)?,
                low: parse_number(&row, columns.low, "low", line)?,
                close: parse_number(&row, columns.close, "close", line)?,
                volume: parse_number(&row, columns.volume, "volume", line)?,
            },
        ));
    }

    // Exports are frequently newest-first.
    records.sort_by_key(|(_, r)| r.timestamp);
    if let Some(w) = records.windows(2).find(|w| w[0].1.timestamp == w[1].1.timestamp) {
        return Err(LoadError::DuplicateTimestamp {
            line: w[0].0.max(w[1].0),
            timestamp: w[0].1.timestamp,
        });
    }

    Ok(PriceSeries::from_sorted(
        records.into_iter().map(|(_, r)| r).collect(),
    ))
}

/// Load a CSV file from disk.
pub fn load_csv(path: impl AsRef<Path>) -> Result<PriceSeries, LoadError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let series = load_from_reader(file)?;
    info!(
        path = %path.display(),
        rows = series.len(),
        first = ?series.first_timestamp(),
        last = ?series.last_timestamp(),
        "price history loaded"
    );
    Ok(series)
}

/// Write records in the canonical schema.
pub fn write_to_writer<W: Write>(writer: W, records: &[PriceRecord]) -> Result<(), LoadError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "open", "high", "low", "close", "volume"])?;
    for r in records {
        wtr.write_record([
            r.timestamp.format(WRITE_FORMAT).to_string(),
            r.open.to_string(),
            r.high.to_string(),
            r.low.to_string(),
            r.close.to_string(),
            r.volume.to_string(),
        ])?;
    }
    wtr.flush().map_err(|e| LoadError::Csv(e.into()))?;
    Ok(())
}

/// Write records to `path` atomically (tmp file + rename).
pub fn write_csv(path: impl AsRef<Path>, records: &[PriceRecord]) -> Result<(), LoadError> {
    let path = path.as_ref();
    let tmp_path = path.with_extension("csv.tmp");
    let file = std::fs::File::create(&tmp_path).map_err(|source| LoadError::Io {
        path: tmp_path.display().to_string(),
        source,
    })?;
    write_to_writer(file, records)?;
    std::fs::rename(&tmp_path, path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    info!(path = %path.display(), rows = records.len(), "price history written");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
