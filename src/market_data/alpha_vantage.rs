// =============================================================================
// Alpha Vantage REST Client
// =============================================================================
//
// Fetches intraday or daily OHLCV history and turns the "Time Series (...)"
// object of the response into price records. The free tier throttles hard
// and reports throttling as a 200 response with a `Note` or `Information`
// field, so those payloads are surfaced as errors rather than parsed.
// =============================================================================

use std::time::Duration;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use super::loader::parse_timestamp;
use crate::types::PriceRecord;

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";

#[derive(Debug, Error)]
pub enum AlphaVantageError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("missing Alpha Vantage API key")]
    MissingApiKey,
    #[error("alpha vantage api error: {0}")]
    ApiError(String),
    #[error("parse error: {0}")]
    ParseError(String),
}

/// Which time series endpoint to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesRequest {
    /// `TIME_SERIES_INTRADAY` with an interval such as `1min` or `60min`.
    Intraday { interval: String },
    /// `TIME_SERIES_DAILY`.
    Daily,
}

impl SeriesRequest {
    /// `"daily"` selects the daily endpoint; anything else is passed through
    /// as an intraday interval.
    pub fn from_interval(interval: &str) -> Self {
        match interval.trim().to_lowercase().as_str() {
            "daily" | "1d" => Self::Daily,
            other => Self::Intraday {
                interval: other.to_string(),
            },
        }
    }

    fn function(&self) -> &'static str {
        match self {
            Self::Intraday { .. } => "TIME_SERIES_INTRADAY",
            Self::Daily => "TIME_SERIES_DAILY",
        }
    }
}

#[derive(Clone)]
pub struct AlphaVantageClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl AlphaVantageClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, AlphaVantageError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AlphaVantageError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
        })
    }

    /// Download the full available history for `symbol`, oldest first.
    #[instrument(skip(self), name = "alpha_vantage::fetch_series")]
    pub async fn fetch_series(
        &self,
        symbol: &str,
        request: &SeriesRequest,
        output_size: &str,
    ) -> Result<Vec<PriceRecord>, AlphaVantageError> {
        let mut query: Vec<(&str, &str)> = vec![
            ("function", request.function()),
            ("symbol", symbol),
            ("outputsize", output_size),
            ("datatype", "json"),
            ("apikey", self.api_key.as_str()),
        ];
        if let SeriesRequest::Intraday { interval } = request {
            query.push(("interval", interval.as_str()));
        }

        let url = format!("{}/query", self.base_url.trim_end_matches('/'));
        let json: Value = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let records = parse_time_series(&json)?;
        debug!(symbol, rows = records.len(), "alpha vantage series parsed");
        Ok(records)
    }
}

/// Extract price records from an Alpha Vantage time series response.
pub fn parse_time_series(json: &Value) -> Result<Vec<PriceRecord>, AlphaVantageError> {
    for key in ["Note", "Error Message", "Information"] {
        if let Some(msg) = json.get(key).and_then(Value::as_str) {
            return Err(AlphaVantageError::ApiError(msg.to_string()));
        }
    }

    let series = json
        .as_object()
        .and_then(|obj| obj.iter().find(|(k, _)| k.starts_with("Time Series")))
        .and_then(|(_, v)| v.as_object())
        .ok_or_else(|| AlphaVantageError::ParseError("missing time series in response".to_string()))?;

    let mut records = series
        .iter()
        .map(|(ts, bar)| parse_bar(ts, bar))
        .collect::<Result<Vec<_>, _>>()?;
    records.sort_by_key(|r| r.timestamp);
    records.dedup_by_key(|r| r.timestamp);
    Ok(records)
}

fn parse_bar(ts: &str, bar: &Value) -> Result<PriceRecord, AlphaVantageError> {
    let obj = bar
        .as_object()
        .ok_or_else(|| AlphaVantageError::ParseError(format!("bar value not object for ts {ts}")))?;
    let timestamp: NaiveDateTime =
        parse_timestamp(ts).ok_or_else(|| AlphaVantageError::ParseError(format!("invalid timestamp {ts}")))?;
    Ok(PriceRecord {
        timestamp,
        open: field(obj, "open")?,
        high: field(obj, "high")?,
        low: field(obj, "low")?,
        close: field(obj, "close")?,
        volume: field(obj, "volume")?,
    })
}

/// Read a numeric field whose key carries a position prefix ("1. open").
fn field(obj: &Map<String, Value>, name: &str) -> Result<f64, AlphaVantageError> {
    obj.iter()
        .find(|(k, _)| k.rsplit(". ").next() == Some(name))
        .and_then(|(_, v)| match v {
            Value::String(s) => s.parse::<f64>().ok(),
            other => other.as_f64(),
        })
        .filter(|v| v.is_finite())
        .ok_or_else(|| AlphaVantageError::ParseError(format!("missing numeric field {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_intraday_payload_oldest_first() {
        let payload = json!({
            "Meta Data": { "2. Symbol": "MSFT" },
            "Time Series (1min)": {
                "2024-01-02 10:01:00": {
                    "1. open": "10.5", "2. high": "11.0", "3. low": "10.0",
                    "4. close": "10.8", "5. volume": "1500"
                },
                "2024-01-02 10:00:00": {
                    "1. open": "10.0", "2. high": "10.6", "3. low": "9.9",
                    "4. close": "10.5", "5. volume": "1000"
                }
            }
        });
        let records = parse_time_series(&payload).unwrap();
        assert_eq!(records.len(), 2);
        assert!((records[0].close - 10.5).abs() < 1e-10);
        assert!((records[1].high - 11.0).abs() < 1e-10);
        assert!(records[0].timestamp < records[1].timestamp);
    }

    #[test]
    fn throttle_note_is_an_error() {
        let payload = json!({ "Note": "Thank you for using Alpha Vantage!" });
        assert!(matches!(parse_time_series(&payload), Err(AlphaVantageError::ApiError(_))));
    }

    #[test]
    fn missing_series_is_parse_error() {
        let payload = json!({ "Meta Data": {} });
        assert!(matches!(parse_time_series(&payload), Err(AlphaVantageError::ParseError(_))));
    }

    #[test]
    fn missing_field_is_parse_error() {
        let payload = json!({
            "Time Series (Daily)": {
                "2024-01-02": { "1. open": "1", "2. high": "2", "3. low": "0.5", "4. close": "1.5" }
            }
        });
        let err = parse_time_series(&payload).unwrap_err();
        assert!(err.to_string().contains("volume"));
    }

    #[test]
    fn interval_selection() {
        assert_eq!(SeriesRequest::from_interval("daily"), SeriesRequest::Daily);
        assert_eq!(
            SeriesRequest::from_interval("5min"),
            SeriesRequest::Intraday { interval: "5min".to_string() }
        );
    }

    #[test]
    fn empty_key_rejected() {
        assert!(matches!(AlphaVantageClient::new("  "), Err(AlphaVantageError::MissingApiKey)));
    }
}
