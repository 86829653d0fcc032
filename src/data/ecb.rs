//! ECB Data Portal integration for the key interest rate series.
//!
//! Responses use the SDMX-JSON envelope (`format=jsondata`):
//!
//! ```text
//! { "dataSets": [ { "series": { "0:0:0:0:0:0:0": { "observations": { "0": [2.15], ... } } } } ],
//!   "structure": { "dimensions": { "observation": [ { "id": "TIME_PERIOD", "values": [ { "id": "2025-06-11" }, ... ] } ] } } }
//! ```
//!
//! Observation keys are indices into the time dimension; some mirrors key
//! observations by period directly, so both forms are accepted.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::data::ObservationSource;
use crate::domain::SeriesKind;
use crate::error::{AppError, RateError};

const DEFAULT_BASE_URL: &str = "https://data-api.ecb.europa.eu/service/data";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Dataflow holding the key ECB interest rates.
const FLOW: &str = "FM";

const SERIES_REFI: &str = "B.U2.EUR.4F.KR.MRR_FR.LEV";
const SERIES_DEPOSIT: &str = "B.U2.EUR.4F.KR.DFR.LEV";
const SERIES_LENDING: &str = "B.U2.EUR.4F.KR.MLFR.LEV";

/// Series key within the `FM` dataflow.
pub fn series_key(kind: SeriesKind) -> &'static str {
    match kind {
        SeriesKind::MainRefinancing => SERIES_REFI,
        SeriesKind::DepositFacility => SERIES_DEPOSIT,
        SeriesKind::MarginalLending => SERIES_LENDING,
    }
}

/// Connection settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct EcbConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// `ECB_OFFLINE=1` skips remote refreshes entirely.
    pub offline: bool,
}

impl Default for EcbConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            offline: false,
        }
    }
}

impl EcbConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(url) = lookup("ECB_API_BASE_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.is_empty() {
                return Err(AppError::new(2, "ECB_API_BASE_URL is set but empty."));
            }
            config.base_url = url.to_string();
        }

        if let Some(raw) = lookup("ECB_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| AppError::new(2, format!("Invalid ECB_TIMEOUT_SECS '{raw}' (expected seconds > 0).")))?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("ECB_OFFLINE") {
            config.offline = matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }
}

/// A dated observation as published; `None` marks a missing value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawObservation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

pub struct EcbClient {
    client: Client,
    base_url: String,
}

impl EcbClient {
    pub fn new(config: &EcbConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    pub fn fetch_series(
        &self,
        kind: SeriesKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawObservation>, RateError> {
        let url = format!("{}/{}/{}", self.base_url, FLOW, series_key(kind));
        debug!(series = %kind, %url, "fetching ECB series");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("startPeriod", start.to_string()),
                ("endPeriod", end.to_string()),
                ("format", "jsondata".to_string()),
            ])
            .send()
            .map_err(|e| RateError::RemoteFetchFailed(format!("ECB request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(RateError::RemoteFetchFailed(format!(
                "ECB request failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .map_err(|e| RateError::RemoteFetchFailed(format!("Failed to read ECB response: {e}")))?;

        let obs = parse_envelope(&body)?;
        debug!(series = %kind, n = obs.len(), "parsed ECB observations");
        Ok(obs)
    }
}

impl ObservationSource for EcbClient {
    fn fetch_observations(
        &self,
        kind: SeriesKind,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<RawObservation>, RateError> {
        let range = RateError::InvalidRange {
            start: start_year,
            end: end_year,
        };
        let start = NaiveDate::from_ymd_opt(start_year, 1, 1).ok_or(range.clone())?;
        let end = NaiveDate::from_ymd_opt(end_year, 12, 31).ok_or(range)?;
        self.fetch_series(kind, start, end)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "dataSets")]
    data_sets: Option<Vec<DataSet>>,
    structure: Option<Structure>,
}

#[derive(Debug, Deserialize)]
struct DataSet {
    series: Option<BTreeMap<String, SeriesEntry>>,
}

#[derive(Debug, Deserialize)]
struct SeriesEntry {
    observations: Option<BTreeMap<String, Vec<serde_json::Value>>>,
}

#[derive(Debug, Deserialize)]
struct Structure {
    dimensions: Dimensions,
}

#[derive(Debug, Deserialize)]
struct Dimensions {
    #[serde(default)]
    observation: Vec<Dimension>,
}

#[derive(Debug, Deserialize)]
struct Dimension {
    #[serde(default)]
    id: String,
    #[serde(default)]
    values: Vec<DimensionValue>,
}

#[derive(Debug, Deserialize)]
struct DimensionValue {
    id: String,
}

/// Parse an SDMX-JSON body into date-ordered observations.
///
/// Any deviation from the expected shape is a `MalformedEnvelope`, including
/// a series with no numeric observation at all.
pub fn parse_envelope(body: &str) -> Result<Vec<RawObservation>, RateError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| RateError::MalformedEnvelope(format!("invalid JSON: {e}")))?;

    let data_set = envelope
        .data_sets
        .as_ref()
        .and_then(|sets| sets.first())
        .ok_or_else(|| RateError::MalformedEnvelope("missing dataSets".to_string()))?;

    let (series_id, series) = data_set
        .series
        .as_ref()
        .and_then(|s| s.iter().next())
        .ok_or_else(|| RateError::MalformedEnvelope("missing series".to_string()))?;

    let observations = series
        .observations
        .as_ref()
        .ok_or_else(|| RateError::MalformedEnvelope(format!("series {series_id} has no observations")))?;

    let time_values: &[DimensionValue] = envelope
        .structure
        .as_ref()
        .and_then(|s| {
            s.dimensions
                .observation
                .iter()
                .find(|d| d.id == "TIME_PERIOD")
                .or_else(|| s.dimensions.observation.first())
        })
        .map(|d| d.values.as_slice())
        .unwrap_or(&[]);

    let mut out = Vec::with_capacity(observations.len());
    for (key, raw) in observations {
        let date = resolve_period(key, time_values)
            .ok_or_else(|| RateError::MalformedEnvelope(format!("unresolvable observation key '{key}'")))?;
        let value = match raw.first() {
            Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Number(n)) => {
                let v = n
                    .as_f64()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| RateError::MalformedEnvelope(format!("non-finite value at {date}")))?;
                Some(v)
            }
            Some(other) => {
                return Err(RateError::MalformedEnvelope(format!(
                    "non-numeric value {other} at {date}"
                )));
            }
            None => {
                return Err(RateError::MalformedEnvelope(format!("empty observation at {date}")));
            }
        };
        out.push(RawObservation { date, value });
    }

    if !out.iter().any(|o| o.value.is_some()) {
        return Err(RateError::MalformedEnvelope(format!(
            "series {series_id} has no numeric observations"
        )));
    }

    out.sort_by_key(|o| o.date);
    Ok(out)
}

fn resolve_period(key: &str, time_values: &[DimensionValue]) -> Option<NaiveDate> {
    if let Some(date) = parse_period(key) {
        return Some(date);
    }
    let idx = key.parse::<usize>().ok()?;
    parse_period(&time_values.get(idx)?.id)
}

/// Parse `YYYY-MM-DD` or `YYYY-MM` (first of month).
fn parse_period(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    let (y, m) = trimmed.split_once('-')?;
    if y.len() != 4 || m.len() != 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_index_keyed_observations() {
        let body = r#"{
            "dataSets": [{ "series": { "0:0:0:0:0:0:0": { "observations": {
                "0": [2.40, 0, null],
                "1": [2.15, 0, null]
            } } } }],
            "structure": { "dimensions": { "observation": [
                { "id": "TIME_PERIOD", "values": [ { "id": "2025-04-23" }, { "id": "2025-06-11" } ] }
            ] } }
        }"#;
        let obs = parse_envelope(body).unwrap();
        assert_eq!(
            obs,
            vec![
                RawObservation { date: date(2025, 4, 23), value: Some(2.40) },
                RawObservation { date: date(2025, 6, 11), value: Some(2.15) },
            ]
        );
    }

    #[test]
    fn parses_date_keyed_observations_in_order() {
        let body = r#"{ "dataSets": [{ "series": { "0:0:0:0:0:0:0:0": { "observations": {
            "2024-02": [4.5],
            "2024-01-01": [4.5],
            "2024-03": [null]
        } } } }] }"#;
        let obs = parse_envelope(body).unwrap();
        assert_eq!(obs.len(), 3);
        assert_eq!(obs[0].date, date(2024, 1, 1));
        assert_eq!(obs[1].date, date(2024, 2, 1));
        assert_eq!(obs[2].value, None);
    }

    #[test]
    fn missing_container_is_malformed() {
        for body in [
            "{}",
            r#"{ "dataSets": [] }"#,
            r#"{ "dataSets": [{ "series": {} }] }"#,
            r#"{ "dataSets": [{ "series": { "0": {} } }] }"#,
            "not json",
        ] {
            assert!(
                matches!(parse_envelope(body), Err(RateError::MalformedEnvelope(_))),
                "{body}"
            );
        }
    }

    #[test]
    fn non_numeric_value_is_malformed() {
        let body = r#"{ "dataSets": [{ "series": { "0": { "observations": { "2024-01-01": ["4.5"] } } } }] }"#;
        assert!(matches!(parse_envelope(body), Err(RateError::MalformedEnvelope(_))));
    }

    #[test]
    fn unresolvable_index_is_malformed() {
        let body = r#"{ "dataSets": [{ "series": { "0": { "observations": { "7": [4.5] } } } }],
            "structure": { "dimensions": { "observation": [ { "id": "TIME_PERIOD", "values": [] } ] } } }"#;
        assert!(matches!(parse_envelope(body), Err(RateError::MalformedEnvelope(_))));
    }

    #[test]
    fn all_absent_series_is_malformed() {
        let body = r#"{ "dataSets": [{ "series": { "0": { "observations": { "2024-01-01": [null] } } } }] }"#;
        assert!(matches!(parse_envelope(body), Err(RateError::MalformedEnvelope(_))));
    }

    #[test]
    fn period_parsing() {
        assert_eq!(parse_period("2025-06-11"), Some(date(2025, 6, 11)));
        assert_eq!(parse_period("2025-06"), Some(date(2025, 6, 1)));
        assert_eq!(parse_period("2025-13"), None);
        assert_eq!(parse_period("2025"), None);
        assert_eq!(parse_period("25-06"), None);
    }

    #[test]
    fn config_defaults_and_overrides() {
        let config = EcbConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(!config.offline);

        let config = EcbConfig::from_lookup(|name| match name {
            "ECB_API_BASE_URL" => Some("http://localhost:8080/data/".to_string()),
            "ECB_TIMEOUT_SECS" => Some("3".to_string()),
            "ECB_OFFLINE" => Some("TRUE".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/data");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.offline);
    }

    #[test]
    fn invalid_timeout_is_a_usage_error() {
        let err = EcbConfig::from_lookup(|name| (name == "ECB_TIMEOUT_SECS").then(|| "0".to_string()))
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn series_keys_are_distinct() {
        assert_ne!(series_key(SeriesKind::MainRefinancing), series_key(SeriesKind::DepositFacility));
        assert!(series_key(SeriesKind::MarginalLending).ends_with(".LEV"));
    }
}
