use std::time::Duration;

use oe_client::domain::{FetchParams, MeasurementRecord, NetworkCode};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use time::{macros::format_description, OffsetDateTime, PrimitiveDateTime};

use crate::config::OpenElectricityConfig;
use crate::pipeline::{IngestError, MeasurementSource};
use crate::sources::TimeWindow;

/// HTTP client for the OpenElectricity network-data API.
///
/// One GET per (network, window); the server refuses ranges wider than the
/// documented per-request limit, so callers chunk via `WindowedFetcher`.
pub struct OpenElectricityClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenElectricityClient {
    pub fn new(cfg: &OpenElectricityConfig) -> Result<Self, IngestError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("oe-ingest/0.1"));

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", cfg.api_key))
            .map_err(|e| IngestError::Source(format!("invalid api key: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| IngestError::Source(format!("http client build failed: {e}")))?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn network_data_url(&self, network: NetworkCode) -> String {
        format!("{}/data/network/{network}", self.base_url)
    }
}

#[async_trait::async_trait]
impl MeasurementSource for OpenElectricityClient {
    async fn fetch_window(
        &self,
        network: NetworkCode,
        params: &FetchParams,
        window: TimeWindow,
    ) -> Result<Vec<MeasurementRecord>, IngestError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        for metric in &params.metrics {
            query.push(("metrics", metric.as_str().to_string()));
        }
        query.push(("interval", params.interval.clone()));
        query.push(("date_start", format_api_datetime(window.start)?));
        query.push(("date_end", format_api_datetime(window.end)?));
        query.push(("primary_grouping", params.primary_grouping.clone()));
        query.push(("secondary_grouping", params.secondary_grouping.clone()));

        let resp = self
            .http
            .get(self.network_data_url(network))
            .query(&query)
            .send()
            .await
            .map_err(|e| IngestError::Source(format!("openelectricity GET failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| IngestError::Source(format!("openelectricity body read failed: {e}")))?;
        if !status.is_success() {
            return Err(IngestError::Source(format!(
                "openelectricity API error: HTTP {status}: {body}"
            )));
        }

        let decoded: NetworkDataResponse = serde_json::from_str(&body)
            .map_err(|e| IngestError::Source(format!("openelectricity JSON parse failed: {e}")))?;

        Ok(flatten_response(network, decoded))
    }
}

fn format_api_datetime(ts: OffsetDateTime) -> Result<String, IngestError> {
    let fmt = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    ts.format(fmt)
        .map_err(|e| IngestError::Source(format!("window timestamp format failed: {e}")))
}

#[derive(Debug, Deserialize)]
struct NetworkDataResponse {
    data: Vec<MetricSeries>,
}

#[derive(Debug, Deserialize)]
struct MetricSeries {
    results: Vec<GroupedSeries>,
}

#[derive(Debug, Deserialize)]
struct GroupedSeries {
    columns: SeriesColumns,
    data: Vec<SeriesPoint>,
}

#[derive(Debug, Deserialize)]
struct SeriesColumns {
    network_region: Option<String>,
    fueltech_group: Option<String>,
    facility_code: Option<String>,
}

/// `[timestamp, value]` pair; the value is null where the series has a gap.
#[derive(Debug, Deserialize)]
struct SeriesPoint(String, Option<f64>);

fn flatten_response(network: NetworkCode, response: NetworkDataResponse) -> Vec<MeasurementRecord> {
    let mut records = Vec::new();

    for series in response.data {
        for group in series.results {
            let GroupedSeries { columns, data } = group;
            let region = columns
                .network_region
                .unwrap_or_else(|| "unknown".to_string());
            let fueltech = columns
                .fueltech_group
                .unwrap_or_else(|| "unknown".to_string());

            for SeriesPoint(raw_ts, value) in data {
                // A gap carries no measurement; only real values become rows.
                let Some(value) = value else { continue };
                let Some(ts) = parse_point_timestamp(&raw_ts) else {
                    metrics::counter!("openelectricity_unparseable_points_total").increment(1);
                    tracing::debug!(raw = %raw_ts, "skipping data point with unparseable timestamp");
                    continue;
                };

                records.push(MeasurementRecord {
                    ts,
                    network_code: network,
                    fueltech: fueltech.clone(),
                    region: region.clone(),
                    facility_code: columns.facility_code.clone(),
                    value,
                });
            }
        }
    }

    records
}

/// The API mixes offset-carrying RFC 3339 timestamps with naive ones;
/// naive timestamps are taken as UTC.
fn parse_point_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(ts) = OffsetDateTime::parse(raw, &time::format_description::well_known::Rfc3339) {
        return Some(ts);
    }
    let naive = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(raw, naive)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}
