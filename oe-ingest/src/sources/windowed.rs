use oe_client::domain::{FetchParams, MeasurementRecord, NetworkCode};
use time::{Duration, OffsetDateTime, Time};

use crate::pipeline::{IngestError, MeasurementSource};

/// Longest date range the upstream API answers in a single call.
pub const MAX_API_WINDOW_DAYS: i64 = 7;

/// Half-open slice `[start, end)` of a requested interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

/// Split `[start, end)` into consecutive windows of at most `max_days` days.
/// Each window's end is the next window's start, and the union is exactly
/// the input interval. An empty or inverted interval yields no windows.
pub fn partition_windows(
    start: OffsetDateTime,
    end: OffsetDateTime,
    max_days: i64,
) -> Vec<TimeWindow> {
    let max = Duration::days(max_days);
    let mut windows = Vec::new();
    let mut cursor = start;

    while cursor < end {
        let window_end = std::cmp::min(cursor + max, end);
        windows.push(TimeWindow {
            start: cursor,
            end: window_end,
        });
        cursor = window_end;
    }

    windows
}

/// Drives the data-source capability over an interval wider than one request
/// is allowed to cover, one network at a time, one window at a time.
pub struct WindowedFetcher<S> {
    source: S,
    max_window_days: i64,
}

impl<S: MeasurementSource> WindowedFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_window_days: MAX_API_WINDOW_DAYS,
        }
    }

    /// Override the per-request window bound. Mostly useful in tests.
    pub fn with_max_window_days(source: S, max_days: i64) -> Self {
        Self {
            source,
            max_window_days: max_days,
        }
    }

    /// Fetch `[start, end)` for every network, strictly sequentially, and
    /// concatenate the results. Empty windows contribute nothing; results
    /// accumulate across all networks, so the combined collection is empty
    /// only when no window anywhere returned data. Callers should expect
    /// `ceil(days / max_window_days) * networks.len()` upstream calls.
    pub async fn fetch_range(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
        networks: &[NetworkCode],
        params: &FetchParams,
    ) -> Result<Vec<MeasurementRecord>, IngestError> {
        let windows = partition_windows(start, end, self.max_window_days);
        let mut combined = Vec::new();

        for &network in networks {
            for window in &windows {
                metrics::counter!("openelectricity_fetch_requests_total").increment(1);
                let rows = self.source.fetch_window(network, params, *window).await?;

                tracing::debug!(
                    network = %network,
                    window_start = %window.start,
                    window_end = %window.end,
                    rows = rows.len(),
                    "fetched window"
                );

                if rows.is_empty() {
                    metrics::counter!("openelectricity_fetch_empty_windows_total").increment(1);
                    continue;
                }
                combined.extend(rows);
            }
        }

        Ok(combined)
    }

    /// Fetch the last `days` days, anchored at the start of the current UTC
    /// day.
    pub async fn fetch_latest_days(
        &self,
        days: i64,
        networks: &[NetworkCode],
        params: &FetchParams,
    ) -> Result<Vec<MeasurementRecord>, IngestError> {
        let end = start_of_current_day_utc();
        let start = end - Duration::days(days);
        self.fetch_range(start, end, networks, params).await
    }

    /// Fetch the last 365 days, anchored the same way.
    pub async fn fetch_latest_year(
        &self,
        networks: &[NetworkCode],
        params: &FetchParams,
    ) -> Result<Vec<MeasurementRecord>, IngestError> {
        self.fetch_latest_days(365, networks, params).await
    }
}

fn start_of_current_day_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc().replace_time(Time::MIDNIGHT)
}
