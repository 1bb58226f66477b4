use async_trait::async_trait;
use oe_client::domain::{FetchParams, MeasurementRecord, NetworkCode};

use crate::sources::{TimeWindow, WindowedFetcher};

#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("source error: {0}")]
    Source(String),
    #[error("sink error: {0}")]
    Sink(String),
}

/// External data-source capability: answers one bounded window for one
/// network. Ranges longer than the per-request limit are the caller's
/// problem to chunk.
#[async_trait]
pub trait MeasurementSource: Send + Sync {
    async fn fetch_window(
        &self,
        network: NetworkCode,
        params: &FetchParams,
        window: TimeWindow,
    ) -> Result<Vec<MeasurementRecord>, IngestError>;
}

/// Persistence capability: writes a record collection all-or-nothing with
/// last-write-wins semantics on the upsert key.
#[async_trait]
pub trait MeasurementSink: Send + Sync {
    async fn write_batch(&self, records: &[MeasurementRecord]) -> Result<(), IngestError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub fetched: usize,
    pub written: usize,
}

pub struct Pipeline<S, K> {
    pub fetcher: WindowedFetcher<S>,
    pub sink: K,
}

impl<S, K> Pipeline<S, K>
where
    S: MeasurementSource,
    K: MeasurementSink,
{
    /// Fetch the last `days` days for every network and persist the combined
    /// result. An empty fetch is not an error; there is just nothing to write.
    pub async fn run_latest_days(
        &self,
        days: i64,
        networks: &[NetworkCode],
        params: &FetchParams,
    ) -> Result<IngestSummary, IngestError> {
        let records = self.fetcher.fetch_latest_days(days, networks, params).await?;
        if records.is_empty() {
            tracing::warn!(days, "fetch returned no records; nothing to persist");
            return Ok(IngestSummary {
                fetched: 0,
                written: 0,
            });
        }

        self.sink.write_batch(&records).await?;
        Ok(IngestSummary {
            fetched: records.len(),
            written: records.len(),
        })
    }
}
