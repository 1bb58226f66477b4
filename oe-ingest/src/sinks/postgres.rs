use oe_client::domain::MeasurementRecord;
use sqlx::{postgres::PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;

use crate::pipeline::{IngestError, MeasurementSink};

/// Upserting writer for `network_measurements_mw`.
///
/// The store enforces uniqueness on `(timestamp, series_key)`; re-ingesting
/// a key overwrites the value, so a failed run can simply be re-run.
pub struct PostgresMeasurementSink {
    pool: PgPool,
    batch_size: usize,
}

impl PostgresMeasurementSink {
    pub fn new(pool: PgPool, batch_size: usize) -> Self {
        Self {
            pool,
            batch_size: batch_size.max(1),
        }
    }
}

/// One multi-row upsert statement for `chunk`, each row stamped with its
/// insertion instant as it is bound.
fn build_upsert(chunk: &[MeasurementRecord]) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new(
        "INSERT INTO network_measurements_mw \
         (timestamp, network_code, fueltech, region, facility_code, value_mw, inserted_at) ",
    );

    builder.push_values(chunk, |mut b, record| {
        b.push_bind(record.ts)
            .push_bind(record.network_code.to_string())
            .push_bind(&record.fueltech)
            .push_bind(&record.region)
            .push_bind(&record.facility_code)
            .push_bind(record.value)
            .push_bind(OffsetDateTime::now_utc());
    });

    builder.push(" ON CONFLICT (timestamp, series_key) DO UPDATE SET value_mw = EXCLUDED.value_mw");
    builder
}

#[async_trait::async_trait]
impl MeasurementSink for PostgresMeasurementSink {
    async fn write_batch(&self, records: &[MeasurementRecord]) -> Result<(), IngestError> {
        if records.is_empty() {
            return Ok(());
        }

        // Chunks keep each statement under the bind-parameter limit; the
        // surrounding transaction keeps the batch all-or-nothing.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| IngestError::Sink(format!("begin transaction failed: {e}")))?;

        for chunk in records.chunks(self.batch_size) {
            let mut builder = build_upsert(chunk);
            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| IngestError::Sink(format!("upsert batch failed: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| IngestError::Sink(format!("commit failed: {e}")))?;

        metrics::counter!("measurements_upserted_total").increment(records.len() as u64);
        tracing::info!(rows = records.len(), "measurement batch upserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oe_client::domain::NetworkCode;
    use sqlx::Execute;
    use time::macros::datetime;

    fn record(facility_code: Option<&str>) -> MeasurementRecord {
        MeasurementRecord {
            ts: datetime!(2026-01-01 00:00 UTC),
            network_code: NetworkCode::Nem,
            fueltech: "coal".to_string(),
            region: "NSW1".to_string(),
            facility_code: facility_code.map(str::to_string),
            value: 5120.5,
        }
    }

    #[test]
    fn upsert_statement_targets_the_series_key() {
        let rows = vec![record(Some("BW1"))];
        let mut builder = build_upsert(&rows);
        let sql = builder.build().sql().to_string();

        assert!(sql.starts_with("INSERT INTO network_measurements_mw"));
        assert!(sql.contains("ON CONFLICT (timestamp, series_key) DO UPDATE SET value_mw = EXCLUDED.value_mw"));
    }

    #[test]
    fn each_row_binds_seven_parameters() {
        let rows = vec![record(Some("BW1")), record(None)];
        let mut builder = build_upsert(&rows);
        let sql = builder.build().sql().to_string();

        assert_eq!(sql.matches('$').count(), 14);
        assert!(sql.contains("$14"));
    }
}
