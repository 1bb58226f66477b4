use anyhow::Result;
use sqlx::PgPool;
use time::OffsetDateTime;

/// A persisted measurement row, including the insertion stamp the writer adds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredMeasurement {
    pub ts: OffsetDateTime,
    pub network_code: String,
    pub fueltech: String,
    pub region: String,
    pub facility_code: Option<String>,
    pub value_mw: f64,
    pub inserted_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyTotalRow {
    pub day: OffsetDateTime,
    pub total_mw: f64,
}

/// Fetch a time-ordered slice of stored measurements for one network.
pub async fn series_range(
    pool: &PgPool,
    network: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<Vec<StoredMeasurement>> {
    let rows = sqlx::query_as::<_, StoredMeasurement>(
        r#"
        SELECT
            timestamp AS ts,
            network_code,
            fueltech,
            region,
            facility_code,
            value_mw,
            inserted_at
        FROM network_measurements_mw
        WHERE network_code = $1
          AND timestamp >= $2
          AND timestamp <  $3
        ORDER BY timestamp
        "#,
    )
    .bind(network)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Sum measured values per calendar day for one network, SQL-side.
///
/// The in-memory aggregator covers loose record collections; this is the
/// equivalent over the persisted table.
pub async fn daily_network_totals(
    pool: &PgPool,
    network: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Result<Vec<DailyTotalRow>> {
    let rows = sqlx::query_as::<_, DailyTotalRow>(
        r#"
        SELECT
            date_trunc('day', timestamp) AS day,
            SUM(value_mw) AS total_mw
        FROM network_measurements_mw
        WHERE network_code = $1
          AND timestamp >= $2
          AND timestamp <  $3
        GROUP BY date_trunc('day', timestamp)
        ORDER BY day
        "#,
    )
    .bind(network)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
