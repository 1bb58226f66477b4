use anyhow::Result;
use oe_client::domain::{FetchParams, NetworkCode};
use oe_ingest::{
    config::AppConfig,
    observability,
    pipeline::Pipeline,
    sinks::PostgresMeasurementSink,
    sources::{OpenElectricityClient, WindowedFetcher},
};
use sqlx::postgres::PgPoolOptions;

const INGEST_DAYS: i64 = 7;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    if let Some(metrics_cfg) = &cfg.metrics {
        observability::init_metrics(&metrics_cfg.bind_addr);
    }

    let networks = cfg
        .openelectricity
        .networks
        .iter()
        .map(|code| {
            code.parse::<NetworkCode>()
                .map_err(|e| anyhow::anyhow!("{e}: {code}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let client = OpenElectricityClient::new(&cfg.openelectricity)?;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.url())
        .await?;

    let pipeline = Pipeline {
        fetcher: WindowedFetcher::new(client),
        sink: PostgresMeasurementSink::new(pool.clone(), cfg.sink.batch_size),
    };

    let summary = pipeline
        .run_latest_days(INGEST_DAYS, &networks, &FetchParams::default())
        .await?;

    tracing::info!(
        fetched = summary.fetched,
        written = summary.written,
        days = INGEST_DAYS,
        "ingestion run complete"
    );

    pool.close().await;
    Ok(())
}
