use anyhow::{bail, Result};
use oe_ingest::{
    analytics::{compute_daily_totals, forecast_next_day, moving_average},
    config::AppConfig,
    observability,
};
use rand::{rngs::StdRng, SeedableRng};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::env;
use time::{macros::format_description, Duration, OffsetDateTime, Time};

const TREND_WINDOW_DAYS: usize = 7;
const FORECAST_HORIZON: usize = 24;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: daily_report <network_code> [days_back]");
    }
    let network = &args[1];
    let days_back: i64 = if args.len() > 2 { args[2].parse()? } else { 30 };

    let cfg = AppConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(cfg.database.max_connections)
        .connect(&cfg.database.url())
        .await?;

    let end = OffsetDateTime::now_utc().replace_time(Time::MIDNIGHT);
    let start = end - Duration::days(days_back);

    let stored = oe_client::db::series_range(&pool, network, start, end).await?;
    if stored.is_empty() {
        tracing::warn!(network = %network, days_back, "no stored measurements in range");
        pool.close().await;
        return Ok(());
    }

    let ts_format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let records: Vec<serde_json::Value> = stored
        .iter()
        .map(|m| {
            json!({
                "ts": m.ts.format(ts_format).unwrap_or_default(),
                "value_mw": m.value_mw,
            })
        })
        .collect();

    let totals = compute_daily_totals(&records, "ts", "value_mw");
    let daily: Vec<f64> = totals.values().copied().collect();
    let trend = moving_average(&daily, TREND_WINDOW_DAYS);

    let mut rng = StdRng::from_entropy();
    let forecast = forecast_next_day(&records, "value_mw", FORECAST_HORIZON, &mut rng);

    for (day, total) in &totals {
        tracing::info!(day = %day, total_mw = *total, "daily total");
    }
    if let Some(last) = trend.last() {
        tracing::info!(
            window_days = TREND_WINDOW_DAYS,
            trailing_mean_mw = *last,
            "trend"
        );
    }
    if let Some(q) = &forecast.quantiles {
        tracing::info!(
            p10 = q.p10,
            p50 = q.p50,
            p90 = q.p90,
            horizon = forecast.series.len(),
            "next-day projection"
        );
    }

    pool.close().await;
    Ok(())
}
