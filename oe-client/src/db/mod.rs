pub mod measurement_queries;

pub use measurement_queries::{daily_network_totals, series_range, DailyTotalRow, StoredMeasurement};
