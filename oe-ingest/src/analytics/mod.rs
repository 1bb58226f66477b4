pub mod aggregate;
pub mod forecast;

pub use aggregate::{compute_daily_totals, moving_average};
pub use forecast::{
    estimate_quantiles, forecast_next_day, ForecastResult, Quantiles, FORECAST_NOISE_STD_DEV,
};
