use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use serde_json::Value;

use crate::transform::parse_value;

/// Spread of the synthetic noise added to each projected point, in MW.
/// A crude stand-in for model uncertainty, not a fitted parameter.
pub const FORECAST_NOISE_STD_DEV: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quantiles {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastResult {
    pub series: Vec<f64>,
    pub quantiles: Option<Quantiles>,
}

/// Order-statistic cut points at p10/p50/p90, picked at `floor(p * (n - 1))`
/// in the sorted sequence. `None` for an empty input; a single value answers
/// every percentile.
pub fn estimate_quantiles(values: &[f64]) -> Option<Quantiles> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pick = |p: f64| {
        let idx = (p * (sorted.len() - 1) as f64).floor() as usize;
        sorted[idx]
    };

    Some(Quantiles {
        p10: pick(0.10),
        p50: pick(0.50),
        p90: pick(0.90),
    })
}

/// Project `horizon` points from the mean of the trailing `horizon` records,
/// each perturbed by independent Gaussian noise drawn from `rng`.
///
/// Assumes the records are chronologically ordered. An empty collection
/// yields an empty result; no baseline is computed.
pub fn forecast_next_day<R: Rng + ?Sized>(
    records: &[Value],
    value_field: &str,
    horizon: usize,
    rng: &mut R,
) -> ForecastResult {
    if records.is_empty() {
        return ForecastResult {
            series: Vec::new(),
            quantiles: None,
        };
    }

    let tail = &records[records.len().saturating_sub(horizon)..];
    let sum: f64 = tail
        .iter()
        .map(|record| parse_value(record, value_field).as_f64())
        .sum();
    let baseline = if tail.is_empty() {
        0.0
    } else {
        sum / tail.len() as f64
    };

    let noise = Normal::new(0.0, FORECAST_NOISE_STD_DEV).unwrap();
    let series: Vec<f64> = (0..horizon).map(|_| baseline + noise.sample(rng)).collect();
    let quantiles = estimate_quantiles(&series);

    ForecastResult { series, quantiles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;

    fn records(values: &[f64]) -> Vec<Value> {
        values.iter().map(|v| json!({"value": v})).collect()
    }

    #[test]
    fn quantiles_pick_sorted_index_floor() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let q = estimate_quantiles(&values).unwrap();
        assert_eq!(q.p10, 1.0);
        assert_eq!(q.p50, 5.0);
        assert_eq!(q.p90, 9.0);
    }

    #[test]
    fn quantiles_degenerate_for_single_value() {
        let q = estimate_quantiles(&[42.0]).unwrap();
        assert_eq!(q.p10, 42.0);
        assert_eq!(q.p50, 42.0);
        assert_eq!(q.p90, 42.0);
    }

    #[test]
    fn quantiles_empty_input_is_none() {
        assert!(estimate_quantiles(&[]).is_none());
    }

    #[test]
    fn empty_records_yield_empty_forecast() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = forecast_next_day(&[], "value", 24, &mut rng);
        assert!(result.series.is_empty());
        assert!(result.quantiles.is_none());
    }

    #[test]
    fn forecast_has_horizon_length_and_summary_quantiles() {
        let mut rng = StdRng::seed_from_u64(7);
        let result = forecast_next_day(&records(&[400.0, 500.0, 600.0]), "value", 12, &mut rng);

        assert_eq!(result.series.len(), 12);
        let q = result.quantiles.unwrap();
        assert!(q.p10 <= q.p50 && q.p50 <= q.p90);
    }

    #[test]
    fn same_seed_reproduces_the_series() {
        let input = records(&[100.0, 110.0, 120.0, 130.0]);
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);

        let first = forecast_next_day(&input, "value", 8, &mut a);
        let second = forecast_next_day(&input, "value", 8, &mut b);

        assert_eq!(first.series, second.series);
    }

    #[test]
    fn baseline_uses_trailing_horizon_records() {
        // 900 zeros followed by 100 points at 300; with horizon 100 the
        // baseline is the trailing mean (300). Noise is zero-mean with
        // std 50, so the mean of 100 samples should land well within 25.
        let values: Vec<f64> = std::iter::repeat(0.0)
            .take(900)
            .chain(std::iter::repeat(300.0).take(100))
            .collect();
        let input = records(&values);
        let mut rng = StdRng::seed_from_u64(3);

        let result = forecast_next_day(&input, "value", 100, &mut rng);
        let mean = result.series.iter().sum::<f64>() / result.series.len() as f64;

        assert!((mean - 300.0).abs() < 25.0, "series mean {mean} too far from baseline");
    }
}
