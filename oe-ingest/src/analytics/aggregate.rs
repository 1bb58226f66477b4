use std::collections::BTreeMap;

use serde_json::Value;
use time::Date;

use crate::transform::{parse_day, parse_value, DayParse};

/// Sum the `value_field` of each record into its calendar day.
///
/// Records with an absent/empty timestamp are skipped, malformed timestamps
/// are skipped too, and non-numeric values contribute 0.0; each case bumps
/// its own counter so data quality stays observable.
pub fn compute_daily_totals(
    records: &[Value],
    ts_field: &str,
    value_field: &str,
) -> BTreeMap<Date, f64> {
    let mut totals = BTreeMap::new();

    for record in records {
        let day = match parse_day(record, ts_field) {
            DayParse::Day(day) => day,
            DayParse::Missing => {
                metrics::counter!("aggregate_missing_timestamps_total").increment(1);
                continue;
            }
            DayParse::Malformed => {
                metrics::counter!("aggregate_malformed_timestamps_total").increment(1);
                tracing::debug!(field = ts_field, "skipping record with malformed timestamp");
                continue;
            }
        };

        let value = parse_value(record, value_field);
        if value.is_defaulted() {
            metrics::counter!("aggregate_defaulted_values_total").increment(1);
        }

        *totals.entry(day).or_insert(0.0) += value.as_f64();
    }

    totals
}

/// Trailing mean over a window of `window` points; the window shrinks at the
/// start of the series, so the output always has the input's length.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let slice = &values[start..=i];
        let mean = if slice.is_empty() {
            0.0
        } else {
            slice.iter().sum::<f64>() / slice.len() as f64
        };
        out.push(mean);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn daily_totals_tolerate_mixed_encodings_and_skip_empty_timestamps() {
        let records = vec![
            json!({"ts": "2026-01-01T00:00:00", "mw": "510"}),
            json!({"ts": "2026-01-01 00:05:00", "mw": "530"}),
            json!({"ts": "", "mw": "1"}),
        ];

        let totals = compute_daily_totals(&records, "ts", "mw");

        assert_eq!(totals.len(), 1);
        assert_eq!(totals[&date!(2026 - 01 - 01)], 1040.0);
    }

    #[test]
    fn non_numeric_values_contribute_zero() {
        let records = vec![
            json!({"ts": "2026-01-01T00:00:00", "mw": "510"}),
            json!({"ts": "2026-01-01T01:00:00", "mw": "n/a"}),
        ];

        let totals = compute_daily_totals(&records, "ts", "mw");

        assert_eq!(totals[&date!(2026 - 01 - 01)], 510.0);
    }

    #[test]
    fn daily_totals_split_across_days() {
        let records = vec![
            json!({"ts": "2026-01-01T23:55:00", "mw": 10.0}),
            json!({"ts": "2026-01-02T00:00:00", "mw": 20.0}),
            json!({"ts": "2026-01-02T00:05:00", "mw": 30.0}),
        ];

        let totals = compute_daily_totals(&records, "ts", "mw");

        assert_eq!(totals[&date!(2026 - 01 - 01)], 10.0);
        assert_eq!(totals[&date!(2026 - 01 - 02)], 50.0);
    }

    #[test]
    fn moving_average_empty_input() {
        assert!(moving_average(&[], 3).is_empty());
    }

    #[test]
    fn moving_average_single_point() {
        assert_eq!(moving_average(&[4.5], 1), vec![4.5]);
    }

    #[test]
    fn moving_average_window_shrinks_at_start() {
        assert_eq!(moving_average(&[1.0, 2.0, 3.0, 4.0], 2), vec![1.0, 1.5, 2.5, 3.5]);
    }

    #[test]
    fn moving_average_window_larger_than_input() {
        assert_eq!(moving_average(&[1.0, 2.0], 5), vec![1.0, 1.5]);
    }
}
