pub mod measurement;

pub use measurement::{DataMetric, FetchParams, MeasurementRecord, NetworkCode};
