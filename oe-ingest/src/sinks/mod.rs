pub mod postgres;

pub use postgres::PostgresMeasurementSink;
