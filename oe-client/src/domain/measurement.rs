use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Electricity market an observation belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum NetworkCode {
    Nem,
    Wem,
}

impl std::fmt::Display for NetworkCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Nem => "NEM",
            Self::Wem => "WEM",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for NetworkCode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NEM" => Ok(Self::Nem),
            "WEM" => Ok(Self::Wem),
            _ => Err("unknown network code; expected NEM or WEM"),
        }
    }
}

/// Metric requestable from the upstream data source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataMetric {
    Power,
    Energy,
    Emissions,
    MarketValue,
}

impl DataMetric {
    /// Query-string spelling understood by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Energy => "energy",
            Self::Emissions => "emissions",
            Self::MarketValue => "market_value",
        }
    }
}

/// Request parameters shared by every window of a fetch run.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchParams {
    pub metrics: Vec<DataMetric>,
    pub interval: String,
    pub primary_grouping: String,
    pub secondary_grouping: String,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            metrics: vec![DataMetric::Power],
            interval: "5m".to_string(),
            primary_grouping: "network_region".to_string(),
            secondary_grouping: "fueltech_group".to_string(),
        }
    }
}

/// One network observation as returned by the data source.
///
/// `facility_code` is only present when the source groups down to facility
/// level; series identity is (network, fueltech, region, facility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub ts: OffsetDateTime,
    pub network_code: NetworkCode,
    pub fueltech: String,
    pub region: String,
    pub facility_code: Option<String>,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn network_code_round_trips_wire_spelling() {
        assert_eq!(NetworkCode::from_str("NEM").unwrap(), NetworkCode::Nem);
        assert_eq!(NetworkCode::from_str("wem").unwrap(), NetworkCode::Wem);
        assert_eq!(NetworkCode::Nem.to_string(), "NEM");
        assert!(NetworkCode::from_str("ERCOT").is_err());
    }

    #[test]
    fn fetch_params_default_matches_ingestion_defaults() {
        let params = FetchParams::default();
        assert_eq!(params.metrics, vec![DataMetric::Power]);
        assert_eq!(params.interval, "5m");
        assert_eq!(params.primary_grouping, "network_region");
        assert_eq!(params.secondary_grouping, "fueltech_group");
    }

    #[test]
    fn metric_query_spelling() {
        assert_eq!(DataMetric::Power.as_str(), "power");
        assert_eq!(DataMetric::MarketValue.as_str(), "market_value");
    }
}
