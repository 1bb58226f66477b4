use serde_json::Value;
use time::{macros::format_description, Date, PrimitiveDateTime};

/// Outcome of reading a numeric field from a loosely-structured record.
///
/// `Defaulted` stands for "absent or not interpretable as a number"; the
/// substituted value is always 0.0 so one bad field cannot sink a batch,
/// but callers can still count how often it happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueParse {
    Number(f64),
    Defaulted,
}

impl ValueParse {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Number(v) => v,
            Self::Defaulted => 0.0,
        }
    }

    pub fn is_defaulted(self) -> bool {
        matches!(self, Self::Defaulted)
    }
}

/// Outcome of reducing a record's timestamp field to a calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DayParse {
    Day(Date),
    Missing,
    Malformed,
}

pub fn parse_value(record: &Value, field: &str) -> ValueParse {
    match record.get(field) {
        Some(Value::Number(n)) => n
            .as_f64()
            .map(ValueParse::Number)
            .unwrap_or(ValueParse::Defaulted),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(ValueParse::Number)
            .unwrap_or(ValueParse::Defaulted),
        _ => ValueParse::Defaulted,
    }
}

/// Accepts the two timestamp encodings seen in practice, `T`-separated and
/// space-separated; anything else non-empty is `Malformed`.
pub fn parse_day(record: &Value, field: &str) -> DayParse {
    let raw = match record.get(field) {
        None => return DayParse::Missing,
        Some(Value::String(s)) => s.trim(),
        Some(_) => return DayParse::Malformed,
    };
    if raw.is_empty() {
        return DayParse::Missing;
    }

    let t_separated = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    let space_separated = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

    PrimitiveDateTime::parse(raw, t_separated)
        .or_else(|_| PrimitiveDateTime::parse(raw, space_separated))
        .map(|dt| DayParse::Day(dt.date()))
        .unwrap_or(DayParse::Malformed)
}
