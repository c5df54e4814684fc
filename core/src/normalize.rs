//! Value-shape normalization for well-known fields.
//!
//! Two independent rules keyed by field name, both applied recursively:
//!
//! - date fields: outgoing `YYYY-MM-DD` becomes `YYYY-MM-DDT00:00:00Z`;
//!   incoming `YYYY-MM-DDT00:00:00[.000]Z` is truncated to `YYYY-MM-DD`.
//!   Timestamps carrying a time of day are kept whole.
//! - monetary fields: an outgoing string that is purely numeric becomes a
//!   JSON number.
//!
//! Anything that does not match the exact recognized shape is left as is.
//! The allow-lists name each field in both conventions so the rules work
//! before and after key translation.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Number, Value};

pub const DATE_FIELDS: &[&str] = &["startDate", "endDate", "start_date", "end_date"];

pub const MONETARY_FIELDS: &[&str] = &["deposit", "rent", "amount", "price", "cost"];

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("numeric pattern"));

static MIDNIGHT_UTC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})T00:00:00(\.0+)?Z$").expect("midnight pattern"));

pub fn is_date_field(key: &str) -> bool {
    DATE_FIELDS.contains(&key)
}

pub fn is_monetary_field(key: &str) -> bool {
    MONETARY_FIELDS.contains(&key)
}

/// Expand a plain calendar date to a midnight-UTC timestamp.
///
/// Returns `None` unless `s` is exactly `YYYY-MM-DD` and names a real day.
pub fn expand_date(s: &str) -> Option<String> {
    if !is_plain_date(s) {
        return None;
    }
    Some(format!("{s}T00:00:00Z"))
}

/// Truncate a midnight-UTC timestamp to its calendar-date portion.
///
/// Returns `None` unless `s` is `YYYY-MM-DDT00:00:00Z` (optionally with
/// all-zero fractional seconds) on a real day.
pub fn truncate_timestamp(s: &str) -> Option<String> {
    let date = MIDNIGHT_UTC.captures(s)?.get(1)?.as_str();
    is_plain_date(date).then(|| date.to_string())
}

fn is_plain_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes.iter().enumerate().all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    shape_ok && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Parse a purely numeric string into a JSON number.
pub fn parse_numeric(s: &str) -> Option<Number> {
    if !NUMERIC.is_match(s) {
        return None;
    }
    if s.contains('.') {
        s.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        s.parse::<i64>()
            .ok()
            .map(Number::from)
            .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64))
    }
}

/// Apply the outgoing rules: expand dates and coerce monetary strings.
pub fn normalize_outgoing(value: Value) -> Value {
    walk(value, &|key, v| match v {
        Value::String(s) if is_date_field(key) => match expand_date(&s) {
            Some(expanded) => Value::String(expanded),
            None => Value::String(s),
        },
        Value::String(s) if is_monetary_field(key) => match parse_numeric(&s) {
            Some(n) => Value::Number(n),
            None => Value::String(s),
        },
        other => other,
    })
}

/// Apply the incoming rules: truncate timestamps in date fields.
pub fn normalize_incoming(value: Value) -> Value {
    walk(value, &|key, v| match v {
        Value::String(s) if is_date_field(key) => match truncate_timestamp(&s) {
            Some(date) => Value::String(date),
            None => Value::String(s),
        },
        other => other,
    })
}

/// Depth-first walk that hands every primitive object member to `rule`
/// together with its key. Containers are recursed into, never rewritten.
fn walk(value: Value, rule: &dyn Fn(&str, Value) -> Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| {
                    let inner = match inner {
                        Value::Object(_) | Value::Array(_) => walk(inner, rule),
                        primitive => rule(&key, primitive),
                    };
                    (key, inner)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| walk(v, rule)).collect()),
        primitive => primitive,
    }
}
