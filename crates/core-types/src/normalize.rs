//! Numeric and date normalizers shared by every layer.
//!
//! Backend rows are loosely typed: numbers may come back as JSON numbers,
//! numeric strings, `null`, or not at all. Dates are always exchanged as plain
//! calendar-day strings in the marketplace's business timezone (Moscow, UTC+3),
//! regardless of where the caller runs.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Moscow has not observed DST since 2014, so a fixed offset is exact.
pub const BUSINESS_UTC_OFFSET_SECS: i32 = 3 * 3600;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Coerces an arbitrary JSON value into a `Decimal`. Anything that is not a
/// finite number or a numeric string becomes zero.
pub fn coerce_decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64))
            .unwrap_or(Decimal::ZERO),
        Value::String(s) => parse_decimal_str(s).unwrap_or(Decimal::ZERO),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => Decimal::ZERO,
    }
}

/// Same as [`coerce_decimal`] for an optional value; missing means zero.
pub fn coerce_optional(value: Option<&Value>) -> Decimal {
    value.map(coerce_decimal).unwrap_or(Decimal::ZERO)
}

fn parse_decimal_str(raw: &str) -> Option<Decimal> {
    // Localised exports use "1 234,50" (regular or non-breaking space).
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// The fixed business timezone.
pub fn business_offset() -> FixedOffset {
    FixedOffset::east_opt(BUSINESS_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// The business calendar day an instant falls on.
pub fn business_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&business_offset()).date_naive()
}

/// Renders a calendar day the way the backend expects it (`YYYY-MM-DD`).
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parses an operation timestamp into business-local wall time.
///
/// Accepts RFC 3339 (converted into the business timezone), naive
/// `YYYY-MM-DD HH:MM:SS[.f]` / `YYYY-MM-DDTHH:MM:SS[.f]` (taken as already
/// business-local), and a bare `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&business_offset()).naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(raw, DAY_FORMAT)
        .ok()
        .map(|day| day.and_time(NaiveTime::MIN))
}
