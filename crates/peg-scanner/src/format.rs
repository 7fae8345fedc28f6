//! Display formatting for numeric-or-absent values.
//!
//! Every function here is total: `None`, NaN and infinities all render as
//! [`PLACEHOLDER`], so a renderer can pass values through without checking.

use chrono::{DateTime, SecondsFormat};

/// Shown wherever a value is unknown.
pub const PLACEHOLDER: &str = "—";

/// Fixed-point with `digits` decimals, e.g. `28.456` -> `"28.46"`.
pub fn format_number(value: Option<f64>, digits: usize) -> String {
    match finite(value) {
        Some(v) => format!("{v:.digits$}"),
        None => PLACEHOLDER.to_string(),
    }
}

/// A ratio as a percentage with two decimals, e.g. `0.1234` -> `"12.34%"`.
pub fn format_percent(value: Option<f64>) -> String {
    match finite(value.map(|v| v * 100.0)) {
        Some(pct) => format!("{pct:.2}%"),
        None => PLACEHOLDER.to_string(),
    }
}

/// Abbreviated trading volume: `1_500_000` -> `"1.5M"`, `2_300` -> `"2.3K"`,
/// `500` -> `"500"`.
pub fn format_volume(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) if v >= 1_000_000.0 => format!("{:.1}M", v / 1_000_000.0),
        Some(v) if v >= 1_000.0 => format!("{:.1}K", v / 1_000.0),
        Some(v) => v.to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Unix seconds as a calendar date (UTC), e.g. `1700000000` -> `"2023-11-14"`.
/// `0` means "never set" and renders as the placeholder.
pub fn format_timestamp(secs: Option<i64>) -> String {
    secs.filter(|s| *s != 0)
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Unix milliseconds as RFC 3339 with millisecond precision, e.g.
/// `1700000000000` -> `"2023-11-14T22:13:20.000Z"`.
pub fn format_iso_millis(millis: Option<i64>) -> String {
    millis
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Blank text (e.g. an unknown sector) renders as the placeholder.
pub fn or_placeholder(text: &str) -> &str {
    if text.trim().is_empty() {
        PLACEHOLDER
    } else {
        text
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
