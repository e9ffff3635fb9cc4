//! Time and cost arithmetic plus the fixed-locale display formats.
//!
//! Everything here is pure. Functions that default the end instant to "now"
//! take the current time explicitly; callers get it from a [`crate::clock::Clock`].

use chrono::DateTime;
use chrono_tz::Europe::Kyiv;

use crate::domain::Timestamp;

/// Values below this are taken to be seconds rather than milliseconds.
pub const SECONDS_THRESHOLD: Timestamp = 10_000_000_000;

pub const CURRENCY_SUFFIX: &str = "грн";

/// Brings a timestamp to milliseconds.
///
/// Upstream sources disagree on the unit, so anything below
/// [`SECONDS_THRESHOLD`] is scaled up. A real millisecond value from before
/// 2001 is misread as seconds; this is a known limitation.
pub fn normalize_timestamp(t: Timestamp) -> Timestamp {
    if t < SECONDS_THRESHOLD {
        t.saturating_mul(1000)
    } else {
        t
    }
}

/// Whole seconds from `start` to `end`, or to `now` when `end` is `None`.
///
/// Not clamped: a stop before the start gives a negative result.
pub fn duration_seconds(start: Timestamp, end: Option<Timestamp>, now: Timestamp) -> i64 {
    let end = end.unwrap_or(now);
    normalize_timestamp(end)
        .saturating_sub(normalize_timestamp(start))
        .div_euclid(1000)
}

pub fn duration_minutes(start: Timestamp, end: Option<Timestamp>, now: Timestamp) -> i64 {
    duration_seconds(start, end, now).div_euclid(60)
}

/// Cost of a session billed by whole minutes. Unrounded.
pub fn cost(duration_minutes: i64, price_per_minute: f64) -> f64 {
    duration_minutes as f64 * price_per_minute
}

/// `HH:MM:SS` with unbounded hours. Negative durations render as zero.
pub fn format_duration_hms(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// "2 год 15 хв"; zero parts are dropped, "0 хв" when nothing is left.
pub fn format_duration_human(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{} год", hours));
    }
    if minutes > 0 {
        parts.push(format!("{} хв", minutes));
    }

    if parts.is_empty() {
        "0 хв".to_string()
    } else {
        parts.join(" ")
    }
}

pub fn format_cost(amount: f64) -> String {
    format!("{:.2} {}", amount, CURRENCY_SUFFIX)
}

fn format_in_kyiv(t: Timestamp, pattern: &str) -> String {
    match DateTime::from_timestamp_millis(normalize_timestamp(t)) {
        Some(utc) => utc.with_timezone(&Kyiv).format(pattern).to_string(),
        None => "-".to_string(),
    }
}

/// `dd.MM.yyyy HH:mm:ss` in Kyiv time.
pub fn format_timestamp_full(t: Timestamp) -> String {
    format_in_kyiv(t, "%d.%m.%Y %H:%M:%S")
}

/// `HH:mm` in Kyiv time.
pub fn format_timestamp_time(t: Timestamp) -> String {
    format_in_kyiv(t, "%H:%M")
}

/// `dd.MM.yyyy` in Kyiv time.
pub fn format_timestamp_date(t: Timestamp) -> String {
    format_in_kyiv(t, "%d.%m.%Y")
}

pub fn is_active(stopped_at: Option<Timestamp>) -> bool {
    stopped_at.is_none()
}
