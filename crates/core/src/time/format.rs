use chrono::{DateTime, Utc};

// 1e11 seconds is past the year 5000, so anything at least this large is milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Day label shown next to a supplier's latest price.
pub fn latest_date_label(ts: DateTime<Utc>) -> String {
    ts.format("%d/%m/%Y").to_string()
}

/// Chart bucket key; drops the time of day.
pub fn bucket_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

pub fn epoch_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

/// Interprets an integer epoch value as seconds or milliseconds depending on its
/// magnitude. Returns `None` when the value is out of chrono's range.
pub fn timestamp_from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value.checked_abs().map_or(true, |v| v >= MILLIS_THRESHOLD) {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

/// CSV form of a timestamp: integer epoch milliseconds. Instants close enough to 1970
/// that the integer would read back as seconds are written as decimal seconds instead
/// (`76204800.000`).
pub fn epoch_field(ts: DateTime<Utc>) -> String {
    let millis = epoch_millis(ts);
    let abs = millis.unsigned_abs();
    if abs >= MILLIS_THRESHOLD.unsigned_abs() {
        return millis.to_string();
    }
    let sign = if millis < 0 { "-" } else { "" };
    format!("{sign}{}.{:03}", abs / 1000, abs % 1000)
}

/// Parses a CSV timestamp: an integer epoch value (see [`timestamp_from_epoch`]) or
/// decimal seconds with at most millisecond precision.
pub fn parse_epoch_field(input: &str) -> Option<DateTime<Utc>> {
    let Some((whole, frac)) = input.split_once('.') else {
        return input.parse::<i64>().ok().and_then(timestamp_from_epoch);
    };
    let (negative, whole) = match whole.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, whole),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(whole) || !digits(frac) || frac.len() > 3 {
        return None;
    }

    let secs = whole.parse::<i64>().ok()?;
    let frac_millis = format!("{frac:0<3}").parse::<i64>().ok()?;
    let millis = secs.checked_mul(1000)?.checked_add(frac_millis)?;
    DateTime::from_timestamp_millis(if negative { -millis } else { millis })
}
