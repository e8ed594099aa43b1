use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Start of a trailing window of `range_days` days ending at `now`. Saturates at the
/// earliest representable instant for absurdly long windows.
pub fn window_start(now: DateTime<Utc>, range_days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(range_days))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Strict: a timestamp exactly at the window start is outside.
pub fn in_window(ts: DateTime<Utc>, now: DateTime<Utc>, range_days: u32) -> bool {
    ts > window_start(now, range_days)
}

/// Resolves an optional "now" override (RFC 3339 or YYYY-MM-DD at midnight UTC).
pub fn resolve_now(now_arg: Option<&str>, now_utc: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    let Some(s) = now_arg.map(str::trim) else {
        return Ok(now_utc);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid --now value (expected RFC 3339 or YYYY-MM-DD): {s}"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .context("invalid midnight for --now date")?;
    Ok(midnight.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn boundary_is_excluded() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        let start = window_start(now, 30);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 1, 2, 12, 0, 0).unwrap());
        assert!(!in_window(start, now, 30));
        assert!(in_window(start + Duration::seconds(1), now, 30));
        assert!(!in_window(start - Duration::days(1), now, 30));
    }

    #[test]
    fn zero_day_window_only_admits_the_future() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        assert!(!in_window(now, now, 0));
        assert!(in_window(now + Duration::seconds(1), now, 0));
    }

    #[test]
    fn huge_window_saturates() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        assert_eq!(window_start(now, u32::MAX), DateTime::<Utc>::MIN_UTC);
        assert!(in_window(Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap(), now, u32::MAX));
    }

    #[test]
    fn resolve_now_defaults_to_clock() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        assert_eq!(resolve_now(None, now).unwrap(), now);
    }

    #[test]
    fn resolve_now_accepts_dates_and_rfc3339() {
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        assert_eq!(
            resolve_now(Some("2025-12-24"), now).unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 24, 0, 0, 0).unwrap()
        );
        assert_eq!(
            resolve_now(Some("2025-12-24T10:00:00+01:00"), now).unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 24, 9, 0, 0).unwrap()
        );
        assert!(resolve_now(Some("yesterday"), now).is_err());
    }
}
