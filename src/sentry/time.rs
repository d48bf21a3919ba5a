//! Timestamp display

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde_json::Value;

/// Display offset from UTC (Asia/Shanghai, no DST)
const DISPLAY_OFFSET_HOURS: i64 = 8;

/// Format a Sentry timestamp for display in China Standard Time
///
/// Accepts RFC 3339 strings, naive ISO strings (read as UTC) and epoch
/// seconds. An absent value formats `now`; an unparseable string is shown
/// as-is.
pub fn format_timestamp(value: Option<&Value>, now: DateTime<Utc>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => match parse_timestamp(s) {
            Some(dt) => display(dt).unwrap_or_else(|| s.clone()),
            None => s.clone(),
        },
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n
            .as_f64()
            .and_then(from_epoch_secs)
            .and_then(display)
            .unwrap_or_else(|| n.to_string()),
        _ => display(now).unwrap_or_else(|| now.to_rfc3339()),
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn from_epoch_secs(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
}

fn display(dt: DateTime<Utc>) -> Option<String> {
    let local = dt
        .naive_utc()
        .checked_add_signed(TimeDelta::hours(DISPLAY_OFFSET_HOURS))?;
    Some(local.format("%Y/%-m/%-d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn rfc3339_shifts_to_utc_plus_eight() {
        let got = format_timestamp(Some(&json!("2024-01-01T00:00:00Z")), fixed_now());
        assert_eq!(got, "2024/1/1 08:00:00");
    }

    #[test]
    fn fractional_seconds_and_offsets() {
        let got = format_timestamp(
            Some(&json!("2024-03-15T23:30:05.123456+00:00")),
            fixed_now(),
        );
        assert_eq!(got, "2024/3/16 07:30:05");

        let got = format_timestamp(Some(&json!("2024-03-15T10:00:00+08:00")), fixed_now());
        assert_eq!(got, "2024/3/15 10:00:00");
    }

    #[test]
    fn naive_iso_read_as_utc() {
        let got = format_timestamp(Some(&json!("2024-01-01T16:00:00.5")), fixed_now());
        assert_eq!(got, "2024/1/2 00:00:00");
    }

    #[test]
    fn epoch_seconds() {
        let got = format_timestamp(Some(&json!(1704067200.25)), fixed_now());
        assert_eq!(got, "2024/1/1 08:00:00");
    }

    #[test]
    fn missing_uses_now() {
        assert_eq!(format_timestamp(None, fixed_now()), "2024/6/1 20:00:00");
        assert_eq!(
            format_timestamp(Some(&json!("")), fixed_now()),
            "2024/6/1 20:00:00"
        );
        assert_eq!(
            format_timestamp(Some(&Value::Null), fixed_now()),
            "2024/6/1 20:00:00"
        );
    }

    #[test]
    fn garbage_is_shown_verbatim() {
        assert_eq!(
            format_timestamp(Some(&json!("yesterday")), fixed_now()),
            "yesterday"
        );
    }

    #[test]
    fn out_of_range_epoch_is_shown_verbatim() {
        let got = format_timestamp(Some(&json!(1e300)), fixed_now());
        assert_eq!(got, json!(1e300).to_string());
    }
}
