use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::parse::parse_duration_seconds;

/// Discord timestamp markup styles, in the order they are shown to users.
pub const TIMESTAMP_STYLES: [(char, &str); 7] = [
    ('t', "Short time"),
    ('T', "Long time"),
    ('d', "Short date"),
    ('D', "Long date"),
    ('f', "Short date/time"),
    ('F', "Long date/time"),
    ('R', "Relative"),
];

/// Parse a user supplied point in time.
///
/// Accepted forms, all read as UTC:
/// unix seconds, RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]`,
/// or a compact relative duration (`2h30m`, `in 10m`) added to `now`.
pub fn parse_when(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if value.bytes().all(|byte| byte.is_ascii_digit()) {
        let secs = value.parse::<i64>().ok()?;
        return Utc.timestamp_opt(secs, 0).single();
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    let relative = value
        .strip_prefix("in ")
        .or_else(|| value.strip_prefix("In "))
        .unwrap_or(value);
    let secs = i64::try_from(parse_duration_seconds(relative)?).ok()?;
    now.checked_add_signed(chrono::TimeDelta::try_seconds(secs)?)
}

/// Render `<t:SECS:STYLE>` markup.
pub fn discord_timestamp(unix_secs: i64, style: char) -> String {
    format!("<t:{unix_secs}:{style}>")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{discord_timestamp, parse_when};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_absolute_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        assert_eq!(parse_when("1704164645", now()), Some(expected));
        assert_eq!(parse_when("2024-01-02T03:04:05Z", now()), Some(expected));
        assert_eq!(parse_when("2024-01-02T05:04:05+02:00", now()), Some(expected));
        assert_eq!(parse_when("2024-01-02 03:04:05", now()), Some(expected));
        assert_eq!(
            parse_when("2024-01-02 03:04", now()),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap())
        );
        assert_eq!(
            parse_when(" 2024-01-02 ", now()),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn parses_relative_forms() {
        assert_eq!(
            parse_when("2h30m", now()),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap())
        );
        assert_eq!(
            parse_when("in 10m", now()),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 10, 0).unwrap())
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_when("", now()), None);
        assert_eq!(parse_when("tomorrow", now()), None);
        assert_eq!(parse_when("2024-13-40", now()), None);
        assert_eq!(parse_when("in", now()), None);
    }

    #[test]
    fn renders_markup() {
        assert_eq!(discord_timestamp(1700000000, 'R'), "<t:1700000000:R>");
    }
}
