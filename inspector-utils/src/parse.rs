/// Parse a compact duration token like `30s`, `10m`, `2h`, `1d`, or plain seconds.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let compact: String = value.chars().filter(|ch| !ch.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let bytes = compact.as_bytes();
    let mut cursor = 0;
    let mut total_seconds = 0_u64;
    let mut saw_unit_segment = false;

    while cursor < bytes.len() {
        let number_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }

        if number_start == cursor {
            return None;
        }

        let number = compact[number_start..cursor].parse::<u64>().ok()?;
        if number == 0 {
            return None;
        }

        let saw_unit = cursor < bytes.len();
        let multiplier = if saw_unit {
            let unit = bytes[cursor] as char;
            cursor += 1;

            match unit {
                's' | 'S' => 1_u64,
                'm' | 'M' => 60_u64,
                'h' | 'H' => 60_u64 * 60,
                'd' | 'D' => 60_u64 * 60 * 24,
                'w' | 'W' => 60_u64 * 60 * 24 * 7,
                _ => return None,
            }
        } else {
            1_u64
        };

        if !saw_unit && saw_unit_segment {
            return None;
        }

        saw_unit_segment = saw_unit_segment || saw_unit;

        let part_seconds = number.checked_mul(multiplier)?;
        total_seconds = total_seconds.checked_add(part_seconds)?;
    }

    if total_seconds == 0 {
        None
    } else {
        Some(total_seconds)
    }
}

/// Extract a snowflake from a raw id or a user, role or channel mention.
pub fn parse_snowflake(raw: &str) -> Option<u64> {
    let value = raw.trim();
    let inner = value
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|rest| rest.trim_start_matches(['@', '#', '!', '&']))
        .unwrap_or(value);

    if inner.is_empty() || !inner.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }

    inner.parse::<u64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::{parse_duration_seconds, parse_snowflake};

    #[test]
    fn parses_compact_durations() {
        assert_eq!(parse_duration_seconds("30"), Some(30));
        assert_eq!(parse_duration_seconds("30s"), Some(30));
        assert_eq!(parse_duration_seconds("10m"), Some(600));
        assert_eq!(parse_duration_seconds("2h30m"), Some(9000));
        assert_eq!(parse_duration_seconds("1d 2h"), Some(93_600));
        assert_eq!(parse_duration_seconds("1w"), Some(604_800));
    }

    #[test]
    fn rejects_bad_durations() {
        assert_eq!(parse_duration_seconds(""), None);
        assert_eq!(parse_duration_seconds("0s"), None);
        assert_eq!(parse_duration_seconds("5x"), None);
        assert_eq!(parse_duration_seconds("1h30"), None);
        assert_eq!(parse_duration_seconds("m"), None);
    }

    #[test]
    fn parses_snowflakes() {
        assert_eq!(parse_snowflake("80351110224678912"), Some(80351110224678912));
        assert_eq!(parse_snowflake("<@80351110224678912>"), Some(80351110224678912));
        assert_eq!(parse_snowflake("<@!80351110224678912>"), Some(80351110224678912));
        assert_eq!(parse_snowflake("<#41771983423143937>"), Some(41771983423143937));
        assert_eq!(parse_snowflake("<@&165511591545143296>"), Some(165511591545143296));
        assert_eq!(parse_snowflake("someone"), None);
        assert_eq!(parse_snowflake("<@>"), None);
        assert_eq!(parse_snowflake("0"), None);
    }
}
