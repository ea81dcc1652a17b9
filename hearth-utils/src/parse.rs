/// Parse a duration like `30s`, `10m`, `2h`, `1d`, `1h30m`, `1h 30m`, or plain seconds.
///
/// Plain seconds are only accepted as the whole input.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    match tokens.as_slice() {
        [] => None,
        [single] => parse_duration_token(single),
        many => many.iter().try_fold(0_u64, |total, token| {
            if token.bytes().all(|byte| byte.is_ascii_digit()) {
                return None;
            }
            total.checked_add(parse_duration_token(token)?)
        }),
    }
}

fn parse_duration_token(token: &str) -> Option<u64> {
    let bytes = token.as_bytes();
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

        let number = token[number_start..cursor].parse::<u64>().ok()?;
        if number == 0 {
            return None;
        }

        let saw_unit = cursor < bytes.len();
        let multiplier = if saw_unit {
            let unit = bytes[cursor] as char;
            cursor += 1;

            match unit.to_ascii_lowercase() {
                's' => 1_u64,
                'm' => 60,
                'h' => 3_600,
                'd' => 86_400,
                'w' => 604_800,
                _ => return None,
            }
        } else {
            1
        };

        if !saw_unit && saw_unit_segment {
            return None;
        }
        saw_unit_segment |= saw_unit;

        total_seconds = total_seconds.checked_add(number.checked_mul(multiplier)?)?;
    }

    Some(total_seconds)
}

/// Parse a raw Discord snowflake (17 to 20 digits).
pub fn parse_snowflake(raw: &str) -> Option<u64> {
    let value = raw.trim();
    if !(17..=20).contains(&value.len()) || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    value.parse::<u64>().ok().filter(|id| *id > 0)
}

/// Parse `<#id>` or a bare channel id.
pub fn parse_channel_id(raw: &str) -> Option<u64> {
    parse_mention(raw, "<#")
}

/// Parse `<@&id>` or a bare role id.
pub fn parse_role_id(raw: &str) -> Option<u64> {
    parse_mention(raw, "<@&")
}

fn parse_mention(raw: &str, open: &str) -> Option<u64> {
    let value = raw.trim();
    let inner = value
        .strip_prefix(open)
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(value);

    parse_snowflake(inner)
}

#[cfg(test)]
mod tests {
    use super::{parse_channel_id, parse_duration_seconds, parse_role_id, parse_snowflake};

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration_seconds("30"), Some(30));
        assert_eq!(parse_duration_seconds("30s"), Some(30));
        assert_eq!(parse_duration_seconds("10m"), Some(600));
        assert_eq!(parse_duration_seconds("2H"), Some(7_200));
        assert_eq!(parse_duration_seconds("1d"), Some(86_400));
        assert_eq!(parse_duration_seconds("1w"), Some(604_800));
        assert_eq!(parse_duration_seconds("1h 30m"), Some(5_400));
        assert_eq!(parse_duration_seconds("1h30m15s"), Some(5_415));
    }

    #[test]
    fn rejects_bad_durations() {
        assert_eq!(parse_duration_seconds(""), None);
        assert_eq!(parse_duration_seconds("  "), None);
        assert_eq!(parse_duration_seconds("0m"), None);
        assert_eq!(parse_duration_seconds("m"), None);
        assert_eq!(parse_duration_seconds("5y"), None);
        assert_eq!(parse_duration_seconds("1h30"), None);
    }

    #[test]
    fn bare_seconds_do_not_merge_with_following_tokens() {
        assert_eq!(parse_duration_seconds("90 5m"), None);
        assert_eq!(parse_duration_seconds("5m 90"), None);
        assert_eq!(parse_duration_seconds(" 90 "), Some(90));
        assert_eq!(parse_duration_seconds("5m 30s"), Some(330));
    }

    #[test]
    fn parses_snowflakes() {
        assert_eq!(parse_snowflake("80351110224678912"), Some(80351110224678912));
        assert_eq!(parse_snowflake(" 1234567890123456789 "), Some(1234567890123456789));
        assert_eq!(parse_snowflake("1234"), None);
        assert_eq!(parse_snowflake("12345678901234567a"), None);
        assert_eq!(parse_snowflake("123456789012345678901"), None);
    }

    #[test]
    fn parses_mentions() {
        assert_eq!(parse_channel_id("<#80351110224678912>"), Some(80351110224678912));
        assert_eq!(parse_channel_id("80351110224678912"), Some(80351110224678912));
        assert_eq!(parse_channel_id("<@&80351110224678912>"), None);
        assert_eq!(parse_role_id("<@&80351110224678912>"), Some(80351110224678912));
        assert_eq!(parse_role_id("general"), None);
    }
}
