/// Format seconds into a compact human-readable duration (e.g. 59s, 1m, 1h, 1d, 1h 30m).
pub fn format_compact_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        return if hours > 0 {
            format!("{}d {}h", days, hours)
        } else {
            format!("{}d", days)
        };
    }

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }
    parts.join(" ")
}

/// Format seconds as spelled-out units, e.g. "2 days and 5 minutes".
pub fn format_long_duration(total_seconds: u64) -> String {
    let units = [
        (total_seconds / 86_400, "day"),
        ((total_seconds % 86_400) / 3_600, "hour"),
        ((total_seconds % 3_600) / 60, "minute"),
        (total_seconds % 60, "second"),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| {
            if *amount == 1 {
                format!("1 {unit}")
            } else {
                format!("{amount} {unit}s")
            }
        })
        .collect();

    match parts.as_slice() {
        [] => "0 seconds".to_owned(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    }
}

/// Format a track length as `m:ss`, or `h:mm:ss` past one hour.
pub fn format_track_duration(total_seconds: u64) -> String {
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// English ordinal suffix, e.g. 1 -> "1st", 12 -> "12th", 23 -> "23rd".
pub fn ordinal(value: u64) -> String {
    let suffix = match (value % 10, value % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{value}{suffix}")
}

/// Group digits with commas, e.g. 1234567 -> "1,234,567".
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Neutralise `@` so user-provided text cannot ping anyone.
pub fn escape_mentions(text: &str) -> String {
    text.replace('@', "@\u{200B}")
}

/// Cut `text` to at most `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::{
        escape_mentions, format_compact_duration, format_long_duration, format_thousands,
        format_track_duration, ordinal, truncate_chars,
    };

    #[test]
    fn compact_duration_formatting() {
        assert_eq!(format_compact_duration(0), "0s");
        assert_eq!(format_compact_duration(59), "59s");
        assert_eq!(format_compact_duration(60), "1m");
        assert_eq!(format_compact_duration(61), "1m 1s");
        assert_eq!(format_compact_duration(3600), "1h");
        assert_eq!(format_compact_duration(3660), "1h 1m");
        assert_eq!(format_compact_duration(3670), "1h 1m 10s");
        assert_eq!(format_compact_duration(3605), "1h 5s");
        assert_eq!(format_compact_duration(86400), "1d");
        assert_eq!(format_compact_duration(90000), "1d 1h");
    }

    #[test]
    fn long_duration_spells_units() {
        assert_eq!(format_long_duration(0), "0 seconds");
        assert_eq!(format_long_duration(1), "1 second");
        assert_eq!(format_long_duration(300), "5 minutes");
        assert_eq!(format_long_duration(86_400 * 2 + 300), "2 days and 5 minutes");
        assert_eq!(
            format_long_duration(86_400 + 3_600 + 60 + 1),
            "1 day, 1 hour, 1 minute and 1 second"
        );
    }

    #[test]
    fn track_duration_switches_to_hours() {
        assert_eq!(format_track_duration(0), "0:00");
        assert_eq!(format_track_duration(65), "1:05");
        assert_eq!(format_track_duration(3599), "59:59");
        assert_eq!(format_track_duration(3600), "1:00:00");
        assert_eq!(format_track_duration(3725), "1:02:05");
    }

    #[test]
    fn ordinals() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(112), "112th");
        assert_eq!(ordinal(1003), "1003rd");
    }

    #[test]
    fn thousands_separator() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(257500), "257,500");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn mentions_are_escaped() {
        assert_eq!(escape_mentions("hi @everyone"), "hi @\u{200B}everyone");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_chars("ééééé", 3), "éé…");
    }
}
