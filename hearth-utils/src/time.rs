use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// Return the current unix timestamp in seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

/// Render a Discord timestamp tag pair, e.g. `<t:123:R> • <t:123:f>`.
pub fn discord_timestamp_pair(unix_secs: u64) -> String {
    format!("<t:{unix_secs}:R> • <t:{unix_secs}:f>")
}

/// Format a unix timestamp as `YYYY-MM-DD HH:MM:SS UTC`; `None` outside chrono's range.
pub fn format_utc(unix_secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(unix_secs, 0)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

#[cfg(test)]
mod tests {
    use super::{discord_timestamp_pair, format_utc};

    #[test]
    fn formats_epoch_and_recent_dates() {
        assert_eq!(format_utc(0).as_deref(), Some("1970-01-01 00:00:00 UTC"));
        assert_eq!(format_utc(1_700_000_000).as_deref(), Some("2023-11-14 22:13:20 UTC"));
    }

    #[test]
    fn handles_leap_days() {
        assert_eq!(format_utc(951_782_400).as_deref(), Some("2000-02-29 00:00:00 UTC"));
        assert_eq!(format_utc(951_868_800).as_deref(), Some("2000-03-01 00:00:00 UTC"));
    }

    #[test]
    fn out_of_range_timestamps_are_rejected() {
        assert_eq!(format_utc(i64::MAX), None);
        assert_eq!(format_utc(i64::MIN), None);
    }

    #[test]
    fn timestamp_pair_uses_relative_and_full_styles() {
        assert_eq!(discord_timestamp_pair(42), "<t:42:R> • <t:42:f>");
    }
}
