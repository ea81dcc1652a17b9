use std::collections::HashSet;

pub const OPEN_PREFIX: &str = "ticket-";
pub const CLOSED_PREFIX: &str = "closed-";

const MAX_SANITIZED_LEN: usize = 50;
const FALLBACK_NAME: &str = "user";

/// Lowercase ascii letters and digits joined by single dashes, at most 50 chars.
pub fn sanitize_display_name(display_name: &str) -> String {
    let mut sanitized = String::with_capacity(display_name.len());
    for ch in display_name.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
        } else if !sanitized.is_empty() && !sanitized.ends_with('-') {
            sanitized.push('-');
        }
    }

    let truncated: String = sanitized.chars().take(MAX_SANITIZED_LEN).collect();
    let trimmed = truncated.trim_end_matches('-');

    if trimmed.is_empty() {
        FALLBACK_NAME.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// `base`, or `base-1`, `base-2`, ... for the first name not in `taken`.
pub fn unique_channel_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_owned();
    }

    (1..)
        .map(|suffix| format!("{base}-{suffix}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_owned())
}

pub fn open_channel_name(sanitized: &str, taken: &HashSet<String>) -> String {
    unique_channel_name(&format!("{OPEN_PREFIX}{sanitized}"), taken)
}

pub fn closed_channel_name(sanitized: &str) -> String {
    format!("{CLOSED_PREFIX}{sanitized}")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{closed_channel_name, open_channel_name, sanitize_display_name};

    #[test]
    fn sanitizes_to_dashed_lowercase() {
        assert_eq!(sanitize_display_name("Cool Gamer!!42"), "cool-gamer-42");
        assert_eq!(sanitize_display_name("--Hello--World--"), "hello-world");
        assert_eq!(sanitize_display_name("Zoé"), "zo");
    }

    #[test]
    fn falls_back_when_nothing_survives() {
        assert_eq!(sanitize_display_name("★★★"), "user");
        assert_eq!(sanitize_display_name(""), "user");
    }

    #[test]
    fn truncates_long_names_without_trailing_dash() {
        let long = format!("{} tail", "a".repeat(49));
        let sanitized = sanitize_display_name(&long);
        assert_eq!(sanitized, "a".repeat(49));
        assert_eq!(sanitize_display_name(&"b".repeat(80)).len(), 50);
    }

    #[test]
    fn appends_counter_until_unique() {
        let taken: HashSet<String> = ["ticket-sam", "ticket-sam-1"]
            .into_iter()
            .map(str::to_owned)
            .collect();

        assert_eq!(open_channel_name("sam", &taken), "ticket-sam-2");
        assert_eq!(open_channel_name("alex", &taken), "ticket-alex");
    }

    #[test]
    fn closed_names_use_their_own_prefix() {
        assert_eq!(closed_channel_name("sam"), "closed-sam");
    }
}
