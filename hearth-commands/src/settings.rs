/// What a `[#channel|@role|clear]` style argument asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingInput {
    Show,
    Clear,
    Set(u64),
    Invalid,
}

pub fn parse_setting_input(raw: Option<&str>, parse_id: fn(&str) -> Option<u64>) -> SettingInput {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return SettingInput::Show;
    };

    if raw.eq_ignore_ascii_case("clear") || raw.eq_ignore_ascii_case("none") {
        return SettingInput::Clear;
    }

    parse_id(raw).map_or(SettingInput::Invalid, SettingInput::Set)
}

#[cfg(test)]
mod tests {
    use hearth_utils::parse::{parse_channel_id, parse_role_id};

    use super::{SettingInput, parse_setting_input};

    #[test]
    fn empty_input_shows_current_value() {
        assert_eq!(parse_setting_input(None, parse_channel_id), SettingInput::Show);
        assert_eq!(parse_setting_input(Some("  "), parse_channel_id), SettingInput::Show);
    }

    #[test]
    fn clear_is_case_insensitive() {
        assert_eq!(parse_setting_input(Some("CLEAR"), parse_role_id), SettingInput::Clear);
    }

    #[test]
    fn mentions_are_resolved_with_the_given_parser() {
        assert_eq!(
            parse_setting_input(Some("<#123456789012345678>"), parse_channel_id),
            SettingInput::Set(123_456_789_012_345_678)
        );
        assert_eq!(
            parse_setting_input(Some("<#123456789012345678>"), parse_role_id),
            SettingInput::Invalid
        );
    }
}
