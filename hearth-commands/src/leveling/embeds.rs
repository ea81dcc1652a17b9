use poise::serenity_prelude as serenity;

use hearth_utils::embed::{DEFAULT_EMBED_COLOR, ERROR_EMBED_COLOR, SUCCESS_EMBED_COLOR};
use hearth_utils::formatting::{escape_mentions, format_thousands};
use hearth_utils::leveling::{LevelProgress, MAX_LEVEL, progress_bar};

pub const CLAIM_XP_BUTTON_ID: &str = "claim_xp";

/// Text rendering of a member's level card.
pub fn level_card_embed(
    display_name: &str,
    avatar_url: &str,
    progress: &LevelProgress,
    rank: Option<u64>,
) -> serenity::CreateEmbed {
    let rank_label = rank.map_or_else(|| "Unranked".to_owned(), |rank| format!("#{rank}"));

    let progress_line = if progress.is_max_level() {
        format!("{}\nMax level reached", progress_bar(100))
    } else {
        format!(
            "{}  {}%\n{} / {} XP ({} to level {})",
            progress_bar(progress.percent()),
            progress.percent(),
            format_thousands(progress.progress_xp),
            format_thousands(progress.required_xp),
            format_thousands(progress.remaining_xp()),
            progress.level + 1,
        )
    };

    serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .author(serenity::CreateEmbedAuthor::new(escape_mentions(display_name)).icon_url(avatar_url))
        .thumbnail(avatar_url)
        .field("Level", format!("{} / {}", progress.level, MAX_LEVEL), true)
        .field("Rank", rank_label, true)
        .field("Total XP", format_thousands(progress.total_xp), true)
        .field("Progress", progress_line, false)
}

pub fn level_up_message(user_id: serenity::UserId, level: u32) -> String {
    format!("**GG <@{}>, you just reached level {}!**", user_id.get(), level)
}

pub fn leaderboard_line(position: usize, display_name: &str, xp: u64) -> String {
    let level = LevelProgress::for_xp(xp).level;
    let medal = match position {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        _ => "",
    };

    let prefix = if medal.is_empty() {
        format!("**{position}.**")
    } else {
        medal.to_owned()
    };

    format!(
        "{prefix} {} • level {level} • {} XP",
        escape_mentions(display_name),
        format_thousands(xp)
    )
}

pub fn drop_open_embed(amount: u64, expires_at: u64) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("XP drop!")
        .description(format!(
            "**{} XP** up for grabs. First to click gets it!\nExpires <t:{expires_at}:R>.",
            format_thousands(amount)
        ))
        .color(SUCCESS_EMBED_COLOR)
}

pub fn drop_claimed_embed(amount: u64, user_id: serenity::UserId) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("XP drop claimed")
        .description(format!(
            "**{} XP** claimed by <@{}>.",
            format_thousands(amount),
            user_id.get()
        ))
        .color(DEFAULT_EMBED_COLOR)
}

pub fn drop_expired_embed(amount: u64) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("XP drop expired")
        .description(format!("Nobody claimed the **{} XP**.", format_thousands(amount)))
        .color(ERROR_EMBED_COLOR)
}

pub fn drop_button_row(amount: u64) -> serenity::CreateActionRow {
    serenity::CreateActionRow::Buttons(vec![serenity::CreateButton::new(CLAIM_XP_BUTTON_ID)
        .label(format!("Claim {} XP", format_thousands(amount)))
        .style(serenity::ButtonStyle::Primary)])
}

pub fn drop_closed_row(label: &str) -> serenity::CreateActionRow {
    serenity::CreateActionRow::Buttons(vec![serenity::CreateButton::new(CLAIM_XP_BUTTON_ID)
        .label(label)
        .style(serenity::ButtonStyle::Secondary)
        .disabled(true)])
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::{leaderboard_line, level_up_message};

    #[test]
    fn podium_gets_medals() {
        assert!(leaderboard_line(1, "Ana", 300).starts_with("🥇 Ana"));
        assert!(leaderboard_line(4, "Bo", 50).starts_with("**4.** Bo"));
    }

    #[test]
    fn leaderboard_line_shows_level_and_xp() {
        assert_eq!(
            leaderboard_line(5, "Cy", 1_000),
            "**5.** Cy • level 5 • 1,000 XP"
        );
    }

    #[test]
    fn level_up_mentions_member() {
        assert_eq!(
            level_up_message(serenity::UserId::new(12), 3),
            "**GG <@12>, you just reached level 3!**"
        );
    }
}
