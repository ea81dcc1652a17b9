use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{fetch_target_profile, guild_only_message, usage_message};
use crate::moderation::guard::ensure_invoker_permission;
use hearth_core::{Context, Error};
use hearth_database::impls::warnings::list_warnings;
use hearth_database::model::warnings::WarningEntry;
use hearth_utils::formatting::escape_mentions;
use hearth_utils::pagination::{page_window, paginate_embed_pages_with_icon, total_pages};
use hearth_utils::time::discord_timestamp_pair;

pub const META: CommandMeta = CommandMeta {
    name: "warnings",
    desc: "Show a user's warning history.",
    category: "moderation",
    usage: "!warnings <user>",
};

const WARNINGS_PER_PAGE: usize = 5;

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "The user to check"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_invoker_permission(&ctx, guild_id, serenity::Permissions::KICK_MEMBERS, "Kick Members")
        .await?
    {
        return Ok(());
    }

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let entries = list_warnings(&ctx.data().db, guild_id.get(), user.id.get()).await?;
    let target_profile = fetch_target_profile(ctx.http(), user.id).await;
    let pages = render_pages(&entries);

    paginate_embed_pages_with_icon(
        ctx,
        &format!("Warnings for {}", target_profile.display_name),
        &pages,
        1,
        target_profile.avatar_url.as_deref(),
    )
    .await?;

    Ok(())
}

/// Newest first; numbers match what `unwarn` expects.
fn render_pages(entries: &[WarningEntry]) -> Vec<String> {
    let total = entries.len();
    if total == 0 {
        return vec!["Total warnings: **0**\n\nThis user has a clean record.".to_owned()];
    }

    (1..=total_pages(total, WARNINGS_PER_PAGE))
        .map(|page| {
            let (start, end) = page_window(total, WARNINGS_PER_PAGE, page);
            let mut lines = format!("Total warnings: **{total}**\n\n");

            for display_index in start..end {
                let index = total - 1 - display_index;
                let entry = &entries[index];
                lines.push_str(&format!(
                    "#{} • by <@{}>\n**Reason :** {}\n**When :** {}\n\n",
                    index + 1,
                    entry.moderator_id,
                    escape_mentions(&entry.reason),
                    discord_timestamp_pair(entry.warned_at),
                ));
            }

            lines.trim_end().to_owned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use hearth_database::model::warnings::WarningEntry;

    use super::render_pages;

    fn entry(warned_at: u64, reason: &str) -> WarningEntry {
        WarningEntry {
            warned_at,
            moderator_id: 7,
            reason: reason.to_owned(),
        }
    }

    #[test]
    fn empty_history_still_renders_a_page() {
        let pages = render_pages(&[]);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].contains("**0**"));
    }

    #[test]
    fn newest_warning_comes_first_with_its_number() {
        let entries: Vec<_> = (1..=6).map(|n| entry(n * 100, &format!("r{n}"))).collect();
        let pages = render_pages(&entries);

        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("#6 •"));
        assert!(pages[0].find("#6").unwrap() < pages[0].find("#5").unwrap());
        assert!(pages[1].contains("#1 •"));
        assert!(!pages[1].contains("#2 •"));
    }
}
