use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::leveling::embeds::leaderboard_line;
use crate::moderation::guild_only_message;
use hearth_core::{Context, Error};
use hearth_database::impls::levels::top_members;
use hearth_utils::embed::DEFAULT_EMBED_COLOR;

pub const META: CommandMeta = CommandMeta {
    name: "leaderboard",
    desc: "Top members of this server by XP.",
    category: "leveling",
    usage: "!leaderboard",
};

const LEADERBOARD_SIZE: usize = 10;
/// Extra rows fetched so departed members can be skipped.
const FETCH_LIMIT: u32 = 50;

#[poise::command(prefix_command, slash_command, category = "Leveling")]
pub async fn leaderboard(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let entries = top_members(&ctx.data().db, guild_id.get(), FETCH_LIMIT).await?;

    let mut lines = Vec::with_capacity(LEADERBOARD_SIZE);
    for entry in entries {
        if lines.len() == LEADERBOARD_SIZE {
            break;
        }

        let Ok(member) = guild_id
            .member(ctx.http(), serenity::UserId::new(entry.user_id))
            .await
        else {
            continue;
        };

        lines.push(leaderboard_line(lines.len() + 1, member.display_name(), entry.xp));
    }

    if lines.is_empty() {
        ctx.say("Nobody has earned any XP here yet.").await?;
        return Ok(());
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("Leaderboard")
        .description(lines.join("\n"))
        .color(DEFAULT_EMBED_COLOR);
    if let Some(icon) = ctx.guild().and_then(|guild| guild.icon_url()) {
        embed = embed.thumbnail(icon);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
