use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::guild_only_message;
use hearth_core::{Context, Error};
use hearth_utils::embed::DEFAULT_EMBED_COLOR;
use hearth_utils::formatting::format_thousands;

pub const META: CommandMeta = CommandMeta {
    name: "serverinfo",
    desc: "Show details about this server.",
    category: "utility",
    usage: "!serverinfo",
};

struct ServerSummary {
    name: String,
    icon_url: Option<String>,
    owner_id: serenity::UserId,
    member_count: u64,
    channel_count: usize,
    role_count: usize,
}

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn serverinfo(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let summary = ctx.guild().map(|guild| ServerSummary {
        name: guild.name.clone(),
        icon_url: guild.icon_url(),
        owner_id: guild.owner_id,
        member_count: guild.member_count,
        channel_count: guild.channels.len(),
        role_count: guild.roles.len(),
    });

    let Some(summary) = summary else {
        ctx.say("Server details are not available yet, try again in a moment.")
            .await?;
        return Ok(());
    };

    let created_at = guild_id.created_at().unix_timestamp();
    let mut embed = serenity::CreateEmbed::new()
        .title(format!("ℹ️ {}", summary.name))
        .color(DEFAULT_EMBED_COLOR)
        .field("Owner", format!("<@{}>", summary.owner_id.get()), true)
        .field("Members", format_thousands(summary.member_count), true)
        .field("Created", format!("<t:{created_at}:D>"), true)
        .field("Channels", summary.channel_count.to_string(), true)
        .field("Roles", summary.role_count.to_string(), true)
        .footer(serenity::CreateEmbedFooter::new(format!("ID: {}", guild_id.get())));

    if let Some(icon_url) = summary.icon_url {
        embed = embed.thumbnail(icon_url);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
