use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::{ensure_invoker_permission, guild_only_message};
use crate::tickets::embeds::{MAX_LIST_FIELDS, ticket_list_field};
use hearth_core::{Context, Error};
use hearth_database::impls::tickets::list_tickets;
use hearth_utils::embed::DEFAULT_EMBED_COLOR;

pub const META: CommandMeta = CommandMeta {
    name: "tickets",
    desc: "List the server's tickets.",
    category: "tickets",
    usage: "!tickets",
};

#[poise::command(prefix_command, slash_command, category = "Tickets")]
pub async fn tickets(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_invoker_permission(&ctx, guild_id, serenity::Permissions::ADMINISTRATOR, "Administrator")
        .await?
    {
        return Ok(());
    }

    let records = list_tickets(&ctx.data().db, guild_id.get()).await?;
    if records.is_empty() {
        ctx.say("📭 No active tickets.").await?;
        return Ok(());
    }

    let channels = guild_id.channels(ctx.http()).await?;
    let fields: Vec<(String, String, bool)> = records
        .iter()
        .filter_map(|ticket| {
            let channel = channels.get(&serenity::ChannelId::new(ticket.channel_id))?;
            let (name, value) = ticket_list_field(ticket, &channel.name);
            Some((name, value, true))
        })
        .take(MAX_LIST_FIELDS)
        .collect();

    let embed = serenity::CreateEmbed::new()
        .title("🎫 Tickets")
        .color(DEFAULT_EMBED_COLOR)
        .fields(fields)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Total: {} tickets",
            records.len()
        )))
        .timestamp(serenity::Timestamp::now());

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
