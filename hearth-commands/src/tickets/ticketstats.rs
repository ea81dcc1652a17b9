use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::{ensure_invoker_permission, guild_only_message};
use crate::tickets::embeds::stats_embed;
use hearth_core::{Context, Error};
use hearth_database::impls::tickets::{get_ticket_stats, list_tickets};

pub const META: CommandMeta = CommandMeta {
    name: "ticketstats",
    desc: "Show ticket counters for this server.",
    category: "tickets",
    usage: "!ticketstats",
};

#[poise::command(prefix_command, slash_command, category = "Tickets")]
pub async fn ticketstats(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_invoker_permission(&ctx, guild_id, serenity::Permissions::ADMINISTRATOR, "Administrator")
        .await?
    {
        return Ok(());
    }

    let db = &ctx.data().db;
    let stats = get_ticket_stats(db, guild_id.get()).await?;
    let active = list_tickets(db, guild_id.get()).await?.len();

    ctx.send(poise::CreateReply::default().embed(stats_embed(&stats, active)))
        .await?;
    Ok(())
}
