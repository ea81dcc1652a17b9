use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::{ensure_invoker_permission, guild_only_message};
use crate::tickets::maintenance::forget_missing_channels;
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "ticketcleanup",
    desc: "Forget tickets whose channel was deleted by hand.",
    category: "tickets",
    usage: "!ticketcleanup",
};

#[poise::command(prefix_command, slash_command, category = "Tickets")]
pub async fn ticketcleanup(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_invoker_permission(&ctx, guild_id, serenity::Permissions::ADMINISTRATOR, "Administrator")
        .await?
    {
        return Ok(());
    }

    let forgotten = forget_missing_channels(ctx.http(), &ctx.data().db, guild_id).await?;
    let reply = match forgotten {
        0 => "🧹 Every ticket still has its channel.".to_owned(),
        n => format!("🧹 Forgot {n} ticket(s) with missing channels."),
    };

    ctx.say(reply).await?;
    Ok(())
}
