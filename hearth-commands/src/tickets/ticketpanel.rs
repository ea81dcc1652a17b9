use tracing::warn;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::{ensure_invoker_permission, guild_only_message};
use crate::tickets::embeds::{panel_embed, panel_row};
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "ticketpanel",
    desc: "Post the ticket creation panel in this channel.",
    category: "tickets",
    usage: "!ticketpanel",
};

#[poise::command(prefix_command, slash_command, category = "Tickets")]
pub async fn ticketpanel(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_invoker_permission(&ctx, guild_id, serenity::Permissions::ADMINISTRATOR, "Administrator")
        .await?
    {
        return Ok(());
    }

    ctx.channel_id()
        .send_message(
            ctx.http(),
            serenity::CreateMessage::new()
                .embed(panel_embed())
                .components(vec![panel_row()]),
        )
        .await?;

    match ctx {
        poise::Context::Prefix(prefix) => {
            if let Err(source) = prefix.msg.delete(ctx.http()).await {
                warn!(?source, "failed to delete ticketpanel invocation");
            }
        }
        poise::Context::Application(_) => {
            ctx.send(
                poise::CreateReply::default()
                    .content("Ticket panel posted.")
                    .ephemeral(true),
            )
            .await?;
        }
    }

    Ok(())
}
