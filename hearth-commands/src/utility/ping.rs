use std::time::Instant;

use crate::CommandMeta;
use crate::utility::embeds::ping_message;
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "ping",
    desc: "Show the bot's latency.",
    category: "utility",
    usage: "!ping",
};

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let started = Instant::now();
    let reply = ctx.say("Pong! 🏓").await?;
    let round_trip = started.elapsed();
    let gateway = ctx.ping().await;

    reply
        .edit(
            ctx,
            poise::CreateReply::default().content(ping_message(gateway, round_trip)),
        )
        .await?;
    Ok(())
}
