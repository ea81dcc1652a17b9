use crate::CommandMeta;
use crate::moderation::guild_only_message;
use crate::music::embeds::now_playing_status_embed;
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "nowplaying",
    desc: "Show the song that is currently playing.",
    category: "music",
    usage: "!nowplaying",
};

#[poise::command(prefix_command, slash_command, aliases("np"), category = "Music")]
pub async fn nowplaying(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let embed = ctx
        .data()
        .music
        .snapshot(guild_id)
        .await
        .and_then(|snapshot| now_playing_status_embed(&snapshot));

    match embed {
        Some(embed) => {
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        None => {
            ctx.say("Nothing is playing right now.").await?;
        }
    }

    Ok(())
}
