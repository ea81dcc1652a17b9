use crate::CommandMeta;
use crate::moderation::guild_only_message;
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "stop",
    desc: "Stop the music, clear the queue and leave the voice channel.",
    category: "music",
    usage: "!stop",
};

#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if ctx.data().music.stop(guild_id).await {
        ctx.say("Stopped the music and cleared the queue.").await?;
    } else {
        ctx.say("Nothing is playing right now.").await?;
    }

    Ok(())
}
