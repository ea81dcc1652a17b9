use crate::CommandMeta;
use crate::moderation::guild_only_message;
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "pause",
    desc: "Pause or resume the current song.",
    category: "music",
    usage: "!pause",
};

#[poise::command(prefix_command, slash_command, aliases("resume"), category = "Music")]
pub async fn pause(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let reply = match ctx.data().music.toggle_pause(guild_id).await {
        Ok(true) => "Paused the music.".to_owned(),
        Ok(false) => "Resumed the music.".to_owned(),
        Err(reason) => reason.to_string(),
    };

    ctx.say(reply).await?;
    Ok(())
}
