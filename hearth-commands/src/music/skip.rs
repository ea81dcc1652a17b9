use crate::CommandMeta;
use crate::moderation::guild_only_message;
use hearth_core::{Context, Error};
use hearth_music::embeds::song_link;

pub const META: CommandMeta = CommandMeta {
    name: "skip",
    desc: "Skip to the next song in the queue.",
    category: "music",
    usage: "!skip",
};

#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    match ctx.data().music.skip(guild_id).await {
        Ok(skipped) => {
            ctx.say(format!("Skipped {}.", song_link(&skipped))).await?;
        }
        Err(reason) => {
            ctx.say(reason.to_string()).await?;
        }
    }

    Ok(())
}
