use crate::CommandMeta;
use crate::moderation::guild_only_message;
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "shuffle",
    desc: "Shuffle the upcoming songs.",
    category: "music",
    usage: "!shuffle",
};

#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn shuffle(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let reply = match ctx.data().music.shuffle(guild_id).await {
        Ok(count) => format!("Shuffled **{count}** upcoming songs."),
        Err(reason) => reason.to_string(),
    };

    ctx.say(reply).await?;
    Ok(())
}
