use crate::CommandMeta;
use crate::moderation::guild_only_message;
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "clearqueue",
    desc: "Remove every upcoming song, keeping the current one.",
    category: "music",
    usage: "!clearqueue",
};

#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn clearqueue(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let reply = match ctx.data().music.clear_upcoming(guild_id).await {
        Ok(0) => "There are no upcoming songs to remove.".to_owned(),
        Ok(removed) => format!("Removed **{removed}** songs from the queue."),
        Err(reason) => reason.to_string(),
    };

    ctx.say(reply).await?;
    Ok(())
}
