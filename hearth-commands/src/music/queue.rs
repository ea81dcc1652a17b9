use crate::CommandMeta;
use crate::moderation::guild_only_message;
use crate::music::embeds::queue_embed;
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "queue",
    desc: "Show the upcoming songs.",
    category: "music",
    usage: "!queue",
};

#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let Some(snapshot) = ctx
        .data()
        .music
        .snapshot(guild_id)
        .await
        .filter(|snapshot| !snapshot.songs.is_empty())
    else {
        ctx.say("The queue is empty.").await?;
        return Ok(());
    };

    ctx.send(poise::CreateReply::default().embed(queue_embed(&snapshot)))
        .await?;
    Ok(())
}
