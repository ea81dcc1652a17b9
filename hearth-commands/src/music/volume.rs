use crate::CommandMeta;
use crate::moderation::{guild_only_message, usage_message};
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "volume",
    desc: "Set the playback volume (0-100).",
    category: "music",
    usage: "!volume <0-100>",
};

#[poise::command(prefix_command, slash_command, category = "Music")]
pub async fn volume(
    ctx: Context<'_>,
    #[description = "Volume from 0 to 100"] level: Option<i64>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let Some(level) = level else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let Some(percent) = u8::try_from(level).ok().filter(|percent| *percent <= 100) else {
        ctx.say("Volume must be between 0 and 100.").await?;
        return Ok(());
    };

    let reply = match ctx.data().music.set_volume(guild_id, percent).await {
        Ok(()) => format!("Volume set to **{percent}%**."),
        Err(reason) => reason.to_string(),
    };

    ctx.say(reply).await?;
    Ok(())
}
