use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::leveling::embeds::level_card_embed;
use crate::moderation::guild_only_message;
use hearth_core::{Context, Error};
use hearth_database::impls::levels::{get_xp, member_rank};
use hearth_utils::leveling::LevelProgress;

pub const META: CommandMeta = CommandMeta {
    name: "level",
    desc: "Show your level card, or another member's.",
    category: "leveling",
    usage: "!level [user]",
};

#[poise::command(prefix_command, slash_command, category = "Leveling")]
pub async fn level(
    ctx: Context<'_>,
    #[description = "Member to look up"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let user = user.as_ref().unwrap_or_else(|| ctx.author());
    if user.bot {
        ctx.say("Bots don't earn XP.").await?;
        return Ok(());
    }

    let db = &ctx.data().db;
    let xp = get_xp(db, guild_id.get(), user.id.get()).await?;
    let rank = member_rank(db, guild_id.get(), user.id.get()).await?;

    let display_name = match guild_id.member(ctx.http(), user.id).await {
        Ok(member) => member.display_name().to_owned(),
        Err(_) => user.display_name().to_owned(),
    };

    let embed = level_card_embed(&display_name, &user.face(), &LevelProgress::for_xp(xp), rank);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
