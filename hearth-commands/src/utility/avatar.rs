use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::utility::embeds::avatar_download_links;
use hearth_core::{Context, Error};
use hearth_utils::embed::DEFAULT_EMBED_COLOR;

pub const META: CommandMeta = CommandMeta {
    name: "avatar",
    desc: "Show a user's avatar in full size.",
    category: "utility",
    usage: "!avatar [user]",
};

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn avatar(
    ctx: Context<'_>,
    #[description = "User whose avatar to show (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let user = user.unwrap_or_else(|| ctx.author().clone());

    // Server-specific avatar first, when the user has one here.
    let url = match ctx.guild_id() {
        Some(guild_id) => guild_id
            .member(ctx.http(), user.id)
            .await
            .map_or_else(|_| user.face(), |member| member.face()),
        None => user.face(),
    };

    let embed = serenity::CreateEmbed::new()
        .author(serenity::CreateEmbedAuthor::new(format!("Avatar of {}", user.tag())).icon_url(&url))
        .description(avatar_download_links(&url))
        .image(&url)
        .color(DEFAULT_EMBED_COLOR)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Requested by {}",
            ctx.author().tag()
        )));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
