use tracing::debug;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::guild_only_message;
use crate::utility::embeds::role_mentions;
use hearth_core::{Context, Error};
use hearth_utils::embed::DEFAULT_EMBED_COLOR;

pub const META: CommandMeta = CommandMeta {
    name: "userinfo",
    desc: "Show profile details for a member.",
    category: "utility",
    usage: "!userinfo [user]",
};

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn userinfo(
    ctx: Context<'_>,
    #[description = "Member to inspect (defaults to you)"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let user = user.unwrap_or_else(|| ctx.author().clone());
    let member = match guild_id.member(ctx.http(), user.id).await {
        Ok(member) => member,
        Err(source) => {
            debug!(?source, user_id = user.id.get(), "userinfo member lookup failed");
            ctx.say("❌ That user is not a member of this server.").await?;
            return Ok(());
        }
    };

    let guild_roles = guild_id.roles(ctx.http()).await?;
    let roles = member
        .roles
        .iter()
        .filter_map(|role_id| guild_roles.get(role_id).map(|role| (*role_id, role.position)))
        .collect::<Vec<_>>();

    let created_at = user.id.created_at().unix_timestamp();
    let joined = member
        .joined_at
        .map_or_else(|| "Unknown".to_owned(), |joined| format!("<t:{}:d>", joined.unix_timestamp()));

    let embed = serenity::CreateEmbed::new()
        .author(serenity::CreateEmbedAuthor::new(format!("Profile of {}", user.tag())).icon_url(member.face()))
        .thumbnail(member.face())
        .color(DEFAULT_EMBED_COLOR)
        .field("ID", user.id.get().to_string(), true)
        .field("Nickname", member.nick.as_deref().unwrap_or("None"), true)
        .field("Bot", if user.bot { "Yes" } else { "No" }, true)
        .field(format!("Roles ({})", roles.len()), role_mentions(roles), false)
        .field(
            "Dates",
            format!("Account created: <t:{created_at}:d>\nJoined: {joined}"),
            true,
        )
        .footer(
            serenity::CreateEmbedFooter::new(format!("Requested by {}", ctx.author().tag()))
                .icon_url(ctx.author().face()),
        );

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
