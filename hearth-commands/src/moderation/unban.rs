use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    fetch_target_profile, guild_only_message, is_missing_permissions_error, is_unknown_ban_error,
    moderation_action_embed, usage_message,
};
use crate::moderation::guard::ensure_permission;
use crate::moderation::logging::{ModerationLog, publish_moderation_log};
use hearth_core::{Context, Error};
use hearth_utils::parse::parse_snowflake;

pub const META: CommandMeta = CommandMeta {
    name: "unban",
    desc: "Unban a user by id.",
    category: "moderation",
    usage: "!unban <user_id> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn unban(
    ctx: Context<'_>,
    #[description = "Id of the banned user"] user_id: Option<String>,
    #[description = "Reason for the unban"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_permission(&ctx, guild_id, serenity::Permissions::BAN_MEMBERS, "Ban Members").await? {
        return Ok(());
    }

    let Some(raw_id) = user_id else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let Some(id) = parse_snowflake(raw_id.trim_start_matches("<@").trim_end_matches('>')) else {
        ctx.say("That doesn't look like a valid user id (17 to 20 digits).")
            .await?;
        return Ok(());
    };
    let target_id = serenity::UserId::new(id);

    match guild_id.get_ban(ctx.http(), target_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            ctx.say("That user is not currently banned in this server.")
                .await?;
            return Ok(());
        }
        Err(source) if is_unknown_ban_error(&source) => {
            ctx.say("That user is not currently banned in this server.")
                .await?;
            return Ok(());
        }
        Err(source) => {
            if !is_missing_permissions_error(&source) {
                error!(?source, "ban lookup failed");
            }
            ctx.say("I couldn't check the ban list. Check my permissions.")
                .await?;
            return Ok(());
        }
    }

    if let Err(source) = guild_id.unban(ctx.http(), target_id).await {
        if !is_missing_permissions_error(&source) {
            error!(?source, "unban request failed");
        }
        ctx.say("I couldn't unban that user. Check my permissions.")
            .await?;
        return Ok(());
    }

    publish_moderation_log(
        &ctx,
        guild_id,
        ModerationLog::member("Unban", target_id, reason.as_deref()),
    )
    .await;

    let target_profile = fetch_target_profile(ctx.http(), target_id).await;
    let embed = moderation_action_embed(
        &target_profile,
        target_id,
        "unbanned",
        reason.as_deref(),
        None,
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
