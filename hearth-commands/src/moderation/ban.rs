use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    NO_REASON, guild_only_message, is_missing_permissions_error, moderation_action_embed,
    send_moderation_target_dm_for_guild, target_profile_from_user, usage_message,
};
use crate::moderation::guard::{TargetRules, ensure_permission, ensure_target_allowed};
use crate::moderation::logging::{ModerationLog, publish_moderation_log};
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "ban",
    desc: "Ban a user from the server.",
    category: "moderation",
    usage: "!ban <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "The user to ban"] user: Option<serenity::User>,
    #[description = "Reason for the ban"]
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

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let rules = TargetRules {
        require_member: false,
        reject_bot_accounts: false,
    };
    if !ensure_target_allowed(&ctx, guild_id, &user, "ban", rules).await? {
        return Ok(());
    }

    // DM first: once banned the user usually shares no server with the bot.
    let _ = send_moderation_target_dm_for_guild(
        ctx.http(),
        &user,
        guild_id,
        "banned",
        reason.as_deref(),
        None,
    )
    .await;

    let ban_result = guild_id
        .ban_with_reason(ctx.http(), user.id, 0, reason.as_deref().unwrap_or(NO_REASON))
        .await;

    if let Err(source) = ban_result {
        if !is_missing_permissions_error(&source) {
            error!(?source, "ban request failed");
        }
        ctx.say("I couldn't ban that user. Check role hierarchy and permissions.")
            .await?;
        return Ok(());
    }

    publish_moderation_log(
        &ctx,
        guild_id,
        ModerationLog::member("Ban", user.id, reason.as_deref()),
    )
    .await;

    let target_profile = target_profile_from_user(&user);
    let embed = moderation_action_embed(&target_profile, user.id, "banned", reason.as_deref(), None);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
