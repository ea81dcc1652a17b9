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
    name: "kick",
    desc: "Kick a member from the server.",
    category: "moderation",
    usage: "!kick <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "The member to kick"] user: Option<serenity::User>,
    #[description = "Reason for the kick"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_permission(&ctx, guild_id, serenity::Permissions::KICK_MEMBERS, "Kick Members").await? {
        return Ok(());
    }

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let rules = TargetRules {
        require_member: true,
        reject_bot_accounts: false,
    };
    if !ensure_target_allowed(&ctx, guild_id, &user, "kick", rules).await? {
        return Ok(());
    }

    let _ = send_moderation_target_dm_for_guild(
        ctx.http(),
        &user,
        guild_id,
        "kicked",
        reason.as_deref(),
        None,
    )
    .await;

    let kick_result = guild_id
        .kick_with_reason(ctx.http(), user.id, reason.as_deref().unwrap_or(NO_REASON))
        .await;

    if let Err(source) = kick_result {
        if !is_missing_permissions_error(&source) {
            error!(?source, "kick request failed");
        }
        ctx.say("I couldn't kick that user. Check role hierarchy and permissions.")
            .await?;
        return Ok(());
    }

    publish_moderation_log(
        &ctx,
        guild_id,
        ModerationLog::member("Kick", user.id, reason.as_deref()),
    )
    .await;

    let target_profile = target_profile_from_user(&user);
    let embed = moderation_action_embed(&target_profile, user.id, "kicked", reason.as_deref(), None);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
