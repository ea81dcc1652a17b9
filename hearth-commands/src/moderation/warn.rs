use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    NO_REASON, guild_only_message, moderation_action_embed, send_moderation_target_dm_for_guild,
    target_profile_from_user, usage_message,
};
use crate::moderation::guard::{TargetRules, ensure_invoker_permission, ensure_target_allowed};
use crate::moderation::logging::{ModerationLog, publish_moderation_log};
use hearth_core::{Context, Error};
use hearth_database::impls::warnings::record_warning;
use hearth_utils::time::now_unix_secs;

pub const META: CommandMeta = CommandMeta {
    name: "warn",
    desc: "Issue a warning to a member.",
    category: "moderation",
    usage: "!warn <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "The member to warn"] user: Option<serenity::User>,
    #[description = "Reason for the warning"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_invoker_permission(&ctx, guild_id, serenity::Permissions::KICK_MEMBERS, "Kick Members")
        .await?
    {
        return Ok(());
    }

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let rules = TargetRules {
        require_member: true,
        reject_bot_accounts: true,
    };
    if !ensure_target_allowed(&ctx, guild_id, &user, "warn", rules).await? {
        return Ok(());
    }

    let reason = reason.unwrap_or_else(|| NO_REASON.to_owned());
    let warning = record_warning(
        &ctx.data().db,
        guild_id.get(),
        user.id.get(),
        ctx.author().id.get(),
        &reason,
        now_unix_secs(),
    )
    .await?;

    let _ = send_moderation_target_dm_for_guild(
        ctx.http(),
        &user,
        guild_id,
        "warned",
        Some(&reason),
        None,
    )
    .await;

    let mut log = ModerationLog::member("Warn", user.id, Some(&reason));
    log.detail = Some(format!("**Total warnings :** {}", warning.total_warnings));
    publish_moderation_log(&ctx, guild_id, log).await;

    let target_profile = target_profile_from_user(&user);
    let embed = moderation_action_embed(&target_profile, user.id, "warned", Some(&reason), None)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Total warnings: {}",
            warning.total_warnings
        )));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
