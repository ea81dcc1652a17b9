use poise::serenity_prelude as serenity;

use hearth_core::{Context, Error};
use hearth_utils::permissions::{
    check_moderation_target, has_user_permission, load_hierarchy_snapshot,
};

use crate::moderation::embeds::missing_bot_permission_message;

pub async fn ensure_invoker_permission(
    ctx: &Context<'_>,
    guild_id: serenity::GuildId,
    required: serenity::Permissions,
    label: &str,
) -> Result<bool, Error> {
    if !has_user_permission(ctx.http(), guild_id, ctx.author().id, required).await? {
        ctx.say(format!("You need the **{label}** permission to use this command."))
            .await?;
        return Ok(false);
    }

    Ok(true)
}

/// Check that both the invoker and the bot hold `required`, replying when not.
pub async fn ensure_permission(
    ctx: &Context<'_>,
    guild_id: serenity::GuildId,
    required: serenity::Permissions,
    label: &str,
) -> Result<bool, Error> {
    if !ensure_invoker_permission(ctx, guild_id, required, label).await? {
        return Ok(false);
    }

    let bot_id = ctx.framework().bot_id;
    if !has_user_permission(ctx.http(), guild_id, bot_id, required).await? {
        ctx.say(missing_bot_permission_message(label)).await?;
        return Ok(false);
    }

    Ok(true)
}

pub struct TargetRules {
    /// Refuse when the target is not in the guild.
    pub require_member: bool,
    pub reject_bot_accounts: bool,
}

/// Apply the role hierarchy rules to `target`, replying with the denial when refused.
pub async fn ensure_target_allowed(
    ctx: &Context<'_>,
    guild_id: serenity::GuildId,
    target: &serenity::User,
    action: &str,
    rules: TargetRules,
) -> Result<bool, Error> {
    let bot_id = ctx.framework().bot_id;
    let snapshot =
        load_hierarchy_snapshot(ctx.http(), guild_id, ctx.author().id, bot_id, target).await?;

    let Some(snapshot) = snapshot else {
        if rules.require_member {
            ctx.say("That user is not a member of this server.").await?;
            return Ok(false);
        }
        if target.id == ctx.author().id {
            ctx.say(format!("You can't {action} yourself.")).await?;
            return Ok(false);
        }
        return Ok(true);
    };

    if let Err(denial) = check_moderation_target(&snapshot, rules.reject_bot_accounts) {
        ctx.say(denial.message(action)).await?;
        return Ok(false);
    }

    Ok(true)
}
