use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    guild_only_message, is_missing_permissions_error, moderation_action_embed,
    send_moderation_target_dm_for_guild, target_profile_from_user, usage_message,
};
use crate::moderation::guard::ensure_permission;
use crate::moderation::logging::{ModerationLog, publish_moderation_log};
use hearth_core::{Context, Error};
use hearth_utils::time::now_unix_secs;

pub const META: CommandMeta = CommandMeta {
    name: "untimeout",
    desc: "Remove a member's timeout.",
    category: "moderation",
    usage: "!untimeout <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn untimeout(
    ctx: Context<'_>,
    #[description = "The member to untimeout"] user: Option<serenity::User>,
    #[description = "Reason for removing the timeout"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_permission(
        &ctx,
        guild_id,
        serenity::Permissions::MODERATE_MEMBERS,
        "Moderate Members",
    )
    .await?
    {
        return Ok(());
    }

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let Ok(member) = guild_id.member(ctx.http(), user.id).await else {
        ctx.say("That user is not a member of this server.").await?;
        return Ok(());
    };

    let timed_out = member
        .communication_disabled_until
        .is_some_and(|until| until.unix_timestamp() > now_unix_secs() as i64);
    if !timed_out {
        ctx.say("That member is not currently timed out.").await?;
        return Ok(());
    }

    let edit = serenity::EditMember::new().enable_communication();
    if let Err(source) = guild_id.edit_member(ctx.http(), user.id, edit).await {
        if !is_missing_permissions_error(&source) {
            error!(?source, "untimeout request failed");
        }
        ctx.say("I couldn't remove the timeout from that user. Check permissions.")
            .await?;
        return Ok(());
    }

    let _ = send_moderation_target_dm_for_guild(
        ctx.http(),
        &user,
        guild_id,
        "released from timeout",
        reason.as_deref(),
        None,
    )
    .await;

    publish_moderation_log(
        &ctx,
        guild_id,
        ModerationLog::member("Timeout removed", user.id, reason.as_deref()),
    )
    .await;

    let target_profile = target_profile_from_user(&user);
    let embed = moderation_action_embed(
        &target_profile,
        user.id,
        "released from timeout",
        reason.as_deref(),
        None,
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
