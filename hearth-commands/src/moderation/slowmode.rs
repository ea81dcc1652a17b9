use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    NO_REASON, channel_action_embed, guild_only_message, is_missing_permissions_error,
    usage_message,
};
use crate::moderation::guard::ensure_permission;
use crate::moderation::logging::{ModerationLog, publish_moderation_log};
use hearth_core::{Context, Error};
use hearth_utils::formatting::format_long_duration;

pub const META: CommandMeta = CommandMeta {
    name: "slowmode",
    desc: "Set this channel's slowmode (0 disables).",
    category: "moderation",
    usage: "!slowmode <seconds 0-21600> [reason]",
};

pub const MAX_SLOWMODE_SECS: u16 = 21_600;

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn slowmode(
    ctx: Context<'_>,
    #[description = "Seconds between messages (0 disables)"] seconds: Option<u32>,
    #[description = "Reason for the change"]
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
        serenity::Permissions::MANAGE_CHANNELS,
        "Manage Channels",
    )
    .await?
    {
        return Ok(());
    }

    let Some(seconds) = seconds else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let Some(seconds) = u16::try_from(seconds)
        .ok()
        .filter(|value| *value <= MAX_SLOWMODE_SECS)
    else {
        ctx.say("Slowmode must be between 0 and 21600 seconds (6 hours).")
            .await?;
        return Ok(());
    };

    let channel_id = ctx.channel_id();
    let edit = serenity::EditChannel::new()
        .rate_limit_per_user(seconds)
        .audit_log_reason(reason.as_deref().unwrap_or(NO_REASON));

    if let Err(source) = channel_id.edit(ctx.http(), edit).await {
        if !is_missing_permissions_error(&source) {
            error!(?source, "slowmode update failed");
        }
        ctx.say("I couldn't change the slowmode here. Check my permissions.")
            .await?;
        return Ok(());
    }

    let (heading, detail) = if seconds == 0 {
        ("Slowmode disabled".to_owned(), None)
    } else {
        (
            "Slowmode enabled".to_owned(),
            Some(format!(
                "**Interval :** {}",
                format_long_duration(u64::from(seconds))
            )),
        )
    };

    let mut log = ModerationLog::channel(&heading, channel_id, reason.as_deref());
    log.detail = detail.clone();
    publish_moderation_log(&ctx, guild_id, log).await;

    let embed = channel_action_embed(channel_id, &heading, reason.as_deref(), detail.as_deref());
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
