use tracing::error;

use poise::serenity_prelude as serenity;

use hearth_core::Context;
use hearth_database::impls::guild_settings::get_guild_settings;
use hearth_utils::embed::DEFAULT_EMBED_COLOR;
use hearth_utils::formatting::{escape_mentions, format_compact_duration};
use hearth_utils::time::{discord_timestamp_pair, now_unix_secs};

use crate::moderation::embeds::NO_REASON;

/// One moderation action as shown in the modlog channel.
pub struct ModerationLog<'a> {
    pub action: &'a str,
    pub target_user_id: Option<serenity::UserId>,
    pub channel_id: Option<serenity::ChannelId>,
    pub reason: Option<&'a str>,
    pub duration_seconds: Option<u64>,
    pub detail: Option<String>,
}

impl<'a> ModerationLog<'a> {
    pub fn member(action: &'a str, target: serenity::UserId, reason: Option<&'a str>) -> Self {
        Self {
            action,
            target_user_id: Some(target),
            channel_id: None,
            reason,
            duration_seconds: None,
            detail: None,
        }
    }

    pub fn channel(action: &'a str, channel: serenity::ChannelId, reason: Option<&'a str>) -> Self {
        Self {
            action,
            target_user_id: None,
            channel_id: Some(channel),
            reason,
            duration_seconds: None,
            detail: None,
        }
    }
}

/// Post the action to the configured modlog channel, if any. Failures are logged only.
pub async fn publish_moderation_log(ctx: &Context<'_>, guild_id: serenity::GuildId, log: ModerationLog<'_>) {
    let settings = match get_guild_settings(&ctx.data().db, guild_id.get()).await {
        Ok(settings) => settings,
        Err(source) => {
            error!(?source, guild_id = guild_id.get(), "failed to read modlog channel config");
            return;
        }
    };

    let Some(channel_id) = settings.modlog_channel_id else {
        return;
    };

    let embed = modlog_embed(&log, ctx.author().id, now_unix_secs());
    if let Err(source) = serenity::ChannelId::new(channel_id)
        .send_message(ctx.http(), serenity::CreateMessage::new().embed(embed))
        .await
    {
        error!(
            ?source,
            channel_id,
            "failed to publish action to configured modlog channel"
        );
    }
}

fn modlog_embed(
    log: &ModerationLog<'_>,
    moderator_id: serenity::UserId,
    at: u64,
) -> serenity::CreateEmbed {
    let mut fields = vec![format!("**Action :** {}", log.action)];

    if let Some(target) = log.target_user_id {
        fields.push(format!("**Target :** <@{}>", target.get()));
    }
    if let Some(channel) = log.channel_id {
        fields.push(format!("**Channel :** <#{}>", channel.get()));
    }
    if let Some(detail) = log.detail.as_deref() {
        fields.push(detail.to_owned());
    }

    fields.push(format!(
        "**Reason :** {}",
        escape_mentions(log.reason.unwrap_or(NO_REASON))
    ));

    if let Some(duration_seconds) = log.duration_seconds {
        fields.push(format!(
            "**Duration :** {}",
            format_compact_duration(duration_seconds)
        ));
    }

    fields.push(format!("**Moderator :** <@{}>", moderator_id.get()));
    fields.push(format!("**When :** {}", discord_timestamp_pair(at)));

    serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title(log.action)
        .description(fields.join("\n"))
}
