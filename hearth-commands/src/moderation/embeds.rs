use poise::serenity_prelude as serenity;

use hearth_utils::embed::DEFAULT_EMBED_COLOR;
use hearth_utils::formatting::escape_mentions;

pub const NO_REASON: &str = "No reason provided";

#[derive(Clone, Debug)]
pub struct TargetProfile {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

pub fn target_profile_from_user(user: &serenity::User) -> TargetProfile {
    TargetProfile {
        display_name: user
            .global_name
            .clone()
            .unwrap_or_else(|| user.name.clone()),
        avatar_url: Some(user.face()),
    }
}

pub async fn fetch_target_profile(
    http: &serenity::Http,
    user_id: serenity::UserId,
) -> TargetProfile {
    match http.get_user(user_id).await {
        Ok(user) => target_profile_from_user(&user),
        Err(_) => TargetProfile {
            display_name: format!("User {}", user_id.get()),
            avatar_url: None,
        },
    }
}

pub fn moderation_action_embed(
    target_profile: &TargetProfile,
    target_user_id: serenity::UserId,
    action_past_tense: &str,
    reason: Option<&str>,
    duration: Option<&str>,
) -> serenity::CreateEmbed {
    let mut lines = vec![
        format!("**Target :** <@{}>", target_user_id.get()),
        format!("**Reason :** {}", escape_mentions(reason.unwrap_or(NO_REASON))),
    ];
    if let Some(duration) = duration {
        lines.push(format!("**Duration :** {duration}"));
    }

    let heading = format!("{} has been {}", target_profile.display_name, action_past_tense);
    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(lines.join("\n"));

    match target_profile.avatar_url.as_deref() {
        Some(url) => embed.author(serenity::CreateEmbedAuthor::new(heading).icon_url(url)),
        None => embed.title(heading),
    }
}

/// Reply embed for actions on a channel rather than a member.
pub fn channel_action_embed(
    channel_id: serenity::ChannelId,
    heading: &str,
    reason: Option<&str>,
    detail: Option<&str>,
) -> serenity::CreateEmbed {
    let mut lines = vec![format!("**Channel :** <#{}>", channel_id.get())];
    if let Some(detail) = detail {
        lines.push(detail.to_owned());
    }
    lines.push(format!("**Reason :** {}", escape_mentions(reason.unwrap_or(NO_REASON))));

    serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title(heading)
        .description(lines.join("\n"))
}

pub fn moderation_target_dm_embed(
    guild_name: &str,
    action_past_tense: &str,
    reason: Option<&str>,
    duration: Option<&str>,
) -> serenity::CreateEmbed {
    let mut details = Vec::new();

    if let Some(reason) = reason {
        details.push(format!("**Reason :** {}", escape_mentions(reason)));
    }

    if let Some(duration) = duration {
        details.push(format!("**Duration :** {}", duration));
    }

    let description = if details.is_empty() {
        "No additional details were provided.".to_owned()
    } else {
        details.join("\n")
    };

    serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .title(format!(
            "You have been {} in {}",
            action_past_tense, guild_name
        ))
        .description(description)
}

/// Best-effort DM to the member being moderated.
pub async fn send_moderation_target_dm_for_guild(
    http: &serenity::Http,
    target_user: &serenity::User,
    guild_id: serenity::GuildId,
    action_past_tense: &str,
    reason: Option<&str>,
    duration: Option<&str>,
) -> Result<(), serenity::Error> {
    let guild_name = match guild_id.to_partial_guild(http).await {
        Ok(guild) => guild.name,
        Err(_) => format!("Server {}", guild_id.get()),
    };

    let dm_channel = target_user.create_dm_channel(http).await?;
    dm_channel
        .send_message(
            http,
            serenity::CreateMessage::new().embed(moderation_target_dm_embed(
                &guild_name,
                action_past_tense,
                reason,
                duration,
            )),
        )
        .await?;

    Ok(())
}

pub fn usage_message(usage: &str) -> String {
    format!("Usage: `{usage}`")
}

pub fn guild_only_message() -> &'static str {
    "This command only works in servers."
}

pub fn missing_bot_permission_message(permission: &str) -> String {
    format!("I need the **{permission}** permission to do that.")
}

pub fn is_missing_permissions_error(source: &serenity::Error) -> bool {
    matches!(
        source,
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 403 || response.error.code == 50013
    )
}

pub fn is_unknown_ban_error(source: &serenity::Error) -> bool {
    matches!(
        source,
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response))
            if response.error.code == 10026
    )
}

#[cfg(test)]
mod tests {
    use super::{missing_bot_permission_message, usage_message};

    #[test]
    fn usage_is_wrapped_in_code() {
        assert_eq!(usage_message("!ban <user>"), "Usage: `!ban <user>`");
    }

    #[test]
    fn bot_permission_message_names_the_permission() {
        assert_eq!(
            missing_bot_permission_message("Ban Members"),
            "I need the **Ban Members** permission to do that."
        );
    }
}
