use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    guild_only_message, is_missing_permissions_error, moderation_action_embed,
    send_moderation_target_dm_for_guild, target_profile_from_user, usage_message,
};
use crate::moderation::guard::{TargetRules, ensure_permission, ensure_target_allowed};
use crate::moderation::logging::{ModerationLog, publish_moderation_log};
use hearth_core::{Context, Error};
use hearth_utils::formatting::format_long_duration;
use hearth_utils::parse::parse_duration_seconds;
use hearth_utils::time::now_unix_secs;

pub const META: CommandMeta = CommandMeta {
    name: "timeout",
    desc: "Timeout a member for a duration (default: 10m).",
    category: "moderation",
    usage: "!timeout <user> [duration] [reason]",
};

const DEFAULT_TIMEOUT_SECS: u64 = 10 * 60;
const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 28 * 24 * 60 * 60;

fn is_unit_duration_token(raw: &str) -> bool {
    raw.chars().any(|ch| ch.is_ascii_alphabetic()) && parse_duration_seconds(raw).is_some()
}

/// Split `10m 30s spamming links` into the duration part and the reason.
///
/// The first argument may be any duration; when it carries a unit, following
/// tokens keep extending it while they carry one too. Plain seconds never
/// combine. `--` forces the rest into the reason.
fn split_duration_and_reason(
    duration: Option<&str>,
    reason: Option<&str>,
) -> (Option<String>, Option<String>) {
    let mut duration_parts = Vec::new();
    let mut reason_tokens = Vec::new();

    let mut collect_more_duration = false;
    match duration.map(str::trim).filter(|value| !value.is_empty()) {
        Some(first) if parse_duration_seconds(first).is_some() => {
            collect_more_duration = is_unit_duration_token(first);
            duration_parts.push(first.to_owned());
        }
        Some(first) => reason_tokens.push(first.to_owned()),
        None => {}
    }

    if let Some(rest) = reason {
        let mut tokens = rest.split_whitespace();

        while let Some(token) = tokens.next() {
            if token == "--" {
                reason_tokens.extend(tokens.map(str::to_owned));
                break;
            }

            if collect_more_duration && reason_tokens.is_empty() && is_unit_duration_token(token) {
                duration_parts.push(token.to_owned());
                continue;
            }

            reason_tokens.push(token.to_owned());
            reason_tokens.extend(tokens.map(str::to_owned));
            break;
        }
    }

    let duration = (!duration_parts.is_empty()).then(|| duration_parts.join(" "));
    let reason = (!reason_tokens.is_empty()).then(|| reason_tokens.join(" "));
    (duration, reason)
}

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn timeout(
    ctx: Context<'_>,
    #[description = "The member to timeout"] user: Option<serenity::User>,
    #[description = "Duration (e.g. 30s, 10m, 2h, 1d)"] duration: Option<String>,
    #[description = "Reason for the timeout"]
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

    let rules = TargetRules {
        require_member: true,
        reject_bot_accounts: true,
    };
    if !ensure_target_allowed(&ctx, guild_id, &user, "timeout", rules).await? {
        return Ok(());
    }

    let (duration_input, parsed_reason) =
        split_duration_and_reason(duration.as_deref(), reason.as_deref());

    let seconds = match duration_input.as_deref() {
        Some(raw) => {
            let Some(seconds) = parse_duration_seconds(raw) else {
                ctx.say(format!(
                    "Invalid duration. Usage: `{}` (examples: 30s, 10m, 2h, 1d)",
                    META.usage
                ))
                .await?;
                return Ok(());
            };
            seconds
        }
        None => DEFAULT_TIMEOUT_SECS,
    };

    if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&seconds) {
        ctx.say("Timeouts must be between 5 seconds and 28 days.").await?;
        return Ok(());
    }

    let now = now_unix_secs();
    let already_timed_out = guild_id
        .member(ctx.http(), user.id)
        .await
        .ok()
        .and_then(|member| member.communication_disabled_until)
        .is_some_and(|until| until.unix_timestamp() > now as i64);

    let until = serenity::Timestamp::from_unix_timestamp((now + seconds) as i64)?;
    let edit = serenity::EditMember::new()
        .disable_communication_until_datetime(until)
        .audit_log_reason(parsed_reason.as_deref().unwrap_or("No reason provided"));

    if let Err(source) = guild_id.edit_member(ctx.http(), user.id, edit).await {
        if !is_missing_permissions_error(&source) {
            error!(?source, "timeout request failed");
        }
        ctx.say("I couldn't timeout that user. Check role hierarchy and permissions.")
            .await?;
        return Ok(());
    }

    let duration_label = format_long_duration(seconds);
    let action = if already_timed_out { "given an updated timeout" } else { "timed out" };

    let _ = send_moderation_target_dm_for_guild(
        ctx.http(),
        &user,
        guild_id,
        action,
        parsed_reason.as_deref(),
        Some(&duration_label),
    )
    .await;

    let mut log = ModerationLog::member(
        if already_timed_out { "Timeout updated" } else { "Timeout" },
        user.id,
        parsed_reason.as_deref(),
    );
    log.duration_seconds = Some(seconds);
    publish_moderation_log(&ctx, guild_id, log).await;

    let target_profile = target_profile_from_user(&user);
    let embed = moderation_action_embed(
        &target_profile,
        user.id,
        action,
        parsed_reason.as_deref(),
        Some(&duration_label),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use hearth_utils::parse::parse_duration_seconds;

    use super::split_duration_and_reason;

    #[test]
    fn joins_compound_durations() {
        let (duration, reason) = split_duration_and_reason(Some("1h"), Some("30m spamming links"));
        assert_eq!(duration.as_deref(), Some("1h 30m"));
        assert_eq!(reason.as_deref(), Some("spamming links"));
    }

    #[test]
    fn non_duration_first_argument_becomes_reason() {
        let (duration, reason) = split_duration_and_reason(Some("being"), Some("rude 10m"));
        assert_eq!(duration, None);
        assert_eq!(reason.as_deref(), Some("being rude 10m"));
    }

    #[test]
    fn double_dash_ends_duration() {
        let (duration, reason) = split_duration_and_reason(Some("10m"), Some("-- 5m late"));
        assert_eq!(duration.as_deref(), Some("10m"));
        assert_eq!(reason.as_deref(), Some("5m late"));
    }

    #[test]
    fn bare_seconds_are_a_duration() {
        let (duration, reason) = split_duration_and_reason(Some("90"), None);
        assert_eq!(duration.as_deref(), Some("90"));
        assert_eq!(reason, None);
    }

    #[test]
    fn bare_seconds_leave_unit_tokens_in_the_reason() {
        let (duration, reason) = split_duration_and_reason(Some("90"), Some("5m spam"));
        assert_eq!(duration.as_deref(), Some("90"));
        assert_eq!(reason.as_deref(), Some("5m spam"));
        assert_eq!(duration.as_deref().and_then(parse_duration_seconds), Some(90));
    }
}
