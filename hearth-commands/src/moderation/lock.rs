use tracing::error;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    channel_action_embed, guild_only_message, is_missing_permissions_error,
};
use crate::moderation::guard::ensure_permission;
use crate::moderation::logging::{ModerationLog, publish_moderation_log};
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "lock",
    desc: "Stop @everyone from sending messages in a channel.",
    category: "moderation",
    usage: "!lock [#channel] [reason]",
};

/// Which way a lock command moves the @everyone overwrite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LockChange {
    Lock,
    Unlock,
}

#[derive(Clone, Debug)]
pub(crate) enum OverwriteUpdate {
    Set(serenity::PermissionOverwrite),
    /// Nothing is left in the overwrite.
    Remove(serenity::PermissionOverwriteType),
}

/// Update to apply, or `None` when the channel is already in the wanted state.
pub(crate) fn next_everyone_overwrite(
    existing: Option<&serenity::PermissionOverwrite>,
    everyone: serenity::RoleId,
    change: LockChange,
) -> Option<OverwriteUpdate> {
    let kind = serenity::PermissionOverwriteType::Role(everyone);
    let (allow, deny) = existing
        .map(|overwrite| (overwrite.allow, overwrite.deny))
        .unwrap_or((serenity::Permissions::empty(), serenity::Permissions::empty()));
    let locked = deny.contains(serenity::Permissions::SEND_MESSAGES);

    match change {
        LockChange::Lock if locked => None,
        LockChange::Unlock if !locked => None,
        LockChange::Lock => Some(OverwriteUpdate::Set(serenity::PermissionOverwrite {
            allow: allow - serenity::Permissions::SEND_MESSAGES,
            deny: deny | serenity::Permissions::SEND_MESSAGES,
            kind,
        })),
        LockChange::Unlock => {
            let deny = deny - serenity::Permissions::SEND_MESSAGES;
            if allow.is_empty() && deny.is_empty() {
                Some(OverwriteUpdate::Remove(kind))
            } else {
                Some(OverwriteUpdate::Set(serenity::PermissionOverwrite { allow, deny, kind }))
            }
        }
    }
}

pub(crate) async fn apply_lock_change(
    ctx: Context<'_>,
    channel: Option<serenity::GuildChannel>,
    reason: Option<String>,
    change: LockChange,
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

    let channel = match channel {
        Some(channel) => channel,
        None => match ctx.channel_id().to_channel(ctx.http()).await?.guild() {
            Some(channel) => channel,
            None => {
                ctx.say(guild_only_message()).await?;
                return Ok(());
            }
        },
    };

    if channel.guild_id != guild_id {
        ctx.say("That channel isn't in this server.").await?;
        return Ok(());
    }

    let everyone = serenity::RoleId::new(guild_id.get());
    let existing = channel.permission_overwrites.iter().find(|overwrite| {
        overwrite.kind == serenity::PermissionOverwriteType::Role(everyone)
    });

    let Some(next) = next_everyone_overwrite(existing, everyone, change) else {
        let message = match change {
            LockChange::Lock => format!("<#{}> is already locked.", channel.id.get()),
            LockChange::Unlock => format!("<#{}> is not locked.", channel.id.get()),
        };
        ctx.say(message).await?;
        return Ok(());
    };

    let result = match next {
        OverwriteUpdate::Set(overwrite) => channel.id.create_permission(ctx.http(), overwrite).await,
        OverwriteUpdate::Remove(kind) => channel.id.delete_permission(ctx.http(), kind).await,
    };

    if let Err(source) = result {
        if !is_missing_permissions_error(&source) {
            error!(?source, channel_id = channel.id.get(), "channel lock update failed");
        }
        ctx.say("I couldn't update that channel's permissions. Check my permissions.")
            .await?;
        return Ok(());
    }

    let heading = match change {
        LockChange::Lock => "Channel locked",
        LockChange::Unlock => "Channel unlocked",
    };

    publish_moderation_log(
        &ctx,
        guild_id,
        ModerationLog::channel(heading, channel.id, reason.as_deref()),
    )
    .await;

    let embed = channel_action_embed(channel.id, heading, reason.as_deref(), None);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn lock(
    ctx: Context<'_>,
    #[description = "Channel to lock (defaults to this one)"] channel: Option<serenity::GuildChannel>,
    #[description = "Reason for the lock"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    apply_lock_change(ctx, channel, reason, LockChange::Lock).await
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::{LockChange, OverwriteUpdate, next_everyone_overwrite};

    const EVERYONE: serenity::RoleId = serenity::RoleId::new(99);

    fn overwrite(allow: serenity::Permissions, deny: serenity::Permissions) -> serenity::PermissionOverwrite {
        serenity::PermissionOverwrite {
            allow,
            deny,
            kind: serenity::PermissionOverwriteType::Role(EVERYONE),
        }
    }

    #[test]
    fn lock_denies_send_and_drops_explicit_allow() {
        let existing = overwrite(
            serenity::Permissions::SEND_MESSAGES | serenity::Permissions::ADD_REACTIONS,
            serenity::Permissions::empty(),
        );
        let Some(OverwriteUpdate::Set(next)) = next_everyone_overwrite(Some(&existing), EVERYONE, LockChange::Lock) else {
            panic!("expected an overwrite");
        };
        assert_eq!(next.allow, serenity::Permissions::ADD_REACTIONS);
        assert_eq!(next.deny, serenity::Permissions::SEND_MESSAGES);
    }

    #[test]
    fn already_locked_is_reported() {
        let existing = overwrite(serenity::Permissions::empty(), serenity::Permissions::SEND_MESSAGES);
        assert!(next_everyone_overwrite(Some(&existing), EVERYONE, LockChange::Lock).is_none());
        assert!(next_everyone_overwrite(None, EVERYONE, LockChange::Unlock).is_none());
    }

    #[test]
    fn unlock_removes_empty_overwrite() {
        let existing = overwrite(serenity::Permissions::empty(), serenity::Permissions::SEND_MESSAGES);
        assert!(matches!(
            next_everyone_overwrite(Some(&existing), EVERYONE, LockChange::Unlock),
            Some(OverwriteUpdate::Remove(_))
        ));
    }

    #[test]
    fn unlock_keeps_other_denies() {
        let existing = overwrite(
            serenity::Permissions::empty(),
            serenity::Permissions::SEND_MESSAGES | serenity::Permissions::ATTACH_FILES,
        );
        let Some(OverwriteUpdate::Set(next)) = next_everyone_overwrite(Some(&existing), EVERYONE, LockChange::Unlock) else {
            panic!("expected an overwrite");
        };
        assert_eq!(next.deny, serenity::Permissions::ATTACH_FILES);
    }
}
