use std::future::Future;

use tokio::time::{Duration, sleep};

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{guild_only_message, usage_message};
use crate::moderation::guard::ensure_permission;
use crate::moderation::logging::{ModerationLog, publish_moderation_log};
use hearth_core::{Context, Error};
use hearth_utils::cleanup::{DeletionReport, delete_messages};

pub const META: CommandMeta = CommandMeta {
    name: "clearmessages",
    desc: "Delete recent messages, optionally only from one user.",
    category: "moderation",
    usage: "!clearmessages <amount 1-100> [user]",
};

const MAX_CLEAR: u8 = 100;
const CONFIRMATION_LIFETIME: Duration = Duration::from_secs(10);

/// How many messages to fetch so that filtering by author still finds `amount`.
fn fetch_limit(amount: u8) -> u8 {
    amount.saturating_mul(2).min(MAX_CLEAR)
}

/// Run `delete` once the confirmation has been visible for `lifetime`.
async fn expire_confirmation<T>(lifetime: Duration, delete: impl Future<Output = T>) {
    sleep(lifetime).await;
    let _ = delete.await;
}

fn summary_message(report: DeletionReport, target: Option<&serenity::User>) -> String {
    let scope = match target {
        Some(user) => format!(" from <@{}>", user.id.get()),
        None => String::new(),
    };

    if report.failed == 0 {
        format!("Deleted {} message(s){scope}.", report.deleted)
    } else {
        format!(
            "Deleted {} message(s){scope}; {} could not be deleted.",
            report.deleted, report.failed
        )
    }
}

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn clearmessages(
    ctx: Context<'_>,
    #[description = "Number of messages to delete (1-100)"] amount: Option<u8>,
    #[description = "Only delete messages from this user"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_permission(
        &ctx,
        guild_id,
        serenity::Permissions::MANAGE_MESSAGES,
        "Manage Messages",
    )
    .await?
    {
        return Ok(());
    }

    let Some(amount) = amount else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if !(1..=MAX_CLEAR).contains(&amount) {
        ctx.say("Amount must be between 1 and 100.").await?;
        return Ok(());
    }

    ctx.defer_ephemeral().await?;

    let channel_id = ctx.channel_id();
    let mut request = serenity::GetMessages::new().limit(fetch_limit(amount));
    if let poise::Context::Prefix(prefix) = ctx {
        request = request.before(prefix.msg.id);
    }

    let messages = channel_id.messages(ctx.http(), request).await?;
    let targets: Vec<serenity::Message> = messages
        .into_iter()
        .filter(|message| user.as_ref().is_none_or(|user| message.author.id == user.id))
        .take(usize::from(amount))
        .collect();

    if targets.is_empty() {
        ctx.say("No matching messages found to delete.").await?;
        return Ok(());
    }

    let report = delete_messages(ctx.http(), channel_id, &targets).await;

    let mut log = ModerationLog::channel("Messages cleared", channel_id, None);
    log.target_user_id = user.as_ref().map(|user| user.id);
    log.detail = Some(format!("**Deleted :** {}", report.deleted));
    publish_moderation_log(&ctx, guild_id, log).await;

    let summary = summary_message(report, user.as_ref());
    match ctx {
        poise::Context::Application(_) => {
            let reply = ctx.say(summary).await?;
            expire_confirmation(CONFIRMATION_LIFETIME, reply.delete(ctx)).await;
        }
        poise::Context::Prefix(_) => {
            let notice = channel_id.say(ctx.http(), summary).await?;
            let http = ctx.serenity_context().http.clone();
            tokio::spawn(async move {
                expire_confirmation(CONFIRMATION_LIFETIME, notice.delete(&*http)).await;
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use hearth_utils::cleanup::DeletionReport;
    use tokio::time::Duration;

    use super::{CONFIRMATION_LIFETIME, expire_confirmation, fetch_limit, summary_message};

    #[test]
    fn fetches_double_up_to_the_cap() {
        assert_eq!(fetch_limit(1), 2);
        assert_eq!(fetch_limit(40), 80);
        assert_eq!(fetch_limit(60), 100);
        assert_eq!(fetch_limit(100), 100);
    }

    #[test]
    fn summary_mentions_failures() {
        let clean = summary_message(DeletionReport { deleted: 5, failed: 0 }, None);
        assert_eq!(clean, "Deleted 5 message(s).");

        let partial = summary_message(DeletionReport { deleted: 3, failed: 2 }, None);
        assert!(partial.ends_with("2 could not be deleted."));
    }

    #[tokio::test]
    async fn confirmation_is_deleted_only_after_its_lifetime() {
        assert_eq!(CONFIRMATION_LIFETIME, Duration::from_secs(10));

        let deleted = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&deleted);
        let expiry = tokio::spawn(expire_confirmation(Duration::from_millis(50), async move {
            flag.store(true, Ordering::SeqCst);
        }));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!deleted.load(Ordering::SeqCst));

        expiry.await.unwrap();
        assert!(deleted.load(Ordering::SeqCst));
    }
}
