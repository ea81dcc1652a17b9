use tracing::{info, warn};

use poise::serenity_prelude as serenity;

use hearth_database::Database;
use hearth_database::impls::tickets::{closed_tickets_before, list_tickets, remove_ticket};

const UNKNOWN_CHANNEL: isize = 10003;

fn is_unknown_channel(source: &serenity::Error) -> bool {
    matches!(
        source,
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response))
            if response.error.code == UNKNOWN_CHANNEL
    )
}

/// Delete closed ticket channels closed at or before `cutoff`, returning how many were removed.
pub async fn delete_expired_tickets(
    http: &serenity::Http,
    db: &Database,
    cutoff: u64,
) -> anyhow::Result<usize> {
    let expired = closed_tickets_before(db, cutoff).await?;
    let mut removed = 0;

    for ticket in expired {
        let channel_id = serenity::ChannelId::new(ticket.channel_id);
        let counted = match channel_id.delete(http).await {
            Ok(_) => true,
            Err(source) if is_unknown_channel(&source) => false,
            Err(source) => {
                warn!(?source, channel_id = ticket.channel_id, "failed to auto-delete closed ticket");
                continue;
            }
        };

        if remove_ticket(db, ticket.channel_id, counted).await? {
            removed += 1;
        }
    }

    if removed > 0 {
        info!(removed, "auto-deleted closed tickets");
    }
    Ok(removed)
}

/// Forget tickets of `guild_id` whose channel no longer exists.
pub async fn forget_missing_channels(
    http: &serenity::Http,
    db: &Database,
    guild_id: serenity::GuildId,
) -> anyhow::Result<usize> {
    let channels = guild_id.channels(http).await?;
    let mut forgotten = 0;

    for ticket in list_tickets(db, guild_id.get()).await? {
        if channels.contains_key(&serenity::ChannelId::new(ticket.channel_id)) {
            continue;
        }
        if remove_ticket(db, ticket.channel_id, false).await? {
            forgotten += 1;
        }
    }

    Ok(forgotten)
}
