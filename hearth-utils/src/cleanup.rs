use poise::serenity_prelude as serenity;
use tracing::error;

use crate::time::now_unix_secs;

/// Discord refuses bulk deletes for messages older than this.
pub const BULK_DELETE_MAX_AGE_SECS: u64 = 14 * 24 * 60 * 60;
const BULK_DELETE_SAFETY_BUFFER_SECS: u64 = 60 * 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub deleted: u64,
    pub failed: u64,
}

/// Split messages into bulk-deletable ids and ids that must go one by one.
pub fn partition_by_age(
    messages: &[(serenity::MessageId, i64)],
    now_secs: u64,
) -> (Vec<serenity::MessageId>, Vec<serenity::MessageId>) {
    let cutoff = now_secs
        .saturating_sub(BULK_DELETE_MAX_AGE_SECS.saturating_sub(BULK_DELETE_SAFETY_BUFFER_SECS))
        as i64;

    let mut recent = Vec::new();
    let mut old = Vec::new();
    for &(id, created_at) in messages {
        if created_at >= cutoff {
            recent.push(id);
        } else {
            old.push(id);
        }
    }

    (recent, old)
}

/// Delete the given messages, bulk where allowed and singly otherwise.
pub async fn delete_messages(
    http: &serenity::Http,
    channel_id: serenity::ChannelId,
    messages: &[serenity::Message],
) -> DeletionReport {
    let stamped: Vec<(serenity::MessageId, i64)> = messages
        .iter()
        .map(|message| (message.id, message.timestamp.unix_timestamp()))
        .collect();
    let (bulk_ids, mut single_ids) = partition_by_age(&stamped, now_unix_secs());
    let mut report = DeletionReport::default();

    for chunk in bulk_ids.chunks(100) {
        if chunk.len() < 2 {
            single_ids.extend_from_slice(chunk);
            continue;
        }

        match channel_id.delete_messages(http, chunk.to_vec()).await {
            Ok(()) => report.deleted += chunk.len() as u64,
            Err(source) => {
                error!(
                    ?source,
                    channel_id = channel_id.get(),
                    count = chunk.len(),
                    "bulk delete failed, falling back to single delete"
                );
                single_ids.extend_from_slice(chunk);
            }
        }
    }

    for message_id in single_ids {
        match channel_id.delete_message(http, message_id).await {
            Ok(()) => report.deleted += 1,
            Err(_) => report.failed += 1,
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::{BULK_DELETE_MAX_AGE_SECS, partition_by_age};

    #[test]
    fn splits_recent_and_old_messages() {
        let now = 2_000_000_000_u64;
        let recent = serenity::MessageId::new(1);
        let borderline = serenity::MessageId::new(2);
        let old = serenity::MessageId::new(3);

        let messages = [
            (recent, (now - 60) as i64),
            (borderline, (now - BULK_DELETE_MAX_AGE_SECS + 30) as i64),
            (old, (now - BULK_DELETE_MAX_AGE_SECS - 1) as i64),
        ];

        let (bulk, single) = partition_by_age(&messages, now);
        assert_eq!(bulk, vec![recent]);
        assert_eq!(single, vec![borderline, old]);
    }

    #[test]
    fn keeps_input_order_within_each_group() {
        let now = 2_000_000_000_u64;
        let ids: Vec<serenity::MessageId> = (1..=4).map(serenity::MessageId::new).collect();
        let messages = [
            (ids[0], now as i64),
            (ids[1], 0),
            (ids[2], (now - 10) as i64),
            (ids[3], 1),
        ];

        let (bulk, single) = partition_by_age(&messages, now);
        assert_eq!(bulk, vec![ids[0], ids[2]]);
        assert_eq!(single, vec![ids[1], ids[3]]);
    }
}
