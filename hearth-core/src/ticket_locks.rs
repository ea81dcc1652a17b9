use std::collections::HashMap;
use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tokio::sync::{Mutex, OwnedMutexGuard};

type MemberKey = (serenity::GuildId, serenity::UserId);

/// Serialises ticket creation per member, so the open-ticket check and the
/// insert that follows it never interleave for the same person.
#[derive(Clone, Debug, Default)]
pub struct TicketCreationLocks {
    locks: Arc<Mutex<HashMap<MemberKey, Arc<Mutex<()>>>>>,
}

impl TicketCreationLocks {
    pub async fn acquire(
        &self,
        guild_id: serenity::GuildId,
        user_id: serenity::UserId,
    ) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry((guild_id, user_id)).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use poise::serenity_prelude as serenity;

    use super::TicketCreationLocks;

    const GUILD: serenity::GuildId = serenity::GuildId::new(1);
    const ALICE: serenity::UserId = serenity::UserId::new(10);
    const BOB: serenity::UserId = serenity::UserId::new(20);
    const WAIT: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn same_member_waits_for_the_first_creation() {
        let locks = TicketCreationLocks::default();
        let first = locks.acquire(GUILD, ALICE).await;

        assert!(tokio::time::timeout(WAIT, locks.acquire(GUILD, ALICE)).await.is_err());
        assert!(tokio::time::timeout(WAIT, locks.acquire(GUILD, BOB)).await.is_ok());

        drop(first);
        assert!(tokio::time::timeout(WAIT, locks.acquire(GUILD, ALICE)).await.is_ok());
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = TicketCreationLocks::default();
        drop(locks.acquire(GUILD, ALICE).await);
        let _bob = locks.acquire(GUILD, BOB).await;

        let held = locks.locks.lock().await;
        assert_eq!(held.len(), 1);
        assert!(held.contains_key(&(GUILD, BOB)));
    }
}
