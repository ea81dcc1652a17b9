use std::collections::HashMap;
use std::sync::Arc;

use poise::serenity_prelude as serenity;
use tokio::sync::Mutex;

pub const DROP_LIFETIME_SECS: u64 = 120;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XpDrop {
    pub amount: u64,
    pub expires_at: u64,
    pub claimed_by: Option<serenity::UserId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed { amount: u64 },
    AlreadyClaimed { by: serenity::UserId },
    Expired,
    Unknown,
}

/// XP drops keyed by the message carrying the claim button.
#[derive(Clone, Debug, Default)]
pub struct DropRegistry {
    drops: Arc<Mutex<HashMap<serenity::MessageId, XpDrop>>>,
}

impl DropRegistry {
    pub async fn register(&self, message_id: serenity::MessageId, amount: u64, now: u64) -> XpDrop {
        let drop = XpDrop {
            amount,
            expires_at: now + DROP_LIFETIME_SECS,
            claimed_by: None,
        };
        self.drops.lock().await.insert(message_id, drop);
        drop
    }

    /// First claimer before expiry wins; later callers see who got it.
    pub async fn claim(
        &self,
        message_id: serenity::MessageId,
        user_id: serenity::UserId,
        now: u64,
    ) -> ClaimOutcome {
        let mut drops = self.drops.lock().await;
        let Some(drop) = drops.get_mut(&message_id) else {
            return ClaimOutcome::Unknown;
        };

        if let Some(by) = drop.claimed_by {
            return ClaimOutcome::AlreadyClaimed { by };
        }
        if now >= drop.expires_at {
            return ClaimOutcome::Expired;
        }

        drop.claimed_by = Some(user_id);
        ClaimOutcome::Claimed { amount: drop.amount }
    }

    /// Remove the drop; returns it only when nobody claimed it.
    pub async fn expire(&self, message_id: serenity::MessageId) -> Option<XpDrop> {
        self.drops
            .lock()
            .await
            .remove(&message_id)
            .filter(|drop| drop.claimed_by.is_none())
    }

    /// Undo a claim whose XP could not be stored.
    pub async fn release(&self, message_id: serenity::MessageId, user_id: serenity::UserId) {
        let mut drops = self.drops.lock().await;
        if let Some(drop) = drops.get_mut(&message_id)
            && drop.claimed_by == Some(user_id)
        {
            drop.claimed_by = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::{ClaimOutcome, DROP_LIFETIME_SECS, DropRegistry};

    const MESSAGE: serenity::MessageId = serenity::MessageId::new(1);
    const ALICE: serenity::UserId = serenity::UserId::new(10);
    const BOB: serenity::UserId = serenity::UserId::new(20);

    #[tokio::test]
    async fn first_claim_wins() {
        let registry = DropRegistry::default();
        registry.register(MESSAGE, 50, 1_000).await;

        assert_eq!(
            registry.claim(MESSAGE, ALICE, 1_001).await,
            ClaimOutcome::Claimed { amount: 50 }
        );
        assert_eq!(
            registry.claim(MESSAGE, BOB, 1_002).await,
            ClaimOutcome::AlreadyClaimed { by: ALICE }
        );
    }

    #[tokio::test]
    async fn claims_after_expiry_are_refused() {
        let registry = DropRegistry::default();
        registry.register(MESSAGE, 50, 1_000).await;

        assert_eq!(
            registry.claim(MESSAGE, ALICE, 1_000 + DROP_LIFETIME_SECS).await,
            ClaimOutcome::Expired
        );
    }

    #[tokio::test]
    async fn expire_only_returns_unclaimed_drops() {
        let registry = DropRegistry::default();
        registry.register(MESSAGE, 50, 1_000).await;
        registry.claim(MESSAGE, ALICE, 1_010).await;

        assert_eq!(registry.expire(MESSAGE).await, None);
        assert_eq!(registry.claim(MESSAGE, BOB, 1_011).await, ClaimOutcome::Unknown);

        let other = serenity::MessageId::new(2);
        registry.register(other, 30, 1_000).await;
        assert!(registry.expire(other).await.is_some());
    }

    #[tokio::test]
    async fn released_claim_can_be_taken_again() {
        let registry = DropRegistry::default();
        registry.register(MESSAGE, 25, 1_000).await;
        registry.claim(MESSAGE, ALICE, 1_001).await;
        registry.release(MESSAGE, ALICE).await;

        assert_eq!(
            registry.claim(MESSAGE, BOB, 1_002).await,
            ClaimOutcome::Claimed { amount: 25 }
        );
    }
}
