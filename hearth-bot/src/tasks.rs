use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use poise::serenity_prelude as serenity;

use hearth_commands::tickets::maintenance::delete_expired_tickets;
use hearth_database::Database;
use hearth_utils::time::now_unix_secs;

const TICKET_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Unix time before which closed tickets are removed.
pub fn expiry_cutoff(now: u64, retention_hours: u64) -> u64 {
    now.saturating_sub(retention_hours.saturating_mul(3600))
}

/// Hourly sweep of closed tickets past their retention period.
pub fn spawn_ticket_sweeper(http: Arc<serenity::Http>, db: Database, retention_hours: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICKET_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let cutoff = expiry_cutoff(now_unix_secs(), retention_hours);
            match delete_expired_tickets(&http, &db, cutoff).await {
                Ok(0) => {}
                Ok(deleted) => info!(deleted, "expired closed tickets deleted"),
                Err(source) => error!(?source, "closed ticket sweep failed"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::expiry_cutoff;

    #[test]
    fn cutoff_is_retention_hours_back() {
        assert_eq!(expiry_cutoff(1_000_000, 168), 1_000_000 - 168 * 3600);
    }

    #[test]
    fn cutoff_saturates_at_zero() {
        assert_eq!(expiry_cutoff(100, 168), 0);
    }
}
