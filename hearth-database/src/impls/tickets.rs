use crate::cache::{CONFIG_CACHE_TTL, invalidate_ticket_config, ticket_config_key};
use crate::database::{Database, from_db_id, to_db_id};
use crate::model::tickets::{
    NewTicket, Ticket, TicketConfig, TicketConfigField, TicketCounter, TicketStats, TicketStatus,
};

#[derive(sqlx::FromRow)]
struct TicketConfigRow {
    category_id: Option<i64>,
    closed_category_id: Option<i64>,
    staff_role_id: Option<i64>,
    log_channel_id: Option<i64>,
    notification_channel_id: Option<i64>,
    max_open_per_user: i32,
}

#[derive(sqlx::FromRow)]
struct TicketRow {
    channel_id: i64,
    guild_id: i64,
    user_id: i64,
    display_name: String,
    sanitized_name: String,
    status: String,
    created_at: i64,
    closed_at: Option<i64>,
    closed_by: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct TicketStatsRow {
    created: i64,
    closed: i64,
    deleted: i64,
}

const TICKET_COLUMNS: &str = "channel_id, guild_id, user_id, display_name, sanitized_name, status, created_at, closed_at, closed_by";

fn optional_id(value: Option<i64>, field: &'static str) -> anyhow::Result<Option<u64>> {
    value.map(|raw| from_db_id(raw, field)).transpose()
}

impl TryFrom<TicketRow> for Ticket {
    type Error = anyhow::Error;

    fn try_from(row: TicketRow) -> anyhow::Result<Self> {
        let status = TicketStatus::parse(&row.status)
            .ok_or_else(|| anyhow::anyhow!("unknown ticket status `{}`", row.status))?;

        Ok(Self {
            channel_id: from_db_id(row.channel_id, "channel_id")?,
            guild_id: from_db_id(row.guild_id, "guild_id")?,
            user_id: from_db_id(row.user_id, "user_id")?,
            display_name: row.display_name,
            sanitized_name: row.sanitized_name,
            status,
            created_at: from_db_id(row.created_at, "created_at")?,
            closed_at: optional_id(row.closed_at, "closed_at")?,
            closed_by: optional_id(row.closed_by, "closed_by")?,
        })
    }
}

pub async fn get_ticket_config(db: &Database, guild_id: u64) -> anyhow::Result<TicketConfig> {
    let cache_key = ticket_config_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || async {
            let row: Option<TicketConfigRow> = sqlx::query_as(
                "SELECT category_id, closed_category_id, staff_role_id, log_channel_id,
                        notification_channel_id, max_open_per_user
                 FROM ticket_config WHERE guild_id = $1",
            )
            .bind(to_db_id(guild_id, "guild_id")?)
            .fetch_optional(db.pool())
            .await?;

            let Some(row) = row else {
                return Ok(TicketConfig::default());
            };

            Ok(TicketConfig {
                category_id: optional_id(row.category_id, "category_id")?,
                closed_category_id: optional_id(row.closed_category_id, "closed_category_id")?,
                staff_role_id: optional_id(row.staff_role_id, "staff_role_id")?,
                log_channel_id: optional_id(row.log_channel_id, "log_channel_id")?,
                notification_channel_id: optional_id(
                    row.notification_channel_id,
                    "notification_channel_id",
                )?,
                max_open_per_user: u32::try_from(row.max_open_per_user)?,
            })
        })
        .await
}

/// Set or clear (`None`) one ticket configuration id.
pub async fn set_ticket_config_id(
    db: &Database,
    guild_id: u64,
    field: TicketConfigField,
    value: Option<u64>,
) -> anyhow::Result<()> {
    let statement = match field {
        TicketConfigField::Category => {
            "INSERT INTO ticket_config (guild_id, category_id) VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE SET category_id = EXCLUDED.category_id"
        }
        TicketConfigField::ClosedCategory => {
            "INSERT INTO ticket_config (guild_id, closed_category_id) VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE SET closed_category_id = EXCLUDED.closed_category_id"
        }
        TicketConfigField::StaffRole => {
            "INSERT INTO ticket_config (guild_id, staff_role_id) VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE SET staff_role_id = EXCLUDED.staff_role_id"
        }
        TicketConfigField::LogChannel => {
            "INSERT INTO ticket_config (guild_id, log_channel_id) VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE SET log_channel_id = EXCLUDED.log_channel_id"
        }
        TicketConfigField::NotificationChannel => {
            "INSERT INTO ticket_config (guild_id, notification_channel_id) VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE SET notification_channel_id = EXCLUDED.notification_channel_id"
        }
    };

    let value = value.map(|id| to_db_id(id, "config value")).transpose()?;

    sqlx::query(statement)
        .bind(to_db_id(guild_id, "guild_id")?)
        .bind(value)
        .execute(db.pool())
        .await?;

    invalidate_ticket_config(db.cache(), guild_id).await
}

pub async fn set_max_open_per_user(db: &Database, guild_id: u64, max: u32) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO ticket_config (guild_id, max_open_per_user) VALUES ($1, $2)
         ON CONFLICT (guild_id) DO UPDATE SET max_open_per_user = EXCLUDED.max_open_per_user",
    )
    .bind(to_db_id(guild_id, "guild_id")?)
    .bind(i32::try_from(max)?)
    .execute(db.pool())
    .await?;

    invalidate_ticket_config(db.cache(), guild_id).await
}

/// Advisory lock key for one member's tickets in one guild.
fn member_ticket_lock_key(guild_id: u64, user_id: u64) -> i64 {
    (guild_id.rotate_left(32) ^ user_id) as i64
}

/// Insert an open ticket unless the member already holds `max_open` of them.
///
/// Returns `false`, inserting nothing, when the limit is reached.
pub async fn insert_ticket_within_limit(
    db: &Database,
    ticket: NewTicket<'_>,
    max_open: u32,
) -> anyhow::Result<bool> {
    let guild_id = to_db_id(ticket.guild_id, "guild_id")?;
    let mut tx = db.pool().begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(member_ticket_lock_key(ticket.guild_id, ticket.user_id))
        .execute(&mut *tx)
        .await?;

    let inserted = sqlx::query(
        "INSERT INTO tickets (channel_id, guild_id, user_id, display_name, sanitized_name, status, created_at)
         SELECT $1, $2, $3, $4, $5, 'open', $6
         WHERE (SELECT COUNT(*) FROM tickets
                WHERE guild_id = $2 AND user_id = $3 AND status = 'open') < $7",
    )
    .bind(to_db_id(ticket.channel_id, "channel_id")?)
    .bind(guild_id)
    .bind(to_db_id(ticket.user_id, "user_id")?)
    .bind(ticket.display_name)
    .bind(ticket.sanitized_name)
    .bind(to_db_id(ticket.created_at, "created_at")?)
    .bind(i64::from(max_open))
    .execute(&mut *tx)
    .await?
    .rows_affected()
        > 0;

    if inserted {
        sqlx::query(counter_statement(TicketCounter::Created))
            .bind(guild_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(inserted)
}

pub async fn get_ticket(db: &Database, channel_id: u64) -> anyhow::Result<Option<Ticket>> {
    let row: Option<TicketRow> = sqlx::query_as(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE channel_id = $1"
    ))
    .bind(to_db_id(channel_id, "channel_id")?)
    .fetch_optional(db.pool())
    .await?;

    row.map(Ticket::try_from).transpose()
}

pub async fn count_open_tickets(db: &Database, guild_id: u64, user_id: u64) -> anyhow::Result<u32> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM tickets WHERE guild_id = $1 AND user_id = $2 AND status = 'open'",
    )
    .bind(to_db_id(guild_id, "guild_id")?)
    .bind(to_db_id(user_id, "user_id")?)
    .fetch_one(db.pool())
    .await?;

    Ok(u32::try_from(count)?)
}

/// Every ticket still on record for a guild, newest first.
pub async fn list_tickets(db: &Database, guild_id: u64) -> anyhow::Result<Vec<Ticket>> {
    let rows: Vec<TicketRow> = sqlx::query_as(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE guild_id = $1 ORDER BY created_at DESC"
    ))
    .bind(to_db_id(guild_id, "guild_id")?)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(Ticket::try_from).collect()
}

pub async fn mark_ticket_closed(
    db: &Database,
    channel_id: u64,
    closed_by: u64,
    closed_at: u64,
) -> anyhow::Result<bool> {
    let guild_id: Option<i64> = sqlx::query_scalar(
        "UPDATE tickets SET status = 'closed', closed_by = $2, closed_at = $3
         WHERE channel_id = $1 AND status = 'open'
         RETURNING guild_id",
    )
    .bind(to_db_id(channel_id, "channel_id")?)
    .bind(to_db_id(closed_by, "closed_by")?)
    .bind(to_db_id(closed_at, "closed_at")?)
    .fetch_optional(db.pool())
    .await?;

    let Some(guild_id) = guild_id else {
        return Ok(false);
    };

    bump_ticket_counter(db, from_db_id(guild_id, "guild_id")?, TicketCounter::Closed).await?;
    Ok(true)
}

pub async fn mark_ticket_reopened(db: &Database, channel_id: u64) -> anyhow::Result<bool> {
    let updated = sqlx::query(
        "UPDATE tickets SET status = 'open', closed_by = NULL, closed_at = NULL
         WHERE channel_id = $1 AND status = 'closed'",
    )
    .bind(to_db_id(channel_id, "channel_id")?)
    .execute(db.pool())
    .await?
    .rows_affected();

    Ok(updated > 0)
}

/// Remove a ticket record; `count_as_deleted` bumps the deleted counter.
pub async fn remove_ticket(
    db: &Database,
    channel_id: u64,
    count_as_deleted: bool,
) -> anyhow::Result<bool> {
    let guild_id: Option<i64> =
        sqlx::query_scalar("DELETE FROM tickets WHERE channel_id = $1 RETURNING guild_id")
            .bind(to_db_id(channel_id, "channel_id")?)
            .fetch_optional(db.pool())
            .await?;

    let Some(guild_id) = guild_id else {
        return Ok(false);
    };

    if count_as_deleted {
        bump_ticket_counter(db, from_db_id(guild_id, "guild_id")?, TicketCounter::Deleted).await?;
    }
    Ok(true)
}

/// Closed tickets across all guilds closed at or before `cutoff`.
pub async fn closed_tickets_before(db: &Database, cutoff: u64) -> anyhow::Result<Vec<Ticket>> {
    let rows: Vec<TicketRow> = sqlx::query_as(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets
         WHERE status = 'closed' AND closed_at IS NOT NULL AND closed_at <= $1"
    ))
    .bind(to_db_id(cutoff, "cutoff")?)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(Ticket::try_from).collect()
}

fn counter_statement(counter: TicketCounter) -> &'static str {
    match counter {
        TicketCounter::Created => {
            "INSERT INTO ticket_stats (guild_id, created) VALUES ($1, 1)
             ON CONFLICT (guild_id) DO UPDATE SET created = ticket_stats.created + 1"
        }
        TicketCounter::Closed => {
            "INSERT INTO ticket_stats (guild_id, closed) VALUES ($1, 1)
             ON CONFLICT (guild_id) DO UPDATE SET closed = ticket_stats.closed + 1"
        }
        TicketCounter::Deleted => {
            "INSERT INTO ticket_stats (guild_id, deleted) VALUES ($1, 1)
             ON CONFLICT (guild_id) DO UPDATE SET deleted = ticket_stats.deleted + 1"
        }
    }
}

async fn bump_ticket_counter(
    db: &Database,
    guild_id: u64,
    counter: TicketCounter,
) -> anyhow::Result<()> {
    sqlx::query(counter_statement(counter))
        .bind(to_db_id(guild_id, "guild_id")?)
        .execute(db.pool())
        .await?;

    Ok(())
}

pub async fn get_ticket_stats(db: &Database, guild_id: u64) -> anyhow::Result<TicketStats> {
    let row: Option<TicketStatsRow> =
        sqlx::query_as("SELECT created, closed, deleted FROM ticket_stats WHERE guild_id = $1")
            .bind(to_db_id(guild_id, "guild_id")?)
            .fetch_optional(db.pool())
            .await?;

    let Some(row) = row else {
        return Ok(TicketStats::default());
    };

    Ok(TicketStats {
        created: from_db_id(row.created, "created")?,
        closed: from_db_id(row.closed, "closed")?,
        deleted: from_db_id(row.deleted, "deleted")?,
    })
}

#[cfg(test)]
mod tests {
    use super::{counter_statement, member_ticket_lock_key};
    use crate::model::tickets::TicketCounter;

    #[test]
    fn lock_keys_separate_members_and_guilds() {
        let key = member_ticket_lock_key(1_000, 2_000);
        assert_eq!(key, member_ticket_lock_key(1_000, 2_000));
        assert_ne!(key, member_ticket_lock_key(2_000, 1_000));
        assert_ne!(key, member_ticket_lock_key(1_000, 2_001));
        assert_ne!(key, member_ticket_lock_key(1_001, 2_000));
    }

    #[test]
    fn each_counter_bumps_its_own_column() {
        assert!(counter_statement(TicketCounter::Created).contains("created = ticket_stats.created + 1"));
        assert!(counter_statement(TicketCounter::Closed).contains("closed = ticket_stats.closed + 1"));
        assert!(counter_statement(TicketCounter::Deleted).contains("deleted = ticket_stats.deleted + 1"));
    }
}
