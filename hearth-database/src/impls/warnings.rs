use crate::database::{Database, from_db_id, to_db_id};
use crate::model::warnings::{WarningEntry, WarningRecord};

#[derive(sqlx::FromRow)]
struct WarningRow {
    warned_at: i64,
    moderator_id: i64,
    reason: String,
}

/// Record a warning and return the member's new total.
pub async fn record_warning(
    db: &Database,
    guild_id: u64,
    user_id: u64,
    moderator_id: u64,
    reason: &str,
    warned_at: u64,
) -> anyhow::Result<WarningRecord> {
    let guild_id = to_db_id(guild_id, "guild_id")?;
    let user_id = to_db_id(user_id, "user_id")?;

    sqlx::query(
        "INSERT INTO warnings (guild_id, user_id, moderator_id, reason, warned_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(guild_id)
    .bind(user_id)
    .bind(to_db_id(moderator_id, "moderator_id")?)
    .bind(reason)
    .bind(to_db_id(warned_at, "warned_at")?)
    .execute(db.pool())
    .await?;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM warnings WHERE guild_id = $1 AND user_id = $2")
            .bind(guild_id)
            .bind(user_id)
            .fetch_one(db.pool())
            .await?;

    Ok(WarningRecord {
        total_warnings: usize::try_from(total)?,
    })
}

/// Every warning for a member, oldest first.
pub async fn list_warnings(
    db: &Database,
    guild_id: u64,
    user_id: u64,
) -> anyhow::Result<Vec<WarningEntry>> {
    let rows: Vec<WarningRow> = sqlx::query_as(
        "SELECT warned_at, moderator_id, reason
         FROM warnings
         WHERE guild_id = $1 AND user_id = $2
         ORDER BY warned_at ASC, id ASC",
    )
    .bind(to_db_id(guild_id, "guild_id")?)
    .bind(to_db_id(user_id, "user_id")?)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(WarningEntry {
                warned_at: from_db_id(row.warned_at, "warned_at")?,
                moderator_id: from_db_id(row.moderator_id, "moderator_id")?,
                reason: row.reason,
            })
        })
        .collect()
}

pub async fn clear_warnings(db: &Database, guild_id: u64, user_id: u64) -> anyhow::Result<u64> {
    let deleted = sqlx::query("DELETE FROM warnings WHERE guild_id = $1 AND user_id = $2")
        .bind(to_db_id(guild_id, "guild_id")?)
        .bind(to_db_id(user_id, "user_id")?)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted)
}

/// Remove the n-th warning (1-based, oldest first). Returns whether one was removed.
pub async fn remove_warning_by_number(
    db: &Database,
    guild_id: u64,
    user_id: u64,
    warning_number: usize,
) -> anyhow::Result<bool> {
    let deleted_row: Option<i64> = sqlx::query_scalar(
        "WITH ranked AS (
            SELECT id, ROW_NUMBER() OVER (ORDER BY warned_at ASC, id ASC) AS rn
            FROM warnings
            WHERE guild_id = $1 AND user_id = $2
        )
        DELETE FROM warnings w
        USING ranked r
        WHERE w.id = r.id AND r.rn = $3
        RETURNING w.id",
    )
    .bind(to_db_id(guild_id, "guild_id")?)
    .bind(to_db_id(user_id, "user_id")?)
    .bind(i64::try_from(warning_number)?)
    .fetch_optional(db.pool())
    .await?;

    Ok(deleted_row.is_some())
}
