use crate::database::{Database, from_db_id, to_db_id};
use crate::model::levels::{LeaderboardEntry, XpChange, XpTransfer};

#[derive(sqlx::FromRow)]
struct LeaderboardRow {
    user_id: i64,
    xp: i64,
}

fn xp_from_db(value: i64) -> anyhow::Result<u64> {
    from_db_id(value, "xp")
}

/// Award message XP unless the member is still on cooldown.
///
/// Returns `None` when the cooldown has not elapsed since the last award.
pub async fn award_message_xp(
    db: &Database,
    guild_id: u64,
    user_id: u64,
    amount: u64,
    now: u64,
    cooldown_secs: u64,
) -> anyhow::Result<Option<XpChange>> {
    let amount_i64 = to_db_id(amount, "amount")?;

    let new_xp: Option<i64> = sqlx::query_scalar(
        "INSERT INTO member_levels (guild_id, user_id, xp, last_message_at)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (guild_id, user_id) DO UPDATE
            SET xp = member_levels.xp + EXCLUDED.xp,
                last_message_at = EXCLUDED.last_message_at
            WHERE member_levels.last_message_at <= $5
         RETURNING xp",
    )
    .bind(to_db_id(guild_id, "guild_id")?)
    .bind(to_db_id(user_id, "user_id")?)
    .bind(amount_i64)
    .bind(to_db_id(now, "now")?)
    .bind(to_db_id(now.saturating_sub(cooldown_secs), "cooldown cutoff")?)
    .fetch_optional(db.pool())
    .await?;

    new_xp
        .map(|xp| {
            let new_xp = xp_from_db(xp)?;
            Ok(XpChange {
                previous_xp: new_xp.saturating_sub(amount),
                new_xp,
            })
        })
        .transpose()
}

pub async fn get_xp(db: &Database, guild_id: u64, user_id: u64) -> anyhow::Result<u64> {
    let xp: Option<i64> =
        sqlx::query_scalar("SELECT xp FROM member_levels WHERE guild_id = $1 AND user_id = $2")
            .bind(to_db_id(guild_id, "guild_id")?)
            .bind(to_db_id(user_id, "user_id")?)
            .fetch_optional(db.pool())
            .await?;

    xp.map_or(Ok(0), xp_from_db)
}

/// Add a signed delta to a member's XP, clamping the total at zero.
pub async fn adjust_xp(
    db: &Database,
    guild_id: u64,
    user_id: u64,
    delta: i64,
) -> anyhow::Result<XpChange> {
    let guild_id = to_db_id(guild_id, "guild_id")?;
    let user_id = to_db_id(user_id, "user_id")?;
    let mut tx = db.pool().begin().await?;

    let previous: Option<i64> = sqlx::query_scalar(
        "SELECT xp FROM member_levels WHERE guild_id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(guild_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let new_xp: i64 = sqlx::query_scalar(
        "INSERT INTO member_levels (guild_id, user_id, xp) VALUES ($1, $2, GREATEST(0, $3))
         ON CONFLICT (guild_id, user_id) DO UPDATE
            SET xp = GREATEST(0, member_levels.xp + $3)
         RETURNING xp",
    )
    .bind(guild_id)
    .bind(user_id)
    .bind(delta)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(XpChange {
        previous_xp: previous.map_or(Ok(0), xp_from_db)?,
        new_xp: xp_from_db(new_xp)?,
    })
}

pub async fn set_xp(db: &Database, guild_id: u64, user_id: u64, xp: u64) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO member_levels (guild_id, user_id, xp) VALUES ($1, $2, $3)
         ON CONFLICT (guild_id, user_id) DO UPDATE SET xp = EXCLUDED.xp",
    )
    .bind(to_db_id(guild_id, "guild_id")?)
    .bind(to_db_id(user_id, "user_id")?)
    .bind(to_db_id(xp, "xp")?)
    .execute(db.pool())
    .await?;

    Ok(())
}

pub async fn reset_member(db: &Database, guild_id: u64, user_id: u64) -> anyhow::Result<bool> {
    let deleted = sqlx::query("DELETE FROM member_levels WHERE guild_id = $1 AND user_id = $2")
        .bind(to_db_id(guild_id, "guild_id")?)
        .bind(to_db_id(user_id, "user_id")?)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted > 0)
}

pub async fn reset_guild(db: &Database, guild_id: u64) -> anyhow::Result<u64> {
    let deleted = sqlx::query("DELETE FROM member_levels WHERE guild_id = $1")
        .bind(to_db_id(guild_id, "guild_id")?)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted)
}

/// Move XP between members atomically.
///
/// Returns `None` (and changes nothing) when the source holds less than `amount`.
pub async fn transfer_xp(
    db: &Database,
    guild_id: u64,
    from_user_id: u64,
    to_user_id: u64,
    amount: u64,
) -> anyhow::Result<Option<XpTransfer>> {
    let guild_id = to_db_id(guild_id, "guild_id")?;
    let amount = to_db_id(amount, "amount")?;
    let mut tx = db.pool().begin().await?;

    let source_xp: Option<i64> = sqlx::query_scalar(
        "SELECT xp FROM member_levels WHERE guild_id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(guild_id)
    .bind(to_db_id(from_user_id, "from_user_id")?)
    .fetch_optional(&mut *tx)
    .await?;

    if source_xp.unwrap_or(0) < amount {
        tx.rollback().await?;
        return Ok(None);
    }

    let from_xp: i64 = sqlx::query_scalar(
        "UPDATE member_levels SET xp = xp - $3
         WHERE guild_id = $1 AND user_id = $2
         RETURNING xp",
    )
    .bind(guild_id)
    .bind(to_db_id(from_user_id, "from_user_id")?)
    .bind(amount)
    .fetch_one(&mut *tx)
    .await?;

    let to_xp: i64 = sqlx::query_scalar(
        "INSERT INTO member_levels (guild_id, user_id, xp) VALUES ($1, $2, $3)
         ON CONFLICT (guild_id, user_id) DO UPDATE SET xp = member_levels.xp + EXCLUDED.xp
         RETURNING xp",
    )
    .bind(guild_id)
    .bind(to_db_id(to_user_id, "to_user_id")?)
    .bind(amount)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Some(XpTransfer {
        from_xp: xp_from_db(from_xp)?,
        to_xp: xp_from_db(to_xp)?,
    }))
}

/// Highest-XP members first.
pub async fn top_members(
    db: &Database,
    guild_id: u64,
    limit: u32,
) -> anyhow::Result<Vec<LeaderboardEntry>> {
    let rows: Vec<LeaderboardRow> = sqlx::query_as(
        "SELECT user_id, xp FROM member_levels
         WHERE guild_id = $1 AND xp > 0
         ORDER BY xp DESC, user_id ASC
         LIMIT $2",
    )
    .bind(to_db_id(guild_id, "guild_id")?)
    .bind(i64::from(limit))
    .fetch_all(db.pool())
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(LeaderboardEntry {
                user_id: from_db_id(row.user_id, "user_id")?,
                xp: xp_from_db(row.xp)?,
            })
        })
        .collect()
}

/// 1-based leaderboard rank, `None` for members without XP.
pub async fn member_rank(db: &Database, guild_id: u64, user_id: u64) -> anyhow::Result<Option<u64>> {
    let rank: Option<i64> = sqlx::query_scalar(
        "SELECT 1 + (
            SELECT COUNT(*) FROM member_levels other
            WHERE other.guild_id = me.guild_id AND other.xp > me.xp
         )
         FROM member_levels me
         WHERE me.guild_id = $1 AND me.user_id = $2 AND me.xp > 0",
    )
    .bind(to_db_id(guild_id, "guild_id")?)
    .bind(to_db_id(user_id, "user_id")?)
    .fetch_optional(db.pool())
    .await?;

    rank.map(|value| from_db_id(value, "rank")).transpose()
}
