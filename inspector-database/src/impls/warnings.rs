use anyhow::Context as _;

use crate::database::{Database, unix_now};
use crate::model::warnings::Warning;

const WARNING_COLUMNS: &str = "id, guild_id, user_id, moderator_id, reason, created_at";

#[derive(sqlx::FromRow)]
struct WarningRow {
    id: i64,
    guild_id: i64,
    user_id: i64,
    moderator_id: i64,
    reason: String,
    created_at: i64,
}

/// Record a warning for a target user and return the stored row.
pub async fn create_warning(
    db: &Database,
    guild_id: u64,
    user_id: u64,
    moderator_id: u64,
    reason: &str,
) -> anyhow::Result<Warning> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;
    let moderator_id_i64 = i64::try_from(moderator_id).context("moderator_id out of i64 range")?;
    let created_at = unix_now()?;

    let row: WarningRow = sqlx::query_as(&format!(
        "INSERT INTO warnings (guild_id, user_id, moderator_id, reason, created_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {WARNING_COLUMNS}"
    ))
    .bind(guild_id_i64)
    .bind(user_id_i64)
    .bind(moderator_id_i64)
    .bind(reason)
    .bind(created_at)
    .fetch_one(db.pool())
    .await?;

    to_warning(row)
}

/// Return every warning for a user in this guild, oldest first.
pub async fn list_warnings(
    db: &Database,
    guild_id: u64,
    user_id: u64,
) -> anyhow::Result<Vec<Warning>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

    let rows: Vec<WarningRow> = sqlx::query_as(&format!(
        "SELECT {WARNING_COLUMNS}
         FROM warnings
         WHERE guild_id = $1 AND user_id = $2
         ORDER BY created_at ASC, id ASC"
    ))
    .bind(guild_id_i64)
    .bind(user_id_i64)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(to_warning).collect()
}

pub async fn get_warning(
    db: &Database,
    guild_id: u64,
    warning_id: u64,
) -> anyhow::Result<Option<Warning>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let warning_id_i64 = i64::try_from(warning_id).context("warning_id out of i64 range")?;

    let row: Option<WarningRow> = sqlx::query_as(&format!(
        "SELECT {WARNING_COLUMNS} FROM warnings WHERE guild_id = $1 AND id = $2"
    ))
    .bind(guild_id_i64)
    .bind(warning_id_i64)
    .fetch_optional(db.pool())
    .await?;

    row.map(to_warning).transpose()
}

pub async fn count_warnings(db: &Database, guild_id: u64, user_id: u64) -> anyhow::Result<u64> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM warnings WHERE guild_id = $1 AND user_id = $2")
            .bind(guild_id_i64)
            .bind(user_id_i64)
            .fetch_one(db.pool())
            .await?;

    u64::try_from(count).context("warning count out of u64 range")
}

/// Delete one warning by id. Scoped to the guild so ids from other guilds never match.
pub async fn delete_warning(db: &Database, guild_id: u64, warning_id: u64) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let warning_id_i64 = i64::try_from(warning_id).context("warning_id out of i64 range")?;

    let deleted = sqlx::query("DELETE FROM warnings WHERE guild_id = $1 AND id = $2")
        .bind(guild_id_i64)
        .bind(warning_id_i64)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted > 0)
}

pub async fn clear_warnings(db: &Database, guild_id: u64, user_id: u64) -> anyhow::Result<u64> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

    let deleted = sqlx::query("DELETE FROM warnings WHERE guild_id = $1 AND user_id = $2")
        .bind(guild_id_i64)
        .bind(user_id_i64)
        .execute(db.pool())
        .await?
        .rows_affected();

    Ok(deleted)
}

fn to_warning(row: WarningRow) -> anyhow::Result<Warning> {
    Ok(Warning {
        id: u64::try_from(row.id).context("id row out of u64 range")?,
        guild_id: u64::try_from(row.guild_id).context("guild_id row out of u64 range")?,
        user_id: u64::try_from(row.user_id).context("user_id row out of u64 range")?,
        moderator_id: u64::try_from(row.moderator_id)
            .context("moderator_id row out of u64 range")?,
        reason: row.reason,
        created_at: u64::try_from(row.created_at).context("created_at row out of u64 range")?,
    })
}
