use anyhow::Context as _;

use crate::cache::{BLACKLIST_CACHE_TTL, blacklist_key, invalidate_blacklist};
use crate::database::Database;
use crate::database::unix_now;
use crate::model::blacklist::BlacklistEntry;

#[derive(sqlx::FromRow)]
struct BlacklistRow {
    snowflake: i64,
    reason: Option<String>,
    created_at: i64,
}

/// Blacklist a user or guild. Returns `false` if the snowflake was already listed.
pub async fn add_blacklist(
    db: &Database,
    snowflake: u64,
    reason: Option<&str>,
) -> anyhow::Result<bool> {
    let snowflake_i64 = i64::try_from(snowflake).context("snowflake out of i64 range")?;
    let now = unix_now()?;

    let inserted = sqlx::query(
        "INSERT INTO blacklist (snowflake, reason, created_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (snowflake) DO NOTHING",
    )
    .bind(snowflake_i64)
    .bind(reason)
    .bind(now)
    .execute(db.pool())
    .await?
    .rows_affected();

    invalidate_blacklist(db.cache(), snowflake).await?;

    Ok(inserted > 0)
}

pub async fn remove_blacklist(db: &Database, snowflake: u64) -> anyhow::Result<bool> {
    let snowflake_i64 = i64::try_from(snowflake).context("snowflake out of i64 range")?;

    let deleted = sqlx::query("DELETE FROM blacklist WHERE snowflake = $1")
        .bind(snowflake_i64)
        .execute(db.pool())
        .await?
        .rows_affected();

    invalidate_blacklist(db.cache(), snowflake).await?;

    Ok(deleted > 0)
}

/// Cached lookup, hit on every command invocation.
pub async fn get_blacklist(db: &Database, snowflake: u64) -> anyhow::Result<Option<BlacklistEntry>> {
    let cache_key = blacklist_key(db.cache(), snowflake);
    db.cache()
        .get_or_load_json(&cache_key, BLACKLIST_CACHE_TTL, || async {
            let snowflake_i64 = i64::try_from(snowflake).context("snowflake out of i64 range")?;

            let row: Option<BlacklistRow> = sqlx::query_as(
                "SELECT snowflake, reason, created_at FROM blacklist WHERE snowflake = $1",
            )
            .bind(snowflake_i64)
            .fetch_optional(db.pool())
            .await?;

            row.map(to_blacklist_entry).transpose()
        })
        .await
}

pub async fn list_blacklist(db: &Database) -> anyhow::Result<Vec<BlacklistEntry>> {
    let rows: Vec<BlacklistRow> = sqlx::query_as(
        "SELECT snowflake, reason, created_at FROM blacklist ORDER BY created_at ASC, snowflake ASC",
    )
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(to_blacklist_entry).collect()
}

fn to_blacklist_entry(row: BlacklistRow) -> anyhow::Result<BlacklistEntry> {
    Ok(BlacklistEntry {
        snowflake: u64::try_from(row.snowflake).context("snowflake row out of u64 range")?,
        reason: row.reason,
        created_at: u64::try_from(row.created_at).context("created_at row out of u64 range")?,
    })
}
