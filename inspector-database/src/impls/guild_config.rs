use anyhow::Context as _;

use crate::cache::{CONFIG_CACHE_TTL, guild_config_key, invalidate_guild_config};
use crate::database::Database;
use crate::database::unix_now;
use crate::model::guild_config::{GuildConfig, GuildFeature};

const GUILD_CONFIG_COLUMNS: &str =
    "guild_id, prefix, tags_enabled, moderation_enabled, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct GuildConfigRow {
    guild_id: i64,
    prefix: Option<String>,
    tags_enabled: bool,
    moderation_enabled: bool,
    created_at: i64,
    updated_at: i64,
}

pub async fn get_guild_config(db: &Database, guild_id: u64) -> anyhow::Result<Option<GuildConfig>> {
    let cache_key = guild_config_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || async {
            let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

            let row: Option<GuildConfigRow> = sqlx::query_as(&format!(
                "SELECT {GUILD_CONFIG_COLUMNS} FROM guild_config WHERE guild_id = $1"
            ))
            .bind(guild_id_i64)
            .fetch_optional(db.pool())
            .await?;

            row.map(to_guild_config).transpose()
        })
        .await
}

/// Return the guild's config, creating the default row when it does not exist yet.
pub async fn ensure_guild_config(db: &Database, guild_id: u64) -> anyhow::Result<GuildConfig> {
    if let Some(config) = get_guild_config(db, guild_id).await? {
        return Ok(config);
    }

    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let now = unix_now()?;

    sqlx::query(
        "INSERT INTO guild_config (guild_id, created_at, updated_at)
         VALUES ($1, $2, $2)
         ON CONFLICT (guild_id) DO NOTHING",
    )
    .bind(guild_id_i64)
    .bind(now)
    .execute(db.pool())
    .await?;

    let row: GuildConfigRow = sqlx::query_as(&format!(
        "SELECT {GUILD_CONFIG_COLUMNS} FROM guild_config WHERE guild_id = $1"
    ))
    .bind(guild_id_i64)
    .fetch_one(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await?;

    to_guild_config(row)
}

/// Set or clear (`None`) the guild's prefix override.
pub async fn set_guild_prefix(
    db: &Database,
    guild_id: u64,
    prefix: Option<&str>,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let now = unix_now()?;

    sqlx::query(
        "INSERT INTO guild_config (guild_id, prefix, created_at, updated_at)
         VALUES ($1, $2, $3, $3)
         ON CONFLICT (guild_id) DO UPDATE SET prefix = EXCLUDED.prefix, updated_at = EXCLUDED.updated_at",
    )
    .bind(guild_id_i64)
    .bind(prefix)
    .bind(now)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await?;

    Ok(())
}

pub async fn set_guild_feature(
    db: &Database,
    guild_id: u64,
    feature: GuildFeature,
    enabled: bool,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let now = unix_now()?;
    let column = feature.column();

    sqlx::query(&format!(
        "INSERT INTO guild_config (guild_id, {column}, created_at, updated_at)
         VALUES ($1, $2, $3, $3)
         ON CONFLICT (guild_id) DO UPDATE SET {column} = EXCLUDED.{column}, updated_at = EXCLUDED.updated_at"
    ))
    .bind(guild_id_i64)
    .bind(enabled)
    .bind(now)
    .execute(db.pool())
    .await?;

    invalidate_guild_config(db.cache(), guild_id).await?;

    Ok(())
}

fn to_guild_config(row: GuildConfigRow) -> anyhow::Result<GuildConfig> {
    Ok(GuildConfig {
        guild_id: u64::try_from(row.guild_id).context("guild_id row out of u64 range")?,
        prefix: row.prefix,
        tags_enabled: row.tags_enabled,
        moderation_enabled: row.moderation_enabled,
        created_at: u64::try_from(row.created_at).context("created_at row out of u64 range")?,
        updated_at: u64::try_from(row.updated_at).context("updated_at row out of u64 range")?,
    })
}
