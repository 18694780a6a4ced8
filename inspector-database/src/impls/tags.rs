use anyhow::Context as _;

use crate::database::Database;
use crate::database::unix_now;
use crate::model::tags::{Tag, TagSummary};

const TAG_COLUMNS: &str = "id, guild_id, name, content, owner_id, uses, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TagRow {
    id: i64,
    guild_id: i64,
    name: String,
    content: String,
    owner_id: i64,
    uses: i64,
    created_at: i64,
    updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct TagSummaryRow {
    name: String,
    owner_id: i64,
    uses: i64,
}

/// Tag names are matched case-insensitively and stored lowercase.
pub fn normalize_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Create a tag. Returns `true` if inserted, `false` if the guild already has
/// a tag with this name.
pub async fn create_tag(
    db: &Database,
    guild_id: u64,
    name: &str,
    content: &str,
    owner_id: u64,
) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let owner_id_i64 = i64::try_from(owner_id).context("owner_id out of i64 range")?;
    let now = unix_now()?;

    let inserted = sqlx::query(
        "INSERT INTO tags (guild_id, name, content, owner_id, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $5)
         ON CONFLICT (guild_id, name) DO NOTHING",
    )
    .bind(guild_id_i64)
    .bind(normalize_tag_name(name))
    .bind(content)
    .bind(owner_id_i64)
    .bind(now)
    .execute(db.pool())
    .await?
    .rows_affected();

    Ok(inserted > 0)
}

pub async fn get_tag(db: &Database, guild_id: u64, name: &str) -> anyhow::Result<Option<Tag>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    let row: Option<TagRow> = sqlx::query_as(&format!(
        "SELECT {TAG_COLUMNS} FROM tags WHERE guild_id = $1 AND name = $2"
    ))
    .bind(guild_id_i64)
    .bind(normalize_tag_name(name))
    .fetch_optional(db.pool())
    .await?;

    row.map(to_tag).transpose()
}

/// Fetch a tag for display and bump its usage counter in the same statement.
pub async fn use_tag(db: &Database, guild_id: u64, name: &str) -> anyhow::Result<Option<Tag>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    let row: Option<TagRow> = sqlx::query_as(&format!(
        "UPDATE tags SET uses = uses + 1
         WHERE guild_id = $1 AND name = $2
         RETURNING {TAG_COLUMNS}"
    ))
    .bind(guild_id_i64)
    .bind(normalize_tag_name(name))
    .fetch_optional(db.pool())
    .await?;

    row.map(to_tag).transpose()
}

/// Replace a tag's content. Only the owner's edits match.
pub async fn edit_tag(
    db: &Database,
    guild_id: u64,
    name: &str,
    owner_id: u64,
    content: &str,
) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let owner_id_i64 = i64::try_from(owner_id).context("owner_id out of i64 range")?;
    let now = unix_now()?;

    let updated = sqlx::query(
        "UPDATE tags
         SET content = $1, updated_at = $2
         WHERE guild_id = $3 AND name = $4 AND owner_id = $5",
    )
    .bind(content)
    .bind(now)
    .bind(guild_id_i64)
    .bind(normalize_tag_name(name))
    .bind(owner_id_i64)
    .execute(db.pool())
    .await?
    .rows_affected();

    Ok(updated > 0)
}

/// Delete a tag. With `owner_id = None` the owner check is skipped (moderator override).
pub async fn delete_tag(
    db: &Database,
    guild_id: u64,
    name: &str,
    owner_id: Option<u64>,
) -> anyhow::Result<bool> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let owner_id_i64 = owner_id
        .map(i64::try_from)
        .transpose()
        .context("owner_id out of i64 range")?;

    let deleted = sqlx::query(
        "DELETE FROM tags
         WHERE guild_id = $1 AND name = $2 AND ($3::BIGINT IS NULL OR owner_id = $3)",
    )
    .bind(guild_id_i64)
    .bind(normalize_tag_name(name))
    .bind(owner_id_i64)
    .execute(db.pool())
    .await?
    .rows_affected();

    Ok(deleted > 0)
}

/// List tags in a guild by name, optionally only those owned by one user.
pub async fn list_tags(
    db: &Database,
    guild_id: u64,
    owner_id: Option<u64>,
) -> anyhow::Result<Vec<TagSummary>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let owner_id_i64 = owner_id
        .map(i64::try_from)
        .transpose()
        .context("owner_id out of i64 range")?;

    let rows: Vec<TagSummaryRow> = sqlx::query_as(
        "SELECT name, owner_id, uses
         FROM tags
         WHERE guild_id = $1 AND ($2::BIGINT IS NULL OR owner_id = $2)
         ORDER BY name ASC",
    )
    .bind(guild_id_i64)
    .bind(owner_id_i64)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(to_tag_summary).collect()
}

/// Substring search over tag names, most used first.
pub async fn search_tags(
    db: &Database,
    guild_id: u64,
    query: &str,
    limit: u32,
) -> anyhow::Result<Vec<TagSummary>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let pattern = format!("%{}%", escape_like(&normalize_tag_name(query)));

    let rows: Vec<TagSummaryRow> = sqlx::query_as(
        "SELECT name, owner_id, uses
         FROM tags
         WHERE guild_id = $1 AND name LIKE $2 ESCAPE '\\'
         ORDER BY uses DESC, name ASC
         LIMIT $3",
    )
    .bind(guild_id_i64)
    .bind(pattern)
    .bind(i64::from(limit))
    .fetch_all(db.pool())
    .await?;

    rows.into_iter().map(to_tag_summary).collect()
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn to_tag(row: TagRow) -> anyhow::Result<Tag> {
    Ok(Tag {
        id: u64::try_from(row.id).context("id row out of u64 range")?,
        guild_id: u64::try_from(row.guild_id).context("guild_id row out of u64 range")?,
        name: row.name,
        content: row.content,
        owner_id: u64::try_from(row.owner_id).context("owner_id row out of u64 range")?,
        uses: u64::try_from(row.uses).context("uses row out of u64 range")?,
        created_at: u64::try_from(row.created_at).context("created_at row out of u64 range")?,
        updated_at: u64::try_from(row.updated_at).context("updated_at row out of u64 range")?,
    })
}

fn to_tag_summary(row: TagSummaryRow) -> anyhow::Result<TagSummary> {
    Ok(TagSummary {
        name: row.name,
        owner_id: u64::try_from(row.owner_id).context("owner_id row out of u64 range")?,
        uses: u64::try_from(row.uses).context("uses row out of u64 range")?,
    })
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::{
        create_tag, delete_tag, edit_tag, escape_like, get_tag, list_tags, normalize_tag_name,
        search_tags, use_tag,
    };
    use crate::database::Database;

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_tag_name("  Rules "), "rules");
        assert_eq!(normalize_tag_name("FAQ"), "faq");
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn duplicate_names_are_rejected_per_guild(pool: PgPool) {
        let db = Database::new(pool);

        assert!(create_tag(&db, 1, "rules", "be nice", 10).await.unwrap());
        assert!(!create_tag(&db, 1, "RULES", "be mean", 11).await.unwrap());
        assert!(create_tag(&db, 2, "rules", "other guild", 11).await.unwrap());

        let tag = get_tag(&db, 1, "Rules").await.unwrap().unwrap();
        assert_eq!(tag.content, "be nice");
        assert_eq!(tag.owner_id, 10);
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn usage_counter_increments(pool: PgPool) {
        let db = Database::new(pool);

        create_tag(&db, 1, "faq", "read the faq", 10).await.unwrap();
        assert_eq!(use_tag(&db, 1, "faq").await.unwrap().unwrap().uses, 1);
        assert_eq!(use_tag(&db, 1, "faq").await.unwrap().unwrap().uses, 2);
        assert!(use_tag(&db, 1, "missing").await.unwrap().is_none());
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn only_owner_edits_and_deletes(pool: PgPool) {
        let db = Database::new(pool);

        create_tag(&db, 1, "faq", "v1", 10).await.unwrap();

        assert!(!edit_tag(&db, 1, "faq", 11, "hijack").await.unwrap());
        assert!(edit_tag(&db, 1, "faq", 10, "v2").await.unwrap());
        assert_eq!(get_tag(&db, 1, "faq").await.unwrap().unwrap().content, "v2");

        assert!(!delete_tag(&db, 1, "faq", Some(11)).await.unwrap());
        assert!(delete_tag(&db, 1, "faq", None).await.unwrap());
        assert!(get_tag(&db, 1, "faq").await.unwrap().is_none());
    }

    #[sqlx::test(migrator = "crate::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn lists_and_searches(pool: PgPool) {
        let db = Database::new(pool);

        create_tag(&db, 1, "rust", "a", 10).await.unwrap();
        create_tag(&db, 1, "rustup", "b", 11).await.unwrap();
        create_tag(&db, 1, "python", "c", 10).await.unwrap();
        use_tag(&db, 1, "rustup").await.unwrap();

        let all = list_tags(&db, 1, None).await.unwrap();
        let names: Vec<_> = all.iter().map(|tag| tag.name.as_str()).collect();
        assert_eq!(names, vec!["python", "rust", "rustup"]);

        let owned = list_tags(&db, 1, Some(10)).await.unwrap();
        assert_eq!(owned.len(), 2);

        let found = search_tags(&db, 1, "RUST", 10).await.unwrap();
        let names: Vec<_> = found.iter().map(|tag| tag.name.as_str()).collect();
        assert_eq!(names, vec!["rustup", "rust"]);
    }
}
