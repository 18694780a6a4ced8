use poise::serenity_prelude as serenity;

use super::not_found_message;
use crate::replies::{guild_only_message, usage_message};
use inspector_core::{Context, Error};
use inspector_database::impls::tags::{get_tag, list_tags, search_tags};
use inspector_database::model::tags::TagSummary;
use inspector_utils::embed::DEFAULT_EMBED_COLOR;
use inspector_utils::formatting::sanitize_mentions;
use inspector_utils::pagination::{paginate_embed_pages, paginate_lines};

const TAGS_PER_PAGE: usize = 20;
const SEARCH_LIMIT: u32 = 20;

/// Show who owns a tag and how often it was used.
#[poise::command(prefix_command, slash_command, category = "Tags")]
pub async fn info(
    ctx: Context<'_>,
    #[description = "Tag name"]
    #[rest]
    name: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let Some(name) = name else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    let Some(tag) = get_tag(&ctx.data().db, guild_id.get(), &name).await? else {
        ctx.say(not_found_message(&name)).await?;
        return Ok(());
    };

    let embed = serenity::CreateEmbed::new()
        .title(sanitize_mentions(&tag.name))
        .color(DEFAULT_EMBED_COLOR)
        .field("Owner", format!("<@{}>", tag.owner_id), true)
        .field("Uses", tag.uses.to_string(), true)
        .field("Created", format!("<t:{}:R>", tag.created_at), true)
        .field("Updated", format!("<t:{}:R>", tag.updated_at), true);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Show a tag's content with markdown escaped.
#[poise::command(prefix_command, slash_command, category = "Tags")]
pub async fn raw(
    ctx: Context<'_>,
    #[description = "Tag name"]
    #[rest]
    name: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let Some(name) = name else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    match get_tag(&ctx.data().db, guild_id.get(), &name).await? {
        Some(tag) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(escape_markdown(&tag.content))
                    .allowed_mentions(serenity::CreateAllowedMentions::new()),
            )
            .await?;
        }
        None => {
            ctx.say(not_found_message(&name)).await?;
        }
    }

    Ok(())
}

/// List the server's tags, or the tags owned by one member.
#[poise::command(prefix_command, slash_command, category = "Tags")]
pub async fn list(
    ctx: Context<'_>,
    #[description = "Only tags owned by this member"] member: Option<serenity::User>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let owner = member.as_ref().map(|member| member.id.get());
    let tags = list_tags(&ctx.data().db, guild_id.get(), owner).await?;

    if tags.is_empty() {
        ctx.say("No tags found.").await?;
        return Ok(());
    }

    let title = match &member {
        Some(member) => format!("Tags by {}", member.name),
        None => "Server tags".to_owned(),
    };
    let pages = paginate_lines(&summary_lines(&tags), TAGS_PER_PAGE);
    paginate_embed_pages(ctx, &title, &pages, 1).await?;

    Ok(())
}

/// Search tag names.
#[poise::command(prefix_command, slash_command, category = "Tags")]
pub async fn search(
    ctx: Context<'_>,
    #[description = "Part of a tag name"]
    #[rest]
    query: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let Some(query) = query.filter(|query| !query.trim().is_empty()) else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    let found = search_tags(&ctx.data().db, guild_id.get(), &query, SEARCH_LIMIT).await?;
    if found.is_empty() {
        ctx.say("No tags matched.").await?;
        return Ok(());
    }

    let pages = paginate_lines(&summary_lines(&found), TAGS_PER_PAGE);
    paginate_embed_pages(ctx, "Matching tags", &pages, 1).await?;

    Ok(())
}

fn summary_lines(tags: &[TagSummary]) -> Vec<String> {
    tags.iter()
        .enumerate()
        .map(|(index, tag)| {
            format!(
                "{}. `{}` ({} uses)",
                index + 1,
                sanitize_mentions(&tag.name),
                tag.uses
            )
        })
        .collect()
}

/// Backslash-escape Discord markdown control characters.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '*' | '_' | '~' | '`' | '|' | '>' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use inspector_database::model::tags::TagSummary;

    use super::{escape_markdown, summary_lines};

    #[test]
    fn escapes_markdown() {
        assert_eq!(escape_markdown("**bold** `code`"), "\\*\\*bold\\*\\* \\`code\\`");
        assert_eq!(escape_markdown("plain text"), "plain text");
    }

    #[test]
    fn numbers_summary_lines() {
        let tags = vec![
            TagSummary {
                name: "faq".to_owned(),
                owner_id: 1,
                uses: 4,
            },
            TagSummary {
                name: "rules".to_owned(),
                owner_id: 2,
                uses: 0,
            },
        ];

        assert_eq!(
            summary_lines(&tags),
            vec!["1. `faq` (4 uses)".to_owned(), "2. `rules` (0 uses)".to_owned()]
        );
    }
}
