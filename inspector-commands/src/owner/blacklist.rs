use poise::serenity_prelude as serenity;

use crate::replies::usage_message;
use inspector_core::{Context, Error};
use inspector_database::impls::blacklist::{add_blacklist, list_blacklist, remove_blacklist};
use inspector_database::model::blacklist::BlacklistEntry;
use inspector_utils::embed::{DEFAULT_EMBED_COLOR, ERROR_EMBED_COLOR};
use inspector_utils::formatting::{sanitize_mentions, truncate_chars};
use inspector_utils::pagination::{paginate_embed_pages, paginate_lines};
use inspector_utils::parse::parse_snowflake;
use tracing::info;

const ENTRIES_PER_PAGE: usize = 10;
const MAX_REASON_CHARS: usize = 1024;

/// Block a user or server from using the bot.
#[poise::command(
    prefix_command,
    slash_command,
    owners_only,
    hide_in_help,
    category = "Owner",
    aliases("bl", "block"),
    subcommands("add", "remove", "list")
)]
pub async fn blacklist(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(usage_message(ctx)).await?;
    Ok(())
}

/// Blacklist a user or server by id or mention.
#[poise::command(prefix_command, slash_command, owners_only, category = "Owner")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "User or server id"] target: Option<String>,
    #[description = "Why"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let Some(snowflake) = target.as_deref().and_then(parse_snowflake) else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    if ctx.data().is_owner(snowflake) {
        ctx.say("Bot owners can't be blacklisted.").await?;
        return Ok(());
    }

    let reason = reason
        .map(|reason| truncate_chars(reason.trim(), MAX_REASON_CHARS))
        .filter(|reason| !reason.is_empty());
    let label = describe_target(ctx, snowflake).await;

    if !add_blacklist(&ctx.data().db, snowflake, reason.as_deref()).await? {
        ctx.say(format!("{label} is already blacklisted.")).await?;
        return Ok(());
    }

    info!(snowflake, "blacklisted");
    let embed = result_embed("Blacklisted", ERROR_EMBED_COLOR, &label, snowflake, reason.as_deref());
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Lift a blacklist entry.
#[poise::command(prefix_command, slash_command, owners_only, category = "Owner")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "User or server id"] target: Option<String>,
) -> Result<(), Error> {
    lift(ctx, target.as_deref()).await
}

/// Lift a blacklist entry.
#[poise::command(
    prefix_command,
    slash_command,
    owners_only,
    hide_in_help,
    category = "Owner",
    aliases("ubl", "unblock")
)]
pub async fn unblacklist(
    ctx: Context<'_>,
    #[description = "User or server id"] target: Option<String>,
) -> Result<(), Error> {
    lift(ctx, target.as_deref()).await
}

async fn lift(ctx: Context<'_>, target: Option<&str>) -> Result<(), Error> {
    let Some(snowflake) = target.and_then(parse_snowflake) else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    let label = describe_target(ctx, snowflake).await;
    if !remove_blacklist(&ctx.data().db, snowflake).await? {
        ctx.say(format!("{label} isn't blacklisted.")).await?;
        return Ok(());
    }

    info!(snowflake, "unblacklisted");
    let embed = result_embed("Unblacklisted", DEFAULT_EMBED_COLOR, &label, snowflake, None);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Show every blacklist entry.
#[poise::command(prefix_command, slash_command, owners_only, category = "Owner")]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let entries = list_blacklist(&ctx.data().db).await?;
    if entries.is_empty() {
        ctx.say("Nothing is blacklisted.").await?;
        return Ok(());
    }

    let lines: Vec<String> = entries.iter().map(entry_line).collect();
    let pages = paginate_lines(&lines, ENTRIES_PER_PAGE);
    paginate_embed_pages(ctx, "Blacklist", &pages, 1).await?;

    Ok(())
}

/// Server name from cache, else user tag over HTTP, else the raw id.
async fn describe_target(ctx: Context<'_>, snowflake: u64) -> String {
    if let Some(name) = ctx
        .cache()
        .guild(serenity::GuildId::new(snowflake))
        .map(|guild| guild.name.clone())
    {
        return format!("Server {}", sanitize_mentions(&name));
    }

    match ctx.http().get_user(serenity::UserId::new(snowflake)).await {
        Ok(user) => format!("User {}", sanitize_mentions(&user.name)),
        Err(_) => format!("`{snowflake}`"),
    }
}

fn result_embed(
    action: &str,
    color: u32,
    label: &str,
    snowflake: u64,
    reason: Option<&str>,
) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(format!("{label} {}", action.to_lowercase()))
        .color(color)
        .field("ID", snowflake.to_string(), true)
        .field("Reason", reason.unwrap_or("None"), false)
        .timestamp(serenity::Timestamp::now())
}

fn entry_line(entry: &BlacklistEntry) -> String {
    let reason = entry
        .reason
        .as_deref()
        .map(sanitize_mentions)
        .unwrap_or_else(|| "no reason".to_owned());
    format!("`{}` • <t:{}:d> • {}", entry.snowflake, entry.created_at, reason)
}

#[cfg(test)]
mod tests {
    use inspector_database::model::blacklist::BlacklistEntry;

    use super::entry_line;

    #[test]
    fn entry_lines() {
        let entry = BlacklistEntry {
            snowflake: 42,
            reason: None,
            created_at: 1_700_000_000,
        };
        assert_eq!(entry_line(&entry), "`42` • <t:1700000000:d> • no reason");

        let entry = BlacklistEntry {
            reason: Some("spam @here".to_owned()),
            ..entry
        };
        assert!(entry_line(&entry).ends_with("spam @\u{200B}here"));
    }
}
