mod browse;
mod manage;

use poise::serenity_prelude as serenity;

use crate::replies::{guild_only_message, usage_message};
use inspector_core::{Context, Error};
use inspector_database::impls::tags::{normalize_tag_name, use_tag};
use inspector_utils::formatting::sanitize_mentions;

use browse::{info, list, raw, search};
use manage::{create, delete, edit};

pub const MAX_TAG_NAME_CHARS: usize = 64;
pub const MAX_TAG_CONTENT_CHARS: usize = 2000;

/// Subcommand names and aliases a tag may not shadow.
const RESERVED_NAMES: &[&str] = &[
    "create", "add", "edit", "delete", "remove", "info", "raw", "list", "search", "show",
];

/// Show a tag, or manage tags through a subcommand.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Tags",
    subcommands("show", "create", "edit", "delete", "info", "raw", "list", "search")
)]
pub async fn tag(
    ctx: Context<'_>,
    #[description = "Tag name"]
    #[rest]
    name: Option<String>,
) -> Result<(), Error> {
    send_tag(ctx, name).await
}

/// Show a tag.
#[poise::command(prefix_command, slash_command, category = "Tags")]
pub async fn show(
    ctx: Context<'_>,
    #[description = "Tag name"]
    #[rest]
    name: Option<String>,
) -> Result<(), Error> {
    send_tag(ctx, name).await
}

async fn send_tag(ctx: Context<'_>, name: Option<String>) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let Some(name) = name.filter(|name| !name.trim().is_empty()) else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    match use_tag(&ctx.data().db, guild_id.get(), &name).await? {
        Some(tag) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(tag.content)
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

pub(crate) fn not_found_message(name: &str) -> String {
    format!(
        "Tag `{}` not found.",
        sanitize_mentions(&normalize_tag_name(name))
    )
}

/// Check a requested tag name and return its stored (lowercase) form.
pub fn validate_tag_name(raw: &str) -> Result<String, &'static str> {
    let name = normalize_tag_name(raw);

    if name.is_empty() {
        return Err("Tag names can't be empty.");
    }
    if name.chars().count() > MAX_TAG_NAME_CHARS {
        return Err("Tag names can be at most 64 characters.");
    }
    if name.contains('@') || name.contains("<#") || name.contains("<@") {
        return Err("Tag names can't contain mentions.");
    }
    let first_word = name.split_whitespace().next().unwrap_or_default();
    if RESERVED_NAMES.contains(&first_word) {
        return Err("That name is reserved by a tag subcommand.");
    }

    Ok(name)
}

pub fn validate_tag_content(raw: &str) -> Result<&str, &'static str> {
    let content = raw.trim();
    if content.is_empty() {
        return Err("Tag content can't be empty.");
    }
    if content.chars().count() > MAX_TAG_CONTENT_CHARS {
        return Err("Tag content can be at most 2000 characters.");
    }
    Ok(content)
}
