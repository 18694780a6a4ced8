use poise::serenity_prelude as serenity;

use super::{not_found_message, validate_tag_content, validate_tag_name};
use crate::replies::{guild_only_message, usage_message};
use inspector_core::{Context, Error};
use inspector_database::impls::tags::{create_tag, delete_tag, edit_tag, get_tag};
use inspector_utils::formatting::sanitize_mentions;
use inspector_utils::permissions::has_user_permission;
use tracing::info;

/// Create a new tag owned by you.
#[poise::command(prefix_command, slash_command, category = "Tags", aliases("add"))]
pub async fn create(
    ctx: Context<'_>,
    #[description = "Tag name"] name: Option<String>,
    #[description = "Tag content"]
    #[rest]
    content: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let (Some(name), Some(content)) = (name, content) else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    let name = match validate_tag_name(&name) {
        Ok(name) => name,
        Err(reason) => {
            ctx.say(reason).await?;
            return Ok(());
        }
    };
    let content = match validate_tag_content(&content) {
        Ok(content) => content,
        Err(reason) => {
            ctx.say(reason).await?;
            return Ok(());
        }
    };

    let created = create_tag(
        &ctx.data().db,
        guild_id.get(),
        &name,
        content,
        ctx.author().id.get(),
    )
    .await?;

    if created {
        info!(guild_id = guild_id.get(), tag = %name, "tag created");
        ctx.say(format!("Tag `{}` created.", sanitize_mentions(&name)))
            .await?;
    } else {
        ctx.say(format!("Tag `{}` already exists.", sanitize_mentions(&name)))
            .await?;
    }

    Ok(())
}

/// Replace the content of a tag you own.
#[poise::command(prefix_command, slash_command, category = "Tags")]
pub async fn edit(
    ctx: Context<'_>,
    #[description = "Tag name"] name: Option<String>,
    #[description = "New content"]
    #[rest]
    content: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let (Some(name), Some(content)) = (name, content) else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    let content = match validate_tag_content(&content) {
        Ok(content) => content,
        Err(reason) => {
            ctx.say(reason).await?;
            return Ok(());
        }
    };

    let db = &ctx.data().db;
    if edit_tag(db, guild_id.get(), &name, ctx.author().id.get(), content).await? {
        ctx.say("Tag updated.").await?;
        return Ok(());
    }

    let reply = if get_tag(db, guild_id.get(), &name).await?.is_some() {
        "You can only edit tags you own.".to_owned()
    } else {
        not_found_message(&name)
    };
    ctx.say(reply).await?;

    Ok(())
}

/// Delete a tag you own. Moderators can delete any tag.
#[poise::command(prefix_command, slash_command, category = "Tags", aliases("remove"))]
pub async fn delete(
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

    let db = &ctx.data().db;
    let Some(tag) = get_tag(db, guild_id.get(), &name).await? else {
        ctx.say(not_found_message(&name)).await?;
        return Ok(());
    };

    let owner_filter = if tag.owner_id == ctx.author().id.get() {
        Some(tag.owner_id)
    } else if has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_MESSAGES,
    )
    .await?
    {
        None
    } else {
        ctx.say("You can only delete tags you own.").await?;
        return Ok(());
    };

    if delete_tag(db, guild_id.get(), &tag.name, owner_filter).await? {
        info!(guild_id = guild_id.get(), tag = %tag.name, "tag deleted");
        ctx.say(format!("Tag `{}` deleted.", sanitize_mentions(&tag.name)))
            .await?;
    } else {
        ctx.say(not_found_message(&name)).await?;
    }

    Ok(())
}
