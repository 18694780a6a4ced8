use crate::moderation::moderator_guild;
use crate::replies::usage_message;
use inspector_core::{Context, Error};
use inspector_database::impls::warnings::{delete_warning, get_warning};
use tracing::info;

/// Delete a single warning by its id.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Moderation",
    aliases("unwarn")
)]
pub async fn delwarn(
    ctx: Context<'_>,
    #[description = "Warning id, as shown by the warnings command"] id: Option<u64>,
) -> Result<(), Error> {
    let Some(guild_id) = moderator_guild(ctx).await? else {
        return Ok(());
    };

    let Some(id) = id else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    let db = &ctx.data().db;
    let Some(warning) = get_warning(db, guild_id.get(), id).await? else {
        ctx.say(format!("Warning `#{id}` was not found in this server."))
            .await?;
        return Ok(());
    };

    if !delete_warning(db, guild_id.get(), id).await? {
        ctx.say(format!("Warning `#{id}` was already removed.")).await?;
        return Ok(());
    }

    info!(
        guild_id = guild_id.get(),
        warning_id = id,
        moderator_id = ctx.author().id.get(),
        "warning deleted"
    );

    ctx.say(format!(
        "Removed warning `#{}` for <@{}>.",
        warning.id, warning.user_id
    ))
    .await?;

    Ok(())
}
