use poise::serenity_prelude as serenity;

use crate::moderation::moderator_guild;
use crate::replies::usage_message;
use inspector_core::{Context, Error};
use inspector_database::impls::warnings::{clear_warnings, count_warnings};
use inspector_utils::confirmation::confirm_action;
use inspector_utils::embed::info_embed;
use tracing::info;

/// Remove every warning for a user after confirmation.
#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn clearwarns(
    ctx: Context<'_>,
    #[description = "The user to clear"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let Some(guild_id) = moderator_guild(ctx).await? else {
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    let db = &ctx.data().db;
    let existing = count_warnings(db, guild_id.get(), user.id.get()).await?;
    if existing == 0 {
        ctx.say(format!("<@{}> has no warnings.", user.id.get()))
            .await?;
        return Ok(());
    }

    let embed = info_embed(
        "Clear warnings",
        format!(
            "This removes **{}** warning(s) for <@{}>.",
            existing,
            user.id.get()
        ),
    );
    let Some(interaction) = confirm_action(ctx, embed, "Clearing warnings...").await? else {
        return Ok(());
    };

    let removed = clear_warnings(db, guild_id.get(), user.id.get()).await?;
    info!(
        guild_id = guild_id.get(),
        user_id = user.id.get(),
        moderator_id = ctx.author().id.get(),
        removed,
        "warnings cleared"
    );

    interaction
        .edit_response(
            ctx.http(),
            serenity::EditInteractionResponse::new().content(format!(
                "Removed {} warning(s) for <@{}>.",
                removed,
                user.id.get()
            )),
        )
        .await?;

    Ok(())
}
