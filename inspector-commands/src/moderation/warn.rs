use poise::serenity_prelude as serenity;

use crate::moderation::embeds::{NO_REASON, target_profile_from_user, warned_embed};
use crate::moderation::moderator_guild;
use crate::replies::usage_message;
use inspector_core::{Context, Error};
use inspector_database::impls::warnings::{count_warnings, create_warning};
use tracing::info;

/// Issue a warning to a user.
#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "The user to warn"] user: Option<serenity::User>,
    #[description = "Reason for warning"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = moderator_guild(ctx).await? else {
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    if user.bot {
        ctx.say("You can't warn bots or application accounts.").await?;
        return Ok(());
    }

    if user.id == ctx.author().id {
        ctx.say("You can't warn yourself.").await?;
        return Ok(());
    }

    let reason = reason
        .map(|reason| reason.trim().to_owned())
        .filter(|reason| !reason.is_empty())
        .unwrap_or_else(|| NO_REASON.to_owned());

    let db = &ctx.data().db;
    let warning = create_warning(
        db,
        guild_id.get(),
        user.id.get(),
        ctx.author().id.get(),
        &reason,
    )
    .await?;
    let total = count_warnings(db, guild_id.get(), user.id.get()).await?;

    info!(
        guild_id = guild_id.get(),
        user_id = user.id.get(),
        moderator_id = ctx.author().id.get(),
        warning_id = warning.id,
        "warning issued"
    );

    let embed = warned_embed(&target_profile_from_user(&user), &warning, total);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
