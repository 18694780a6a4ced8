pub mod clearwarns;
pub mod delwarn;
pub(crate) mod embeds;
pub mod warn;
pub mod warnings;

use poise::serenity_prelude as serenity;

use crate::replies::{guild_only_message, permission_denied_message};
use inspector_core::{Context, Error};
use inspector_utils::permissions::has_user_permission;

/// Guild id of the invocation when the author may moderate messages.
///
/// Replies with the refusal itself and returns `None` otherwise.
pub(crate) async fn moderator_guild(ctx: Context<'_>) -> Result<Option<serenity::GuildId>, Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(None);
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_MESSAGES,
    )
    .await?
    {
        ctx.say(permission_denied_message()).await?;
        return Ok(None);
    }

    Ok(Some(guild_id))
}
