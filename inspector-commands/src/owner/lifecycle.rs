use poise::serenity_prelude as serenity;

use crate::replies::usage_message;
use inspector_core::{Context, Error};
use inspector_utils::parse::parse_snowflake;
use tracing::{info, warn};

/// Disconnect every shard and stop the bot.
#[poise::command(
    prefix_command,
    slash_command,
    owners_only,
    hide_in_help,
    category = "Owner",
    aliases("logout")
)]
pub async fn shutdown(ctx: Context<'_>) -> Result<(), Error> {
    warn!(owner_id = ctx.author().id.get(), "shutdown requested");
    ctx.say("Shutting down.").await?;
    ctx.framework().shard_manager().shutdown_all().await;
    Ok(())
}

/// Leave a server, this one by default.
#[poise::command(
    prefix_command,
    slash_command,
    owners_only,
    hide_in_help,
    category = "Owner"
)]
pub async fn leave(
    ctx: Context<'_>,
    #[description = "Server id"] guild_id: Option<String>,
) -> Result<(), Error> {
    let target = match guild_id.as_deref() {
        Some(raw) => match parse_snowflake(raw) {
            Some(id) => serenity::GuildId::new(id),
            None => {
                ctx.say(usage_message(ctx)).await?;
                return Ok(());
            }
        },
        None => match ctx.guild_id() {
            Some(id) => id,
            None => {
                ctx.say(usage_message(ctx)).await?;
                return Ok(());
            }
        },
    };

    if Some(target) != ctx.guild_id() {
        ctx.say(format!("Leaving server `{}`.", target.get())).await?;
    } else {
        ctx.say("Goodbye.").await?;
    }

    target.leave(ctx.http()).await?;
    info!(guild_id = target.get(), "left guild on owner request");

    Ok(())
}
