use poise::serenity_prelude as serenity;

use crate::replies::{guild_only_message, permission_denied_message, usage_message};
use inspector_core::{Context, Error};
use inspector_database::impls::guild_config::{
    ensure_guild_config, set_guild_feature, set_guild_prefix,
};
use inspector_database::model::guild_config::{GuildConfig, GuildFeature};
use inspector_utils::embed::DEFAULT_EMBED_COLOR;
use inspector_utils::formatting::sanitize_mentions;
use inspector_utils::permissions::has_user_permission;
use tracing::info;

const MAX_PREFIX_CHARS: usize = 16;

#[derive(Debug, PartialEq, Eq)]
enum PrefixChange<'a> {
    Set(&'a str),
    Reset,
}

/// Show this server's settings.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Settings",
    subcommands("prefix", "toggle")
)]
pub async fn settings(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = manager_guild(ctx).await? else {
        return Ok(());
    };

    let config = ensure_guild_config(&ctx.data().db, guild_id.get()).await?;
    let embed = settings_embed(&config, &ctx.data().settings.command_prefixes());
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Show, change or reset this server's command prefix.
#[poise::command(prefix_command, slash_command, category = "Settings")]
pub async fn prefix(
    ctx: Context<'_>,
    #[description = "New prefix, or 'reset' to use the defaults"] new_prefix: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = manager_guild(ctx).await? else {
        return Ok(());
    };

    let db = &ctx.data().db;
    let Some(raw) = new_prefix else {
        let config = ensure_guild_config(db, guild_id.get()).await?;
        let reply = match config.prefix {
            Some(prefix) => format!("This server's prefix is `{}`.", sanitize_mentions(&prefix)),
            None => format!(
                "This server uses the default prefixes: {}",
                format_prefixes(&ctx.data().settings.command_prefixes())
            ),
        };
        ctx.say(reply).await?;
        return Ok(());
    };

    match parse_prefix_change(&raw) {
        Ok(PrefixChange::Reset) => {
            set_guild_prefix(db, guild_id.get(), None).await?;
            info!(guild_id = guild_id.get(), "guild prefix reset");
            ctx.say("Prefix reset to the defaults.").await?;
        }
        Ok(PrefixChange::Set(prefix)) => {
            set_guild_prefix(db, guild_id.get(), Some(prefix)).await?;
            info!(guild_id = guild_id.get(), prefix, "guild prefix changed");
            ctx.say(format!("Prefix set to `{}`.", sanitize_mentions(prefix)))
                .await?;
        }
        Err(reason) => {
            ctx.say(reason).await?;
        }
    }

    Ok(())
}

/// Turn a feature on or off for this server.
#[poise::command(prefix_command, slash_command, category = "Settings")]
pub async fn toggle(
    ctx: Context<'_>,
    #[description = "tags or moderation"] feature: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = manager_guild(ctx).await? else {
        return Ok(());
    };

    let Some(feature) = feature.as_deref().and_then(GuildFeature::parse) else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    let db = &ctx.data().db;
    let config = ensure_guild_config(db, guild_id.get()).await?;
    let enabled = !config.feature_enabled(feature);
    set_guild_feature(db, guild_id.get(), feature, enabled).await?;

    info!(
        guild_id = guild_id.get(),
        feature = feature.name(),
        enabled,
        "guild feature toggled"
    );
    ctx.say(format!(
        "{} commands are now **{}**.",
        feature.category(),
        on_off(enabled)
    ))
    .await?;

    Ok(())
}

async fn manager_guild(ctx: Context<'_>) -> Result<Option<serenity::GuildId>, Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(None);
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_GUILD,
    )
    .await?
    {
        ctx.say(permission_denied_message()).await?;
        return Ok(None);
    }

    Ok(Some(guild_id))
}

fn parse_prefix_change(raw: &str) -> Result<PrefixChange<'_>, &'static str> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("reset") {
        return Ok(PrefixChange::Reset);
    }
    if value.is_empty() {
        return Err("The prefix can't be empty.");
    }
    if value.chars().count() > MAX_PREFIX_CHARS {
        return Err("The prefix can be at most 16 characters.");
    }
    if value.contains('@') || value.contains('`') {
        return Err("The prefix can't contain mentions or backticks.");
    }
    Ok(PrefixChange::Set(value))
}

fn settings_embed(config: &GuildConfig, defaults: &[String]) -> serenity::CreateEmbed {
    let prefix = match config.prefix.as_deref() {
        Some(prefix) => format!("`{}`", sanitize_mentions(prefix)),
        None => format!("default ({})", format_prefixes(defaults)),
    };

    let mut embed = serenity::CreateEmbed::new()
        .title("Server settings")
        .color(DEFAULT_EMBED_COLOR)
        .field("Prefix", prefix, false);

    for feature in GuildFeature::ALL {
        embed = embed.field(
            feature.category(),
            on_off(config.feature_enabled(feature)),
            true,
        );
    }

    embed
}

fn format_prefixes(prefixes: &[String]) -> String {
    prefixes
        .iter()
        .map(|prefix| format!("`{}`", sanitize_mentions(prefix)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

#[cfg(test)]
mod tests {
    use super::{PrefixChange, format_prefixes, parse_prefix_change};

    #[test]
    fn prefix_arguments() {
        assert_eq!(parse_prefix_change(" ! "), Ok(PrefixChange::Set("!")));
        assert_eq!(parse_prefix_change("RESET"), Ok(PrefixChange::Reset));
        assert!(parse_prefix_change("  ").is_err());
        assert!(parse_prefix_change(&"x".repeat(17)).is_err());
        assert!(parse_prefix_change("@bot").is_err());
    }

    #[test]
    fn default_prefix_listing() {
        assert_eq!(
            format_prefixes(&["?".to_owned(), "insp ".to_owned()]),
            "`?`, `insp `"
        );
    }
}
