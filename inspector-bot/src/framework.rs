use std::sync::Arc;

use parking_lot::Mutex;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};

use inspector_core::{
    Blacklisted, BlacklistScope, COUNTER_DMS, COUNTER_FAILED, COUNTER_TOTAL, Context, Data, Error,
    RunningCommands, Settings,
};
use inspector_database::Database;
use inspector_database::impls::blacklist::get_blacklist;
use inspector_database::impls::guild_config::{ensure_guild_config, get_guild_config};
use inspector_database::model::guild_config::GuildFeature;
use inspector_utils::embed::{DEFAULT_EMBED_COLOR, ERROR_EMBED_COLOR, error_embed};
use inspector_utils::formatting::{format_compact_duration, truncate_chars};
use inspector_utils::permissions::describe_permissions;
use inspector_utils::registry::{CommandIndex, split_prefix};

use crate::dispatch::TrackedFramework;

const GENERIC_FAILURE: &str = "Something went wrong while running this command.";
const BLACKLIST_ICON: &str = "https://twemoji.maxcdn.com/2/72x72/26d4.png";
const WEBHOOK_ERROR_CHARS: usize = 1800;

pub fn build(settings: Arc<Settings>, db: Database) -> TrackedFramework {
    let running = Arc::new(Mutex::new(RunningCommands::default()));
    let setup_running = Arc::clone(&running);
    let owners = settings
        .owners
        .iter()
        .filter(|id| **id != 0)
        .map(|id| serenity::UserId::new(*id))
        .collect();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: inspector_commands::commands(&settings.features),
            owners,
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            command_check: Some(|ctx| Box::pin(command_check(ctx))),
            pre_command: |ctx| Box::pin(pre_command(ctx)),
            prefix_options: poise::PrefixFrameworkOptions {
                stripped_dynamic_prefix: Some(|_ctx, msg, data| {
                    Box::pin(strip_prefix(msg, data))
                }),
                mention_as_prefix: true,
                case_insensitive_commands: true,
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!(user = %ready.user.name, "Inspector is ready to inspect.");

                match settings.dev_guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(guild_id),
                        )
                        .await?;
                        info!(guild_id, "slash commands registered in development guild");
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                        info!("slash commands registered globally");
                    }
                }

                let index = CommandIndex::from_commands(&framework.options().commands);
                Ok(Data::new(db, settings, index, setup_running))
            })
        })
        .build();

    TrackedFramework::new(framework, running)
}

/// Guild override when set, otherwise the configured prefixes. Mentions are
/// handled by poise itself.
async fn strip_prefix<'a>(
    msg: &'a serenity::Message,
    data: &'a Data,
) -> Result<Option<(&'a str, &'a str)>, Error> {
    let mut prefixes = Vec::new();

    if let Some(guild_id) = msg.guild_id {
        match get_guild_config(&data.db, guild_id.get()).await {
            Ok(Some(config)) => prefixes.extend(config.prefix),
            Ok(None) => {}
            Err(e) => warn!(?e, guild_id = guild_id.get(), "guild prefix lookup failed"),
        }
    }

    if prefixes.is_empty() {
        prefixes = data.settings.command_prefixes();
    }

    Ok(split_prefix(&msg.content, &prefixes))
}

async fn command_check(ctx: Context<'_>) -> Result<bool, Error> {
    let data = ctx.data();
    let author_id = ctx.author().id;

    if let Some(entry) = get_blacklist(&data.db, author_id.get()).await? {
        return Err(Blacklisted {
            scope: BlacklistScope::User,
            reason: entry.reason,
        }
        .into());
    }

    let Some(guild_id) = ctx.guild_id() else {
        return Ok(true);
    };

    let is_owner = ctx.framework().options().owners.contains(&author_id);
    if !is_owner && let Some(entry) = get_blacklist(&data.db, guild_id.get()).await? {
        return Err(Blacklisted {
            scope: BlacklistScope::Guild,
            reason: entry.reason,
        }
        .into());
    }

    let config = ensure_guild_config(&data.db, guild_id.get()).await?;
    if let Some(feature) = ctx
        .command()
        .category
        .as_deref()
        .and_then(GuildFeature::for_category)
        && !config.feature_enabled(feature)
    {
        debug!(
            guild_id = guild_id.get(),
            feature = feature.name(),
            "command skipped, feature disabled"
        );
        return Ok(false);
    }

    Ok(true)
}

async fn pre_command(ctx: Context<'_>) {
    let data = ctx.data();
    data.running.lock().start(
        ctx.id(),
        ctx.command().qualified_name.clone(),
        ctx.author().id.get(),
        ctx.created_at().unix_timestamp(),
    );
    data.bump_counter(COUNTER_TOTAL).await;

    let place = match ctx.guild_id() {
        Some(guild_id) => {
            data.bump_counter(guild_id.get().to_string()).await;
            format!("guild {}", guild_id.get())
        }
        None => {
            data.bump_counter(COUNTER_DMS).await;
            "DMs".to_owned()
        }
    };

    info!(
        target: "commands",
        channel_id = ctx.channel_id().get(),
        author = %ctx.author().name,
        author_id = ctx.author().id.get(),
        "{} in {}: {}",
        ctx.command().qualified_name,
        place,
        ctx.invocation_string()
    );
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            report_failure(ctx, &error, "command error").await;
        }
        poise::FrameworkError::ArgumentParse { ctx, input, .. } => {
            let usage = ctx
                .data()
                .commands
                .usage_line(ctx.prefix(), &ctx.command().qualified_name);
            let description = match input {
                Some(input) => format!("Invalid argument: `{}`\n{}", input.replace('`', ""), usage),
                None => format!("Missing required argument.\n{}", usage),
            };

            reply_text(ctx, description).await;
        }
        poise::FrameworkError::UnknownCommand { msg, .. } => {
            debug!(
                channel_id = msg.channel_id.get(),
                content = %msg.content,
                "unknown command invocation"
            );
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            let Some(error) = error else {
                return;
            };

            match check_failure(&error) {
                CheckFailure::Blacklisted(blacklisted) => {
                    reply_embed(ctx, blacklisted_embed(blacklisted)).await;
                }
                CheckFailure::Internal => {
                    report_failure(ctx, &error, "command check error").await;
                }
            }
        }
        poise::FrameworkError::NotAnOwner { ctx, .. } => {
            reply_text(ctx, "Only bot owners can use this command.").await;
        }
        poise::FrameworkError::GuildOnly { ctx, .. } => {
            reply_text(ctx, "This command only works in servers.").await;
        }
        poise::FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            let wait = format_compact_duration(remaining_cooldown.as_secs().max(1));
            reply_text(ctx, format!("You're on cooldown. Try again in {wait}.")).await;
        }
        poise::FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            reply_text(
                ctx,
                format!(
                    "I need these permissions to do that: {}",
                    describe_permissions(missing_permissions)
                ),
            )
            .await;
        }
        other => {
            error!(?other, "framework error");
        }
    }
}

async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(
                user = %data_about_bot.user.name,
                guilds = data_about_bot.guilds.len(),
                "connected to gateway"
            );

            let help_hint = data
                .settings
                .command_prefixes()
                .first()
                .map(|prefix| format!("{prefix}help"))
                .unwrap_or_else(|| "/help".to_owned());
            ctx.set_presence(
                Some(serenity::ActivityData::watching(help_hint)),
                serenity::OnlineStatus::Online,
            );
        }
        serenity::FullEvent::GuildCreate {
            guild,
            is_new: Some(true),
        } => {
            info!(guild_id = guild.id.get(), name = %guild.name, "joined guild");
        }
        serenity::FullEvent::GuildDelete { incomplete, full } => {
            let name = full.as_ref().map(|guild| guild.name.as_str()).unwrap_or("unknown");
            info!(
                guild_id = incomplete.id.get(),
                name,
                unavailable = incomplete.unavailable,
                "left guild"
            );
        }
        _ => {}
    }

    Ok(())
}

/// Why the global check refused an invocation with an error.
#[derive(Debug, PartialEq, Eq)]
enum CheckFailure<'e> {
    Blacklisted(&'e Blacklisted),
    /// Lookup failures, treated like a command error.
    Internal,
}

fn check_failure(error: &Error) -> CheckFailure<'_> {
    match error.downcast_ref::<Blacklisted>() {
        Some(blacklisted) => CheckFailure::Blacklisted(blacklisted),
        None => CheckFailure::Internal,
    }
}

/// Log, count, forward to the webhook and give the user the generic reply.
async fn report_failure(ctx: Context<'_>, error: &Error, message: &str) {
    error!(
        ?error,
        command = %ctx.command().qualified_name,
        "{message}"
    );
    ctx.data().bump_counter(COUNTER_FAILED).await;

    if let Some(url) = ctx.data().settings.webhook_url.as_deref() {
        let report = error_report(
            &ctx.command().qualified_name,
            &ctx.invocation_string(),
            ctx.author().id.get(),
            ctx.guild_id().map(|guild_id| guild_id.get()),
            &format!("{error:?}"),
        );
        if let Err(e) = send_webhook_report(ctx.http(), url, report).await {
            warn!(?e, "failed to forward command error to webhook");
        }
    }

    let embed = serenity::CreateEmbed::new()
        .title("Command Error")
        .description(GENERIC_FAILURE)
        .color(ERROR_EMBED_COLOR);
    reply_embed(ctx, embed).await;
}

fn blacklisted_embed(blacklisted: &Blacklisted) -> serenity::CreateEmbed {
    let heading = match blacklisted.scope {
        BlacklistScope::User => "You have been blacklisted by my owner.",
        BlacklistScope::Guild => "This server has been blacklisted by my owner.",
    };

    let embed = error_embed(blacklisted.reason.as_deref().unwrap_or("No reason given."));
    embed.author(serenity::CreateEmbedAuthor::new(heading).icon_url(BLACKLIST_ICON))
}

/// Markdown body posted to the error webhook.
fn error_report(
    command: &str,
    invocation: &str,
    author_id: u64,
    guild_id: Option<u64>,
    error: &str,
) -> String {
    let place = guild_id.map_or_else(|| "DMs".to_owned(), |id| format!("guild `{id}`"));
    format!(
        "**Command:** `{}`\n**Invocation:** `{}`\n**Author:** `{}` in {}\n```\n{}\n```",
        command,
        invocation.replace('`', "'"),
        author_id,
        place,
        truncate_chars(&error.replace("```", "'''"), WEBHOOK_ERROR_CHARS)
    )
}

async fn send_webhook_report(http: &serenity::Http, url: &str, report: String) -> anyhow::Result<()> {
    let webhook = serenity::Webhook::from_url(http, url).await?;
    let embed = serenity::CreateEmbed::new()
        .title("Command error")
        .color(DEFAULT_EMBED_COLOR)
        .description(report)
        .timestamp(serenity::Timestamp::now());

    webhook
        .execute(http, false, serenity::ExecuteWebhook::new().embed(embed))
        .await?;
    Ok(())
}

async fn reply_embed(ctx: Context<'_>, embed: serenity::CreateEmbed) {
    if let Err(e) = ctx
        .send(poise::CreateReply::default().ephemeral(true).embed(embed))
        .await
    {
        warn!(?e, "failed to send error reply");
    }
}

async fn reply_text(ctx: Context<'_>, text: impl Into<String>) {
    if let Err(e) = ctx.say(text).await {
        warn!(?e, "failed to send error reply");
    }
}

#[cfg(test)]
mod tests {
    use inspector_core::{BlacklistScope, Blacklisted, Error};

    use super::{CheckFailure, check_failure, error_report};

    #[test]
    fn check_errors_other_than_blacklists_are_failures() {
        let blacklisted = Blacklisted {
            scope: BlacklistScope::Guild,
            reason: None,
        };
        let error = Error::new(blacklisted.clone());
        assert_eq!(check_failure(&error), CheckFailure::Blacklisted(&blacklisted));

        let lookup = anyhow::anyhow!("pool timed out").context("failed to fetch blacklist entry");
        assert_eq!(check_failure(&lookup), CheckFailure::Internal);
    }

    #[test]
    fn error_reports_are_fenced_and_bounded() {
        let report = error_report("tag create", "?tag create `x`", 7, Some(9), "boom ```");
        assert!(report.contains("**Command:** `tag create`"));
        assert!(report.contains("**Invocation:** `?tag create 'x'`"));
        assert!(report.contains("`7` in guild `9`"));
        assert!(report.ends_with("```\nboom '''\n```"));

        let long = "e".repeat(5000);
        let report = error_report("ping", "?ping", 1, None, &long);
        assert!(report.contains("in DMs"));
        assert!(report.chars().count() < 2000);
    }
}
