mod cli;
mod dispatch;
mod framework;
mod logging;
mod runtime;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use rustls::crypto::ring::default_provider;
use sqlx::postgres::PgPoolOptions;

use inspector_core::Settings;
use inspector_core::config::RedisSettings;
use inspector_database::{CacheService, Database, MIGRATOR};

use crate::cli::{Cli, Command, DbCommand};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    let settings = Settings::load(&cli.config, cli.load_mode())?;
    let _log_guard = logging::init(&settings.log, cli.stream_log)?;

    let runtime = runtime::build_runtime(&settings.runtime)?;
    runtime.block_on(run(settings, cli.command))
}

async fn run(settings: Settings, command: Option<Command>) -> anyhow::Result<()> {
    let db_pool = pool_options(&settings)
        .connect(&settings.database.url)
        .await?;
    info!("PostgreSQL connection established.");

    if let Some(Command::Db {
        action: DbCommand::Init { verbose },
    }) = command
    {
        if verbose {
            for migration in MIGRATOR.iter() {
                info!(
                    version = migration.version,
                    description = %migration.description,
                    "migration"
                );
            }
        }
        MIGRATOR.run(&db_pool).await?;
        info!("Database initialised.");
        return Ok(());
    }

    let cache = build_cache(&settings.redis);
    if cache.is_redis_enabled() {
        if let Err(err) = cache.ping().await {
            warn!(
                ?err,
                "Redis cache ping failed; cache operations will continue with fallback behavior."
            );
        } else {
            info!("Redis cache health check passed.");
        }
    }

    let db = Database::with_cache(db_pool, cache);

    if settings.database.auto_migrate {
        db.migrate().await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set database.auto_migrate to run at startup).");
    }

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let settings = Arc::new(settings);
    let token = settings.token.clone();
    let framework = framework::build(settings, db);

    info!("Inspector is connecting...");

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    client.start().await?;
    Ok(())
}

fn pool_options(settings: &Settings) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout_secs))
}

fn build_cache(redis: &RedisSettings) -> CacheService {
    let key_prefix = redis.key_prefix.clone();

    if !redis.enabled {
        info!("Redis cache disabled (set redis.enabled to enable).");
        return CacheService::disabled(key_prefix);
    }

    let Some(redis_url) = redis.url.as_deref() else {
        warn!(key_prefix = %key_prefix, "redis.enabled is set but redis.url is missing; continuing with DB-only mode.");
        return CacheService::disabled(key_prefix);
    };

    match CacheService::redis(redis_url, key_prefix.clone()) {
        Ok(cache) => {
            info!(key_prefix = %key_prefix, "Redis cache enabled.");
            cache
        }
        Err(err) => {
            warn!(?err, key_prefix = %key_prefix, "Failed to initialize Redis cache; continuing with DB-only mode.");
            CacheService::disabled(key_prefix)
        }
    }
}
