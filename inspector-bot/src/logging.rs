use std::str::FromStr;

use anyhow::Context as _;
use inspector_core::config::LogSettings;
use tracing::Metadata;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::{LevelFilter, filter_fn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE_PREFIX: &str = "inspector.log";

pub fn parse_level(raw: &str) -> anyhow::Result<LevelFilter> {
    LevelFilter::from_str(raw.trim())
        .with_context(|| format!("config key `log.level` has unknown level `{raw}`"))
}

/// Shard manager and runner chatter is only kept at INFO and above.
fn keep_event(metadata: &Metadata<'_>, level: LevelFilter) -> bool {
    if *metadata.level() > level {
        return false;
    }

    let target = metadata.target();
    let is_shard_noise = target.starts_with("serenity::gateway::bridge::shard_manager")
        || target.starts_with("serenity::gateway::bridge::shard_runner");

    !is_shard_noise || *metadata.level() <= tracing::Level::INFO
}

/// Install the global subscriber: a daily rolling file under `log.directory`,
/// plus stderr when `stream` is set. Keep the guard alive until exit.
pub fn init(settings: &LogSettings, stream: bool) -> anyhow::Result<WorkerGuard> {
    let level = parse_level(&settings.level)?;

    std::fs::create_dir_all(&settings.directory).with_context(|| {
        format!(
            "failed to create log directory `{}`",
            settings.directory.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::daily(&settings.directory, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_ansi(false)
        .with_filter(filter_fn(move |metadata| keep_event(metadata, level)));

    let stream_layer = stream.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter_fn(move |metadata| keep_event(metadata, level)))
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stream_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::parse_level;

    #[test]
    fn parses_level_names() {
        assert_eq!(parse_level("info").unwrap(), LevelFilter::INFO);
        assert_eq!(parse_level(" DEBUG ").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::OFF);
        assert!(parse_level("loud").is_err());
    }
}
