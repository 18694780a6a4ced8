use poise::serenity_prelude as serenity;

use inspector_core::{COUNTER_DMS, COUNTER_FAILED, COUNTER_TOTAL, Context, Data, Error};
use inspector_utils::embed::DEFAULT_EMBED_COLOR;
use inspector_utils::formatting::{format_bytes, format_compact_duration};
use tracing::warn;

const BUSIEST_GUILDS: usize = 3;

/// Resident and virtual memory plus CPU usage of this process.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProcessStats {
    pub memory_bytes: u64,
    pub virtual_memory_bytes: u64,
    pub cpu_percent: f32,
}

/// Show process, database and command statistics.
#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn stats(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let process = process_stats(data);
    let counters = data.counter_snapshot().await;
    let database = match data.db.server_version().await {
        Ok(version) => format!("PostgreSQL {version}"),
        Err(e) => {
            warn!(?e, "failed to read postgres server version");
            "unavailable".to_owned()
        }
    };

    let embed = serenity::CreateEmbed::new()
        .title(format!("Inspector v{}", env!("CARGO_PKG_VERSION")))
        .description(data.settings.description.clone())
        .color(DEFAULT_EMBED_COLOR)
        .field(
            "Process",
            format!(
                "Memory: {}\nVirtual: {}\nCPU: {:.1}%",
                format_bytes(process.memory_bytes),
                format_bytes(process.virtual_memory_bytes),
                process.cpu_percent
            ),
            true,
        )
        .field(
            "Bot",
            format!(
                "Uptime: {}\nServers: {}\nDatabase: {}",
                format_compact_duration(data.started_at.elapsed().as_secs()),
                ctx.cache().guild_count(),
                database
            ),
            true,
        )
        .field("Commands", counter_summary(&counters), false);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show how long the bot has been running.
#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn uptime(ctx: Context<'_>) -> Result<(), Error> {
    let uptime = format_compact_duration(ctx.data().started_at.elapsed().as_secs());
    ctx.say(format!("Up for **{uptime}**.")).await?;
    Ok(())
}

/// Refresh the sysinfo snapshot for our own pid. The lock is held only for the refresh.
pub fn process_stats(data: &Data) -> ProcessStats {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return ProcessStats::default();
    };

    let mut system = data.system.lock();
    if !system.refresh_process(pid) {
        return ProcessStats::default();
    }

    system
        .process(pid)
        .map(|process| ProcessStats {
            memory_bytes: process.memory(),
            virtual_memory_bytes: process.virtual_memory(),
            cpu_percent: process.cpu_usage(),
        })
        .unwrap_or_default()
}

/// Render the fixed counters followed by the busiest guilds.
fn counter_summary(counters: &[(String, u64)]) -> String {
    let get = |key: &str| {
        counters
            .iter()
            .find(|(name, _)| name == key)
            .map_or(0, |(_, count)| *count)
    };

    let mut out = format!(
        "Total: {}\nIn DMs: {}\nFailed: {}",
        get(COUNTER_TOTAL),
        get(COUNTER_DMS),
        get(COUNTER_FAILED)
    );

    let busiest: Vec<String> = counters
        .iter()
        .filter(|(name, _)| name.parse::<u64>().is_ok())
        .take(BUSIEST_GUILDS)
        .map(|(guild, count)| format!("`{guild}`: {count}"))
        .collect();
    if !busiest.is_empty() {
        out.push_str("\nBusiest servers:\n");
        out.push_str(&busiest.join("\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::counter_summary;

    #[test]
    fn summarizes_counters() {
        let counters = vec![
            ("total".to_owned(), 12),
            ("1001".to_owned(), 7),
            ("in DMs".to_owned(), 3),
            ("1002".to_owned(), 2),
            ("failed".to_owned(), 1),
        ];

        assert_eq!(
            counter_summary(&counters),
            "Total: 12\nIn DMs: 3\nFailed: 1\nBusiest servers:\n`1001`: 7\n`1002`: 2"
        );
    }

    #[test]
    fn empty_counters_are_zero() {
        assert_eq!(counter_summary(&[]), "Total: 0\nIn DMs: 0\nFailed: 0");
    }
}
