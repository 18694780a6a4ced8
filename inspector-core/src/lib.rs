pub mod config;
pub mod tasks;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use inspector_database::Database;
use inspector_utils::registry::CommandIndex;
use parking_lot::Mutex;
use tokio::sync::RwLock;

pub use config::Settings;
pub use tasks::{RunningCommand, RunningCommands};

pub type Error = anyhow::Error;

/// Counter keys that are not per-guild.
pub const COUNTER_TOTAL: &str = "total";
pub const COUNTER_DMS: &str = "in DMs";
pub const COUNTER_FAILED: &str = "failed";

#[derive(Clone)]
pub struct Data {
    pub db: Database,
    pub settings: Arc<Settings>,
    pub started_at: Instant,
    pub command_counter: Arc<RwLock<HashMap<String, u64>>>,
    pub system: Arc<Mutex<sysinfo::System>>,
    pub http_client: reqwest::Client,
    pub commands: Arc<CommandIndex>,
    pub running: Arc<Mutex<RunningCommands>>,
}

impl Data {
    pub fn new(
        db: Database,
        settings: Arc<Settings>,
        commands: CommandIndex,
        running: Arc<Mutex<RunningCommands>>,
    ) -> Self {
        Self {
            db,
            settings,
            started_at: Instant::now(),
            command_counter: Arc::default(),
            system: Arc::new(Mutex::new(sysinfo::System::new())),
            http_client: reqwest::Client::new(),
            commands: Arc::new(commands),
            running,
        }
    }

    pub async fn bump_counter(&self, key: impl Into<String>) {
        *self.command_counter.write().await.entry(key.into()).or_insert(0) += 1;
    }

    /// Counters sorted by count, highest first, ties by key.
    pub async fn counter_snapshot(&self) -> Vec<(String, u64)> {
        let mut counters: Vec<_> = self
            .command_counter
            .read()
            .await
            .iter()
            .map(|(key, count)| (key.clone(), *count))
            .collect();
        counters.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counters
    }

    pub fn is_owner(&self, user_id: u64) -> bool {
        self.settings.owners.contains(&user_id)
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Data")
            .field("db", &self.db)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

/// Who a blacklist hit applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlacklistScope {
    User,
    Guild,
}

/// Raised by the global command check; `on_error` downcasts to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blacklisted {
    pub scope: BlacklistScope,
    pub reason: Option<String>,
}

impl fmt::Display for Blacklisted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let who = match self.scope {
            BlacklistScope::User => "You are",
            BlacklistScope::Guild => "This server is",
        };
        write!(f, "{who} blacklisted from using this bot")?;
        if let Some(reason) = &self.reason {
            write!(f, ": {reason}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Blacklisted {}

pub type Context<'a> = poise::Context<'a, Data, Error>;

#[cfg(test)]
mod tests {
    use super::{BlacklistScope, Blacklisted};

    #[test]
    fn blacklist_messages() {
        let user = Blacklisted {
            scope: BlacklistScope::User,
            reason: None,
        };
        assert_eq!(user.to_string(), "You are blacklisted from using this bot");

        let guild = Blacklisted {
            scope: BlacklistScope::Guild,
            reason: Some("raids".to_owned()),
        };
        assert_eq!(
            guild.to_string(),
            "This server is blacklisted from using this bot: raids"
        );

        let wrapped = anyhow::Error::new(guild.clone());
        assert_eq!(wrapped.downcast_ref::<Blacklisted>(), Some(&guild));
    }
}
