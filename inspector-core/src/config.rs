use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Which keys must be present for the work the process is about to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadMode {
    /// Connect to Discord and serve commands.
    Bot,
    /// Maintenance against Postgres only, e.g. `db init`.
    DatabaseOnly,
}

/// Typed view of `config.yaml`. Loaded once at startup.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub token: String,
    pub prefixes: Vec<String>,
    pub description: String,
    pub owners: Vec<u64>,
    /// Discord webhook that receives command errors.
    pub webhook_url: Option<String>,
    /// Register slash commands in this guild only, for development.
    pub dev_guild_id: Option<u64>,
    pub database: DatabaseSettings,
    pub log: LogSettings,
    pub features: FeatureFlags,
    pub redis: RedisSettings,
    pub runtime: RuntimeSettings,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub auto_migrate: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogSettings {
    /// A `tracing` level name: trace, debug, info, warn, error.
    pub level: String,
    pub directory: PathBuf,
}

/// Command groups that can be switched off for the whole deployment.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeatureFlags {
    pub tags: bool,
    pub moderation: bool,
    pub media: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RedisSettings {
    pub enabled: bool,
    pub url: Option<String>,
    pub key_prefix: String,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeFlavor {
    #[default]
    Auto,
    MultiThread,
    CurrentThread,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeSettings {
    pub flavor: RuntimeFlavor,
    pub worker_threads: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: String::new(),
            prefixes: vec!["?".to_owned()],
            description: "A moderation and utility bot.".to_owned(),
            owners: Vec::new(),
            webhook_url: None,
            dev_guild_id: None,
            database: DatabaseSettings::default(),
            log: LogSettings::default(),
            features: FeatureFlags::default(),
            redis: RedisSettings::default(),
            runtime: RuntimeSettings::default(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
            acquire_timeout_secs: 30,
            auto_migrate: true,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            directory: PathBuf::from("logs"),
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            tags: true,
            moderation: true,
            media: true,
        }
    }
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            key_prefix: "inspector".to_owned(),
        }
    }
}

impl Settings {
    /// Read `path`, apply `.env` and process environment overrides, then validate.
    pub fn load(path: impl AsRef<Path>, mode: LoadMode) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file `{}`", path.display()))?;

        let mut settings = Self::from_yaml_str(&raw)
            .with_context(|| format!("failed to parse config file `{}`", path.display()))?;

        dotenvy::dotenv().ok();
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        settings.validate_for(mode)?;

        Ok(settings)
    }

    /// Parse without validating. An empty document yields the defaults.
    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// `DISCORD_TOKEN` and `DATABASE_URL` win over the file when set and non-empty.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(token) = non_empty("DISCORD_TOKEN") {
            self.token = token;
        }
        if let Some(url) = non_empty("DATABASE_URL") {
            self.database.url = url;
        }
    }

    pub fn validate_for(&self, mode: LoadMode) -> anyhow::Result<()> {
        self.validate_database()?;
        if mode == LoadMode::Bot {
            self.validate_gateway()?;
        }
        Ok(())
    }

    /// Everything `LoadMode::Bot` needs.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_for(LoadMode::Bot)
    }

    pub fn validate_database(&self) -> anyhow::Result<()> {
        if self.database.url.trim().is_empty() {
            bail!("config key `database.url` is required (or set DATABASE_URL)");
        }
        if self.database.max_connections == 0 {
            bail!("config key `database.max_connections` must be at least 1");
        }
        Ok(())
    }

    pub fn validate_gateway(&self) -> anyhow::Result<()> {
        if self.token.trim().is_empty() {
            bail!("config key `token` is required (or set DISCORD_TOKEN)");
        }
        if !self.prefixes.iter().any(|prefix| !prefix.trim().is_empty()) {
            bail!("config key `prefixes` needs at least one non-blank prefix");
        }
        if self.redis.enabled && self.redis.url.as_deref().is_none_or(|url| url.trim().is_empty()) {
            bail!("config key `redis.url` is required when `redis.enabled` is true");
        }
        Ok(())
    }

    /// Non-blank prefixes in configured order.
    pub fn command_prefixes(&self) -> Vec<String> {
        self.prefixes
            .iter()
            .filter(|prefix| !prefix.trim().is_empty())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::{FeatureFlags, LoadMode, RuntimeFlavor, Settings};

    const FULL: &str = r#"
token: abc.def
prefixes: ["?", "insp "]
description: Test bot
owners: [1, 2]
webhook_url: https://discord.com/api/webhooks/1/x
dev_guild_id: 99
database:
  url: postgres://localhost/inspector
  max_connections: 8
  acquire_timeout_secs: 5
  auto_migrate: false
log:
  level: debug
  directory: /var/log/inspector
features:
  tags: false
redis:
  enabled: true
  url: redis://localhost
  key_prefix: insp:test
runtime:
  flavor: current_thread
  worker_threads: 2
"#;

    #[test]
    fn parses_every_key() {
        let settings = Settings::from_yaml_str(FULL).unwrap();

        assert_eq!(settings.token, "abc.def");
        assert_eq!(settings.prefixes, vec!["?".to_owned(), "insp ".to_owned()]);
        assert_eq!(settings.description, "Test bot");
        assert_eq!(settings.owners, vec![1, 2]);
        assert_eq!(settings.dev_guild_id, Some(99));
        assert_eq!(settings.database.max_connections, 8);
        assert_eq!(settings.database.acquire_timeout_secs, 5);
        assert!(!settings.database.auto_migrate);
        assert_eq!(settings.log.level, "debug");
        assert_eq!(settings.log.directory, PathBuf::from("/var/log/inspector"));
        assert_eq!(
            settings.features,
            FeatureFlags {
                tags: false,
                moderation: true,
                media: true,
            }
        );
        assert!(settings.redis.enabled);
        assert_eq!(settings.redis.key_prefix, "insp:test");
        assert_eq!(settings.runtime.flavor, RuntimeFlavor::CurrentThread);
        assert_eq!(settings.runtime.worker_threads, Some(2));
        settings.validate().unwrap();
    }

    #[test]
    fn defaults_fill_missing_keys() {
        let settings = Settings::from_yaml_str(
            "token: t\ndatabase:\n  url: postgres://localhost/db\n",
        )
        .unwrap();

        assert_eq!(settings.prefixes, vec!["?".to_owned()]);
        assert_eq!(settings.database.max_connections, 5);
        assert!(settings.database.auto_migrate);
        assert_eq!(settings.log.level, "info");
        assert_eq!(settings.features, FeatureFlags::default());
        assert_eq!(settings.runtime.flavor, RuntimeFlavor::Auto);
        assert!(!settings.redis.enabled);
        settings.validate().unwrap();
    }

    #[test]
    fn validation_names_missing_keys() {
        let missing_token = Settings::from_yaml_str("database:\n  url: postgres://x\n").unwrap();
        let err = missing_token.validate().unwrap_err().to_string();
        assert!(err.contains("`token`"), "{err}");

        let missing_url = Settings::from_yaml_str("token: t\n").unwrap();
        let err = missing_url.validate().unwrap_err().to_string();
        assert!(err.contains("`database.url`"), "{err}");

        let blank_prefixes =
            Settings::from_yaml_str("token: t\nprefixes: [' ']\ndatabase:\n  url: x\n").unwrap();
        let err = blank_prefixes.validate().unwrap_err().to_string();
        assert!(err.contains("`prefixes`"), "{err}");

        let zero_pool = Settings::from_yaml_str(
            "token: t\ndatabase:\n  url: x\n  max_connections: 0\n",
        )
        .unwrap();
        assert!(zero_pool.validate().is_err());
    }

    #[test]
    fn database_maintenance_does_not_need_a_token() {
        let settings = Settings::from_yaml_str("database:\n  url: postgres://x\n").unwrap();

        settings.validate_for(LoadMode::DatabaseOnly).unwrap();
        let err = settings.validate_for(LoadMode::Bot).unwrap_err().to_string();
        assert!(err.contains("`token`"), "{err}");

        let no_url = Settings::from_yaml_str("token: t\n").unwrap();
        assert!(no_url.validate_for(LoadMode::DatabaseOnly).is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut settings = Settings::from_yaml_str("token: from-file\n").unwrap();
        let env: HashMap<&str, &str> =
            HashMap::from([("DISCORD_TOKEN", "from-env"), ("DATABASE_URL", "postgres://env")]);

        settings.apply_env_overrides(|key| env.get(key).map(|value| (*value).to_owned()));

        assert_eq!(settings.token, "from-env");
        assert_eq!(settings.database.url, "postgres://env");

        let mut untouched = Settings::from_yaml_str("token: kept\n").unwrap();
        untouched.apply_env_overrides(|key| (key == "DISCORD_TOKEN").then(|| "  ".to_owned()));
        assert_eq!(untouched.token, "kept");
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Settings::from_yaml_str("").unwrap(), Settings::default());
        assert!(Settings::from_yaml_str("prefixes: 5").is_err());
    }

    #[test]
    fn blank_prefixes_are_dropped() {
        let settings = Settings::from_yaml_str("prefixes: ['!', '', '?']").unwrap();
        assert_eq!(settings.command_prefixes(), vec!["!".to_owned(), "?".to_owned()]);
    }
}
