use std::path::PathBuf;

use clap::{Parser, Subcommand};
use inspector_core::config::{DEFAULT_CONFIG_PATH, LoadMode};

#[derive(Debug, Parser)]
#[command(name = "inspector")]
#[command(about = "Discord moderation and utility bot", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the YAML config file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Also write logs to stderr.
    #[arg(long)]
    pub stream_log: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Database maintenance.
    Db {
        #[command(subcommand)]
        action: DbCommand,
    },
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum DbCommand {
    /// Apply the schema migrations and exit.
    Init {
        /// Log every migration as it is applied.
        #[arg(short, long)]
        verbose: bool,
    },
}

impl Cli {
    /// Subcommands only touch Postgres, so they skip the gateway keys.
    pub fn load_mode(&self) -> LoadMode {
        match self.command {
            Some(Command::Db { .. }) => LoadMode::DatabaseOnly,
            None => LoadMode::Bot,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use inspector_core::config::LoadMode;

    use super::{Cli, Command, DbCommand};

    #[test]
    fn runs_the_bot_by_default() {
        let cli = Cli::try_parse_from(["inspector"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        assert!(!cli.stream_log);
        assert_eq!(cli.command, None);
        assert_eq!(cli.load_mode(), LoadMode::Bot);
    }

    #[test]
    fn accepts_config_and_stream_flags() {
        let cli =
            Cli::try_parse_from(["inspector", "--config", "/etc/inspector.yaml", "--stream-log"])
                .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/inspector.yaml"));
        assert!(cli.stream_log);
    }

    #[test]
    fn parses_db_init() {
        let cli = Cli::try_parse_from(["inspector", "db", "init", "--verbose"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Db {
                action: DbCommand::Init { verbose: true }
            })
        );
        assert_eq!(cli.load_mode(), LoadMode::DatabaseOnly);

        assert!(Cli::try_parse_from(["inspector", "db"]).is_err());
    }
}
