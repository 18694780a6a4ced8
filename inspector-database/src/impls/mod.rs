pub mod blacklist;
pub mod guild_config;
pub mod tags;
pub mod warnings;
