pub(crate) mod embeds;
pub mod help;
pub mod links;
pub mod ping;
pub mod stats;
pub mod timestamp;
pub mod usage;
