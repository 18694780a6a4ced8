use serde::{Deserialize, Serialize};

/// A blacklisted user or guild, keyed by snowflake.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub snowflake: u64,
    pub reason: Option<String>,
    pub created_at: u64,
}
