/// A single warning. Rows are never updated; they can only be deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    pub id: u64,
    pub guild_id: u64,
    pub user_id: u64,
    pub moderator_id: u64,
    pub reason: String,
    pub created_at: u64,
}
