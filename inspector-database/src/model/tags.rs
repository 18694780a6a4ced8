#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub id: u64,
    pub guild_id: u64,
    pub name: String,
    pub content: String,
    pub owner_id: u64,
    pub uses: u64,
    pub created_at: u64,
    pub updated_at: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagSummary {
    pub name: String,
    pub owner_id: u64,
    pub uses: u64,
}
