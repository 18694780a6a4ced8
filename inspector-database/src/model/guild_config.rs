use serde::{Deserialize, Serialize};

/// Per-guild settings row. One row per guild, created on first command use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
    pub guild_id: u64,
    pub prefix: Option<String>,
    pub tags_enabled: bool,
    pub moderation_enabled: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

impl GuildConfig {
    pub fn feature_enabled(&self, feature: GuildFeature) -> bool {
        match feature {
            GuildFeature::Tags => self.tags_enabled,
            GuildFeature::Moderation => self.moderation_enabled,
        }
    }
}

/// Toggleable per-guild command groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuildFeature {
    Tags,
    Moderation,
}

impl GuildFeature {
    pub const ALL: [GuildFeature; 2] = [GuildFeature::Tags, GuildFeature::Moderation];

    pub fn name(self) -> &'static str {
        match self {
            GuildFeature::Tags => "tags",
            GuildFeature::Moderation => "moderation",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|feature| feature.name().eq_ignore_ascii_case(wanted))
    }

    /// Column backing this toggle in `guild_config`.
    pub(crate) fn column(self) -> &'static str {
        match self {
            GuildFeature::Tags => "tags_enabled",
            GuildFeature::Moderation => "moderation_enabled",
        }
    }

    /// The poise command category gated by this toggle.
    pub fn category(self) -> &'static str {
        match self {
            GuildFeature::Tags => "Tags",
            GuildFeature::Moderation => "Moderation",
        }
    }

    pub fn for_category(category: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.category().eq_ignore_ascii_case(category))
    }
}

#[cfg(test)]
mod tests {
    use super::{GuildConfig, GuildFeature};

    #[test]
    fn parses_feature_names_case_insensitively() {
        assert_eq!(GuildFeature::parse("Tags"), Some(GuildFeature::Tags));
        assert_eq!(GuildFeature::parse(" moderation "), Some(GuildFeature::Moderation));
        assert_eq!(GuildFeature::parse("music"), None);
    }

    #[test]
    fn maps_categories_to_features() {
        assert_eq!(GuildFeature::for_category("Tags"), Some(GuildFeature::Tags));
        assert_eq!(GuildFeature::for_category("Utility"), None);
    }

    #[test]
    fn feature_enabled_reads_matching_toggle() {
        let config = GuildConfig {
            guild_id: 1,
            prefix: None,
            tags_enabled: false,
            moderation_enabled: true,
            created_at: 0,
            updated_at: 0,
        };

        assert!(!config.feature_enabled(GuildFeature::Tags));
        assert!(config.feature_enabled(GuildFeature::Moderation));
    }
}
