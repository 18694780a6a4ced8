use poise::serenity_prelude as serenity;

use inspector_database::model::warnings::Warning;
use inspector_utils::embed::DEFAULT_EMBED_COLOR;
use inspector_utils::formatting::sanitize_mentions;

pub const NO_REASON: &str = "No reason provided";

#[derive(Clone, Debug)]
pub struct TargetProfile {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

pub fn target_profile_from_user(user: &serenity::User) -> TargetProfile {
    TargetProfile {
        display_name: user
            .global_name
            .clone()
            .unwrap_or_else(|| user.name.clone()),
        avatar_url: Some(user.face()),
    }
}

pub fn warned_embed(
    target: &TargetProfile,
    warning: &Warning,
    total_warnings: u64,
) -> serenity::CreateEmbed {
    let description = format!(
        "**Target :** <@{}>\n**Reason :** {}\n**Total warnings :** {}",
        warning.user_id,
        sanitize_mentions(&warning.reason),
        total_warnings
    );
    let heading = format!("{} has been warned", target.display_name);

    let embed = serenity::CreateEmbed::new()
        .color(DEFAULT_EMBED_COLOR)
        .description(description)
        .footer(serenity::CreateEmbedFooter::new(format!("Warning #{}", warning.id)));

    match target.avatar_url.as_deref() {
        Some(url) => embed.author(serenity::CreateEmbedAuthor::new(heading).icon_url(url)),
        None => embed.title(heading),
    }
}

/// One warning as shown in the `warnings` listing.
pub fn warning_entry(warning: &Warning) -> String {
    format!(
        "`#{id}` • by <@{mod_id}>\n**Reason :** {reason}\n**When :** <t:{ts}:R> • <t:{ts}:f>\n",
        id = warning.id,
        mod_id = warning.moderator_id,
        reason = sanitize_mentions(&warning.reason),
        ts = warning.created_at,
    )
}

#[cfg(test)]
mod tests {
    use inspector_database::model::warnings::Warning;

    use super::warning_entry;

    #[test]
    fn entries_show_id_and_defuse_mentions() {
        let warning = Warning {
            id: 17,
            guild_id: 1,
            user_id: 2,
            moderator_id: 3,
            reason: "pinged @everyone".to_owned(),
            created_at: 1_700_000_000,
        };

        let entry = warning_entry(&warning);
        assert!(entry.starts_with("`#17` • by <@3>"));
        assert!(entry.contains("pinged @\u{200B}everyone"));
        assert!(entry.contains("<t:1700000000:R>"));
    }
}
