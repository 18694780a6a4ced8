pub mod media;
pub mod moderation;
pub mod owner;
pub mod settings;
pub mod tags;
pub mod utility;

pub(crate) mod replies;

use inspector_core::config::FeatureFlags;
use inspector_core::{Data, Error};

/// Every command this deployment registers, in help order.
///
/// Groups switched off under `features` in the config are left out entirely.
pub fn commands(features: &FeatureFlags) -> Vec<poise::Command<Data, Error>> {
    let mut commands = vec![
        utility::ping::ping(),
        utility::help::help(),
        utility::usage::usage(),
        utility::stats::stats(),
        utility::stats::uptime(),
        utility::links::source(),
        utility::links::invite(),
        utility::timestamp::timestamp(),
    ];

    if features.moderation {
        commands.extend([
            moderation::warn::warn(),
            moderation::warnings::warnings(),
            moderation::delwarn::delwarn(),
            moderation::clearwarns::clearwarns(),
        ]);
    }

    if features.tags {
        commands.push(tags::tag());
    }

    if features.media {
        commands.extend([media::pep::pep(), media::avatar::avatar()]);
    }

    commands.extend([
        settings::settings(),
        owner::blacklist::blacklist(),
        owner::blacklist::unblacklist(),
        owner::su::su(),
        owner::tasks::tasks(),
        owner::tasks::cancel(),
        owner::lifecycle::shutdown(),
        owner::lifecycle::leave(),
    ]);

    commands
}

#[cfg(test)]
mod tests {
    use inspector_core::config::FeatureFlags;
    use inspector_utils::registry::CommandIndex;

    use super::commands;

    fn names(features: &FeatureFlags) -> Vec<String> {
        commands(features)
            .into_iter()
            .map(|command| command.name)
            .collect()
    }

    #[test]
    fn disabled_features_are_not_registered() {
        let all = names(&FeatureFlags::default());
        assert!(all.contains(&"tag".to_owned()));
        assert!(all.contains(&"warn".to_owned()));
        assert!(all.contains(&"pep".to_owned()));

        let trimmed = names(&FeatureFlags {
            tags: false,
            moderation: false,
            media: false,
        });
        assert!(!trimmed.contains(&"tag".to_owned()));
        assert!(!trimmed.contains(&"warn".to_owned()));
        assert!(!trimmed.contains(&"avatar".to_owned()));
        assert!(trimmed.contains(&"help".to_owned()));
        assert!(trimmed.contains(&"settings".to_owned()));
    }

    #[test]
    fn names_and_aliases_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for command in commands(&FeatureFlags::default()) {
            for name in std::iter::once(&command.name).chain(command.aliases.iter()) {
                assert!(seen.insert(name.clone()), "duplicate command name `{name}`");
            }
        }
    }

    #[test]
    fn unblacklist_shortcuts_resolve_at_top_level() {
        let index = CommandIndex::from_commands(&commands(&FeatureFlags::default()));

        for input in ["ubl 123", "unblock 123", "unblacklist 123"] {
            let resolved = index.resolve(input).unwrap();
            assert_eq!(resolved.node.name, "unblacklist", "{input}");
            assert_eq!(resolved.rest, "123");
        }

        let resolved = index.resolve("bl remove 123").unwrap();
        assert_eq!(resolved.node.name, "remove");
    }
}
