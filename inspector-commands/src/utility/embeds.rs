use inspector_utils::registry::CommandNode;

pub fn unknown_query_message(query: &str, valid_categories: &[&str]) -> String {
    format!(
        "No command or category called `{}`.\nCategories: {}",
        query.replace('`', ""),
        valid_categories.join(", ")
    )
}

pub fn page_out_of_range_message(requested_page: usize, total_pages: usize) -> String {
    format!(
        "Page {} does not exist. Available pages: 1-{}.",
        requested_page, total_pages
    )
}

/// Render `(category, command)` pairs, starting a bold heading whenever the category changes.
pub fn grouped_help_description(commands: &[(&str, &CommandNode)]) -> String {
    let mut out = String::new();
    let mut current_category: Option<&str> = None;

    for (category, command) in commands {
        if current_category != Some(*category) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("**{}**\n", category));
            current_category = Some(*category);
        }

        out.push_str(&format!(
            "`{}`: {}\n",
            command.name,
            command.description.as_deref().unwrap_or("No description.")
        ));
    }

    if out.is_empty() {
        out.push_str("No commands available.");
    }

    out.trim_end().to_owned()
}

/// Detail view for one (sub)command.
pub fn command_help_description(prefix: &str, command: &CommandNode) -> String {
    let mut out = format!(
        "{}\n\n**Usage:** `{}{}`",
        command.description.as_deref().unwrap_or("No description."),
        prefix,
        command.usage()
    );

    if !command.aliases.is_empty() {
        let aliases = command
            .aliases
            .iter()
            .map(|alias| format!("`{alias}`"))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("\n**Aliases:** {aliases}"));
    }

    if !command.children.is_empty() {
        out.push_str("\n\n**Subcommands**");
        for child in &command.children {
            out.push_str(&format!(
                "\n`{}`: {}",
                child.usage(),
                child.description.as_deref().unwrap_or("No description.")
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use inspector_utils::registry::CommandNode;

    use super::{command_help_description, grouped_help_description};

    fn described(name: &str, description: &str) -> CommandNode {
        let mut node = CommandNode::new(name);
        node.description = Some(description.to_owned());
        node
    }

    #[test]
    fn groups_by_category() {
        let ping = described("ping", "Pong.");
        let help = described("help", "Lists commands.");
        let warn = described("warn", "Warn a user.");

        let text = grouped_help_description(&[
            ("Utility", &ping),
            ("Utility", &help),
            ("Moderation", &warn),
        ]);

        assert_eq!(
            text,
            "**Utility**\n`ping`: Pong.\n`help`: Lists commands.\n\n**Moderation**\n`warn`: Warn a user."
        );
        assert_eq!(grouped_help_description(&[]), "No commands available.");
    }

    #[test]
    fn details_include_aliases_and_subcommands() {
        let tag = described("tag", "Tags.")
            .with_aliases(&["t"])
            .with_signature("[name]")
            .with_child(described("create", "Make one.").with_signature("<name> <content>"));

        let text = command_help_description("?", &tag);
        assert!(text.starts_with("Tags.\n\n**Usage:** `?tag [name]`"));
        assert!(text.contains("**Aliases:** `t`"));
        assert!(text.contains("`tag create <name> <content>`: Make one."));
    }
}
