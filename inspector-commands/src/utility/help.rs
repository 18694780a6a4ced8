use crate::utility::embeds::{
    command_help_description, grouped_help_description, page_out_of_range_message,
    unknown_query_message,
};
use inspector_core::{Context, Error};
use inspector_utils::embed::info_embed;
use inspector_utils::pagination::paginate_embed_pages;
use inspector_utils::registry::CommandNode;

const HELP_COMMANDS_PER_PAGE: usize = 20;

/// Lists commands, or explains one command or category.
#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command, category or page number"]
    #[rest]
    query: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();
    let show_hidden = data.is_owner(ctx.author().id.get());
    let query = query.as_deref().map(str::trim).filter(|raw| !raw.is_empty());

    let parsed_page = query.and_then(|raw| raw.parse::<usize>().ok().filter(|page| *page >= 1));

    if let Some(raw) = query
        && parsed_page.is_none()
    {
        if let Some(resolved) = data.commands.resolve(raw)
            && (show_hidden || !resolved.node.owners_only)
        {
            let embed = info_embed(
                resolved.node.qualified_name.clone(),
                command_help_description(ctx.prefix(), resolved.node),
            );
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
            return Ok(());
        }

        if let Some((category, nodes)) = data.commands.find_category(raw) {
            let entries = visible(&nodes, category, show_hidden);
            if !entries.is_empty() {
                let pages = help_pages(&entries);
                paginate_embed_pages(ctx, &format!("{category} Commands"), &pages, 1).await?;
                return Ok(());
            }
        }

        let categories: Vec<&str> = data
            .commands
            .categories()
            .into_iter()
            .filter(|(category, nodes)| !visible(nodes, category, show_hidden).is_empty())
            .map(|(category, _)| category)
            .collect();
        ctx.say(unknown_query_message(raw, &categories)).await?;
        return Ok(());
    }

    let entries: Vec<(&str, &CommandNode)> = data
        .commands
        .categories()
        .into_iter()
        .flat_map(|(category, nodes)| visible(&nodes, category, show_hidden))
        .collect();
    let pages = help_pages(&entries);

    let requested_page = parsed_page.unwrap_or(1);
    if requested_page > pages.len() {
        ctx.say(page_out_of_range_message(requested_page, pages.len()))
            .await?;
        return Ok(());
    }

    paginate_embed_pages(ctx, "Available Commands", &pages, requested_page).await?;

    Ok(())
}

fn visible<'a>(
    nodes: &[&'a CommandNode],
    category: &'a str,
    show_hidden: bool,
) -> Vec<(&'a str, &'a CommandNode)> {
    nodes
        .iter()
        .filter(|node| show_hidden || !node.owners_only)
        .map(|node| (category, *node))
        .collect()
}

fn help_pages(entries: &[(&str, &CommandNode)]) -> Vec<String> {
    let pages: Vec<String> = entries
        .chunks(HELP_COMMANDS_PER_PAGE)
        .map(grouped_help_description)
        .collect();

    if pages.is_empty() {
        vec![grouped_help_description(&[])]
    } else {
        pages
    }
}

#[cfg(test)]
mod tests {
    use inspector_utils::registry::CommandNode;

    use super::{help_pages, visible};

    #[test]
    fn hides_owner_commands() {
        let public = CommandNode::new("ping");
        let mut secret = CommandNode::new("shutdown");
        secret.owners_only = true;
        let nodes = vec![&public, &secret];

        assert_eq!(visible(&nodes, "Misc", false).len(), 1);
        assert_eq!(visible(&nodes, "Misc", true).len(), 2);
    }

    #[test]
    fn splits_pages() {
        let nodes: Vec<CommandNode> = (0..45).map(|n| CommandNode::new(format!("c{n}"))).collect();
        let entries: Vec<_> = nodes.iter().map(|node| ("Misc", node)).collect();

        assert_eq!(help_pages(&entries).len(), 3);
        assert_eq!(help_pages(&[]), vec!["No commands available.".to_owned()]);
    }
}
