use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::debug;

use crate::embed::{DEFAULT_EMBED_COLOR, page_footer};

pub const PAGINATION_TIMEOUT_SECS: u64 = 60 * 3;

/// Discord rejects embed descriptions above 4096 characters.
pub const MAX_PAGE_CHARS: usize = 4000;

/// Embed pages plus the decoration shared by every page.
pub struct PagedEmbed<'a> {
    pub title: &'a str,
    pub pages: &'a [String],
    pub author_icon_url: Option<&'a str>,
    pub footer_note: Option<&'a str>,
    /// 1-based page shown first; clamped to the available pages.
    pub start_page: usize,
}

impl PagedEmbed<'_> {
    fn render(&self, index: usize) -> serenity::CreateEmbed {
        let total_pages = self.pages.len();
        let mut embed = serenity::CreateEmbed::new()
            .color(DEFAULT_EMBED_COLOR)
            .description(self.pages[index].clone());

        let footer = page_footer(index + 1, total_pages, self.footer_note);
        if !footer.is_empty() {
            embed = embed.footer(serenity::CreateEmbedFooter::new(footer));
        }

        match self.author_icon_url {
            Some(url) => embed.author(serenity::CreateEmbedAuthor::new(self.title).icon_url(url)),
            None => embed.title(self.title.to_owned()),
        }
    }
}

/// Group lines into pages of at most `per_page` lines and `MAX_PAGE_CHARS` characters.
pub fn paginate_lines<S: AsRef<str>>(lines: &[S], per_page: usize) -> Vec<String> {
    let per_page = per_page.max(1);
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for line in lines {
        let line = line.as_ref();
        let would_overflow = !current.is_empty()
            && current.chars().count() + 1 + line.chars().count() > MAX_PAGE_CHARS;

        if count == per_page || would_overflow {
            pages.push(std::mem::take(&mut current));
            count = 0;
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
        count += 1;
    }

    if !current.is_empty() {
        pages.push(current);
    }

    pages
}

/// Component ids for one paginated reply, scoped to the invocation.
#[derive(Clone, Debug)]
struct PageControls {
    scope: String,
    prev: String,
    jump: String,
    next: String,
    modal: String,
    input: String,
}

/// What a button press asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PageAction {
    Move(usize),
    Jump,
    Ignore,
}

impl PageControls {
    fn new(invocation_id: u64) -> Self {
        let scope = invocation_id.to_string();
        Self {
            prev: format!("{scope}_prev"),
            jump: format!("{scope}_jump"),
            next: format!("{scope}_next"),
            modal: format!("{scope}_jump_modal"),
            input: format!("{scope}_jump_input"),
            scope,
        }
    }

    fn owns(&self, custom_id: &str) -> bool {
        custom_id
            .strip_prefix(self.scope.as_str())
            .is_some_and(|rest| rest.starts_with('_'))
    }

    fn action(&self, custom_id: &str, current: usize, total_pages: usize) -> PageAction {
        if custom_id == self.next {
            PageAction::Move((current + 1).min(total_pages.saturating_sub(1)))
        } else if custom_id == self.prev {
            PageAction::Move(current.saturating_sub(1))
        } else if custom_id == self.jump {
            PageAction::Jump
        } else {
            PageAction::Ignore
        }
    }

    fn row(&self, current: usize, total_pages: usize) -> Vec<serenity::CreateActionRow> {
        let button = |id: &str, label: &str| {
            serenity::CreateButton::new(id)
                .label(label)
                .style(serenity::ButtonStyle::Secondary)
        };

        vec![serenity::CreateActionRow::Buttons(vec![
            button(&self.prev, "Prev").disabled(current == 0),
            button(&self.jump, "Jump"),
            button(&self.next, "Next").disabled(current + 1 >= total_pages),
        ])]
    }

    fn jump_modal(&self, total_pages: usize) -> serenity::CreateModal {
        serenity::CreateModal::new(&self.modal, "Jump to Page").components(vec![
            serenity::CreateActionRow::InputText(
                serenity::CreateInputText::new(
                    serenity::InputTextStyle::Short,
                    "Page Number",
                    &self.input,
                )
                .placeholder(format!("1-{total_pages}"))
                .required(true),
            ),
        ])
    }
}

/// Zero-based index for a 1-based page typed into the jump modal.
fn parse_jump_target(raw: &str, total_pages: usize) -> Option<usize> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|page| (1..=total_pages).contains(page))
        .map(|page| page - 1)
}

pub async fn paginate_embed_pages<U, E>(
    ctx: poise::Context<'_, U, E>,
    title: &str,
    pages: &[String],
    start_page: usize,
) -> Result<(), serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    send_paged_embed(
        ctx,
        PagedEmbed {
            title,
            pages,
            author_icon_url: None,
            footer_note: None,
            start_page,
        },
    )
    .await
}

/// Send `paged` and drive Prev/Jump/Next buttons until the collector times out.
pub async fn send_paged_embed<U, E>(
    ctx: poise::Context<'_, U, E>,
    paged: PagedEmbed<'_>,
) -> Result<(), serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    if paged.pages.is_empty() {
        return Ok(());
    }

    let total_pages = paged.pages.len();
    let mut current = paged.start_page.clamp(1, total_pages) - 1;

    if total_pages == 1 {
        ctx.send(poise::CreateReply::default().embed(paged.render(current)))
            .await?;
        return Ok(());
    }

    let controls = PageControls::new(ctx.id());
    let timeout = Duration::from_secs(PAGINATION_TIMEOUT_SECS);

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(paged.render(current))
                .components(controls.row(current, total_pages)),
        )
        .await?;
    let message = reply.message().await?;
    let (message_id, channel_id) = (message.id, message.channel_id);
    let author_id = ctx.author().id;

    while let Some(press) = serenity::collector::ComponentInteractionCollector::new(ctx)
        .filter({
            let controls = controls.clone();
            move |interaction| {
                controls.owns(&interaction.data.custom_id)
                    && interaction.user.id == author_id
                    && interaction.message.id == message_id
            }
        })
        .timeout(timeout)
        .await
    {
        match controls.action(&press.data.custom_id, current, total_pages) {
            PageAction::Move(page) => {
                current = page;
                press
                    .create_response(
                        ctx.http(),
                        serenity::CreateInteractionResponse::UpdateMessage(
                            serenity::CreateInteractionResponseMessage::new()
                                .embed(paged.render(current))
                                .components(controls.row(current, total_pages)),
                        ),
                    )
                    .await?;
            }
            PageAction::Jump => {
                press
                    .create_response(
                        ctx.http(),
                        serenity::CreateInteractionResponse::Modal(
                            controls.jump_modal(total_pages),
                        ),
                    )
                    .await?;

                let Some(modal) = serenity::collector::ModalInteractionCollector::new(ctx)
                    .author_id(author_id)
                    .channel_id(channel_id)
                    .custom_ids(vec![controls.modal.clone()])
                    .timeout(timeout)
                    .await
                else {
                    continue;
                };

                modal
                    .create_response(ctx.http(), serenity::CreateInteractionResponse::Acknowledge)
                    .await?;

                let target = modal
                    .data
                    .components
                    .iter()
                    .flat_map(|row| row.components.iter())
                    .find_map(|component| match component {
                        serenity::ActionRowComponent::InputText(input)
                            if input.custom_id == controls.input =>
                        {
                            input.value.as_deref()
                        }
                        _ => None,
                    })
                    .and_then(|raw| parse_jump_target(raw, total_pages));

                if let Some(page) = target {
                    current = page;
                    channel_id
                        .edit_message(
                            ctx.http(),
                            message_id,
                            serenity::EditMessage::new()
                                .embed(paged.render(current))
                                .components(controls.row(current, total_pages)),
                        )
                        .await?;
                }
            }
            PageAction::Ignore => {}
        }
    }

    if let Err(e) = channel_id
        .edit_message(
            ctx.http(),
            message_id,
            serenity::EditMessage::new()
                .embed(paged.render(current))
                .components(vec![]),
        )
        .await
    {
        debug!(?e, "failed to strip pagination buttons");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{MAX_PAGE_CHARS, PageAction, PageControls, paginate_lines, parse_jump_target};

    #[test]
    fn groups_by_line_count() {
        let lines: Vec<String> = (1..=5).map(|n| format!("line {n}")).collect();
        let pages = paginate_lines(&lines, 2);

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0], "line 1\nline 2");
        assert_eq!(pages[2], "line 5");
    }

    #[test]
    fn splits_oversized_pages() {
        let long = "x".repeat(MAX_PAGE_CHARS / 2 + 1);
        let pages = paginate_lines(&[long.as_str(), long.as_str(), "tail"], 10);

        assert_eq!(pages.len(), 2);
        assert!(pages[0].chars().count() <= MAX_PAGE_CHARS);
        assert!(pages[1].ends_with("tail"));
    }

    #[test]
    fn empty_input_has_no_pages() {
        let lines: [&str; 0] = [];
        assert!(paginate_lines(&lines, 5).is_empty());
    }

    #[test]
    fn button_presses_stay_in_range() {
        let controls = PageControls::new(5);

        assert_eq!(controls.action("5_next", 0, 3), PageAction::Move(1));
        assert_eq!(controls.action("5_next", 2, 3), PageAction::Move(2));
        assert_eq!(controls.action("5_prev", 0, 3), PageAction::Move(0));
        assert_eq!(controls.action("5_jump", 1, 3), PageAction::Jump);
        assert_eq!(controls.action("6_next", 0, 3), PageAction::Ignore);
        assert!(controls.owns("5_jump_modal"));
        assert!(!controls.owns("55_next"));
    }

    #[test]
    fn jump_targets_are_one_based() {
        assert_eq!(parse_jump_target(" 2 ", 3), Some(1));
        assert_eq!(parse_jump_target("0", 3), None);
        assert_eq!(parse_jump_target("4", 3), None);
        assert_eq!(parse_jump_target("two", 3), None);
    }
}
