use poise::serenity_prelude as serenity;

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x2F_6F_AB;
/// Color for failures and refusals.
pub const ERROR_EMBED_COLOR: u32 = 0xC0_39_2B;

pub fn info_embed(title: impl Into<String>, description: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .color(DEFAULT_EMBED_COLOR)
        .description(description)
}

pub fn error_embed(description: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .color(ERROR_EMBED_COLOR)
        .description(description)
}

/// Footer text for page `page` of `total_pages`, with an optional note appended.
pub fn page_footer(page: usize, total_pages: usize, note: Option<&str>) -> String {
    let page = page.max(1);
    let total_pages = total_pages.max(1);

    match (total_pages > 1, note.filter(|note| !note.is_empty())) {
        (true, Some(note)) => format!("Page {page}/{total_pages} • {note}"),
        (true, None) => format!("Page {page}/{total_pages}"),
        (false, Some(note)) => note.to_owned(),
        (false, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::page_footer;

    #[test]
    fn footer_variants() {
        assert_eq!(page_footer(2, 5, None), "Page 2/5");
        assert_eq!(page_footer(1, 3, Some("3 warnings")), "Page 1/3 • 3 warnings");
        assert_eq!(page_footer(1, 1, Some("3 warnings")), "3 warnings");
        assert_eq!(page_footer(1, 1, None), "");
        assert_eq!(page_footer(0, 0, Some("")), "");
    }
}
