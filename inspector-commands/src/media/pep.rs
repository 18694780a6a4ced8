use poise::serenity_prelude as serenity;
use scraper::{ElementRef, Html, Selector};

use crate::replies::usage_message;
use inspector_core::{Context, Error};
use tracing::debug;

const PYTHON_ICON: &str = "https://www.python.org/static/favicon.ico";
const PEP_EMBED_COLOR: u32 = 0x30_69_98;

/// Header fields of a PEP page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PepInfo {
    pub title: Option<String>,
    pub created: Option<String>,
    /// Remaining `(name, value)` pairs in page order.
    pub fields: Vec<(String, String)>,
}

pub fn pep_url(index: u32) -> String {
    format!("https://peps.python.org/pep-{index:04}/")
}

/// Show a Python Enhancement Proposal by number.
#[poise::command(prefix_command, slash_command, category = "Media")]
pub async fn pep(
    ctx: Context<'_>,
    #[description = "PEP number"] index: Option<u32>,
) -> Result<(), Error> {
    let Some(index) = index else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    ctx.defer().await?;

    let url = pep_url(index);
    let response = ctx.data().http_client.get(&url).send().await?;
    if response.status() != reqwest::StatusCode::OK {
        debug!(index, status = %response.status(), "pep lookup missed");
        ctx.say("There's no such PEP out there.").await?;
        return Ok(());
    }

    let html = response.text().await?;
    let info = parse_pep_fields(&html);

    let mut description = format!("**PEP:** {index}\n");
    for (name, value) in &info.fields {
        description.push_str(&format!("\n**{name}:** `{value}`"));
    }

    let mut embed = serenity::CreateEmbed::new()
        .title(info.title.unwrap_or_else(|| format!("PEP {index}")))
        .url(url)
        .color(PEP_EMBED_COLOR)
        .description(description);
    if let Some(created) = info.created {
        embed = embed.footer(
            serenity::CreateEmbedFooter::new(format!("Created: {created}")).icon_url(PYTHON_ICON),
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Read the RFC 2822 style header block of a PEP page.
///
/// Handles the current `dl.rfc2822` markup and the older
/// `table.rfc2822` field list.
pub fn parse_pep_fields(html: &str) -> PepInfo {
    let document = Html::parse_document(html);
    let mut info = PepInfo::default();

    for (name, value) in header_pairs(&document) {
        let name = name.trim_end_matches(':').trim().to_owned();
        if value.is_empty() {
            continue;
        }

        match name.as_str() {
            "PEP" => {}
            "Title" => info.title = Some(value),
            "Created" => info.created = Some(value),
            _ => info.fields.push((name, value)),
        }
    }

    info
}

fn header_pairs(document: &Html) -> Vec<(String, String)> {
    let (Ok(dt), Ok(dd)) = (
        Selector::parse("dl.rfc2822 > dt"),
        Selector::parse("dl.rfc2822 > dd"),
    ) else {
        return Vec::new();
    };

    let pairs: Vec<_> = document
        .select(&dt)
        .zip(document.select(&dd))
        .map(|(name, value)| (element_text(name), element_text(value)))
        .collect();
    if !pairs.is_empty() {
        return pairs;
    }

    let (Ok(row), Ok(th), Ok(td)) = (
        Selector::parse("table.rfc2822 tr.field"),
        Selector::parse("th"),
        Selector::parse("td"),
    ) else {
        return Vec::new();
    };

    document
        .select(&row)
        .filter_map(|row| {
            let name = row.select(&th).next()?;
            let value = row.select(&td).next()?;
            Some((element_text(name), element_text(value)))
        })
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{parse_pep_fields, pep_url};

    const MODERN: &str = r#"
<html><body><section>
<dl class="rfc2822 field-list simple">
<dt class="field-odd">PEP<span class="colon">:</span></dt>
<dd class="field-odd">8</dd>
<dt class="field-even">Title<span class="colon">:</span></dt>
<dd class="field-even">Style Guide for Python Code</dd>
<dt class="field-odd">Author<span class="colon">:</span></dt>
<dd class="field-odd"><a href="mailto:guido">Guido van Rossum</a>,
    Barry Warsaw</dd>
<dt class="field-even">Status<span class="colon">:</span></dt>
<dd class="field-even"><abbr>Active</abbr></dd>
<dt class="field-odd">Created<span class="colon">:</span></dt>
<dd class="field-odd">05-Jul-2001</dd>
</dl>
</section></body></html>
"#;

    const LEGACY: &str = r#"
<html><body>
<table class="rfc2822 docutils field-list"><tbody>
<tr class="field"><th class="field-name">PEP:</th><td class="field-body">20</td></tr>
<tr class="field"><th class="field-name">Title:</th><td class="field-body">The Zen of Python</td></tr>
<tr class="field"><th class="field-name">Status:</th><td class="field-body">Active</td></tr>
<tr class="field"><th class="field-name">Created:</th><td class="field-body">19-Aug-2004</td></tr>
</tbody></table>
</body></html>
"#;

    #[test]
    fn formats_urls() {
        assert_eq!(pep_url(8), "https://peps.python.org/pep-0008/");
        assert_eq!(pep_url(12345), "https://peps.python.org/pep-12345/");
    }

    #[test]
    fn parses_current_markup() {
        let info = parse_pep_fields(MODERN);

        assert_eq!(info.title.as_deref(), Some("Style Guide for Python Code"));
        assert_eq!(info.created.as_deref(), Some("05-Jul-2001"));
        assert_eq!(
            info.fields,
            vec![
                ("Author".to_owned(), "Guido van Rossum, Barry Warsaw".to_owned()),
                ("Status".to_owned(), "Active".to_owned()),
            ]
        );
    }

    #[test]
    fn parses_legacy_markup() {
        let info = parse_pep_fields(LEGACY);

        assert_eq!(info.title.as_deref(), Some("The Zen of Python"));
        assert_eq!(info.created.as_deref(), Some("19-Aug-2004"));
        assert_eq!(info.fields, vec![("Status".to_owned(), "Active".to_owned())]);
    }

    #[test]
    fn missing_header_is_empty() {
        assert_eq!(parse_pep_fields("<html><p>nothing</p></html>"), Default::default());
    }
}
