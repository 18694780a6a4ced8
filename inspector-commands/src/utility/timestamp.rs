use chrono::Utc;

use crate::replies::usage_message;
use inspector_core::{Context, Error};
use inspector_utils::embed::info_embed;
use inspector_utils::time::{TIMESTAMP_STYLES, discord_timestamp, parse_when};

/// Turn a date or relative time into Discord timestamp markup.
#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn timestamp(
    ctx: Context<'_>,
    #[description = "Unix time, 2024-01-31 [12:00], RFC 3339 or a duration like 2h30m"]
    #[rest]
    when: Option<String>,
) -> Result<(), Error> {
    let Some(raw) = when else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    let Some(parsed) = parse_when(&raw, Utc::now()) else {
        ctx.say("I couldn't understand that time. Try `2024-01-31 18:00`, `1706724000` or `in 2h`.")
            .await?;
        return Ok(());
    };

    let embed = info_embed(
        format!("{} UTC", parsed.format("%Y-%m-%d %H:%M:%S")),
        timestamp_table(parsed.timestamp()),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

fn timestamp_table(unix_secs: i64) -> String {
    TIMESTAMP_STYLES
        .iter()
        .map(|(style, label)| {
            let markup = discord_timestamp(unix_secs, *style);
            format!("{label}: {markup} `{markup}`")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::timestamp_table;

    #[test]
    fn lists_every_style() {
        let table = timestamp_table(1_700_000_000);
        assert_eq!(table.lines().count(), 7);
        assert!(table.starts_with("Short time: <t:1700000000:t> `<t:1700000000:t>`"));
        assert!(table.ends_with("Relative: <t:1700000000:R> `<t:1700000000:R>`"));
    }
}
