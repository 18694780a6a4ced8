use poise::serenity_prelude as serenity;

use crate::moderation::embeds::{target_profile_from_user, warning_entry};
use crate::moderation::moderator_guild;
use crate::replies::usage_message;
use inspector_core::{Context, Error};
use inspector_database::impls::warnings::list_warnings;
use inspector_utils::pagination::{PagedEmbed, paginate_lines, send_paged_embed};

const WARNINGS_PER_PAGE: usize = 5;

/// Show every warning recorded for a user, oldest first.
#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "The user to check"] user: Option<serenity::User>,
) -> Result<(), Error> {
    let Some(guild_id) = moderator_guild(ctx).await? else {
        return Ok(());
    };

    let Some(user) = user else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    let entries = list_warnings(&ctx.data().db, guild_id.get(), user.id.get()).await?;
    let target = target_profile_from_user(&user);

    let pages = if entries.is_empty() {
        vec!["No warnings on record.".to_owned()]
    } else {
        let lines: Vec<String> = entries.iter().map(warning_entry).collect();
        paginate_lines(&lines, WARNINGS_PER_PAGE)
    };
    let total_note = format!("{} warning(s) total", entries.len());

    send_paged_embed(
        ctx,
        PagedEmbed {
            title: &format!("Warnings for {}", target.display_name),
            pages: &pages,
            author_icon_url: target.avatar_url.as_deref(),
            footer_note: Some(&total_note),
            start_page: 1,
        },
    )
    .await?;

    Ok(())
}
