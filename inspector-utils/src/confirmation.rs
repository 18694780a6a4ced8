use std::time::Duration;

use poise::serenity_prelude as serenity;

/// How long a destructive command waits for its confirm button.
pub const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);

const PROMPT_TEXT: &str = "Are you sure? This cannot be undone.";
const TIMED_OUT_TEXT: &str = "Timed out, nothing was changed.";
const DECLINED_TEXT: &str = "Cancelled, nothing was changed.";

/// Button ids scoped to one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
struct PromptIds {
    confirm: String,
    decline: String,
}

impl PromptIds {
    fn for_invocation(invocation_id: u64) -> Self {
        Self {
            confirm: format!("{invocation_id}_confirm"),
            decline: format!("{invocation_id}_decline"),
        }
    }

    fn buttons(&self) -> serenity::CreateActionRow {
        serenity::CreateActionRow::Buttons(vec![
            serenity::CreateButton::new(&self.confirm)
                .label("Confirm")
                .style(serenity::ButtonStyle::Danger),
            serenity::CreateButton::new(&self.decline)
                .label("Decline")
                .style(serenity::ButtonStyle::Secondary),
        ])
    }

    fn is_confirm(&self, custom_id: &str) -> bool {
        custom_id == self.confirm
    }
}

/// Ask the author to confirm `embed`, then acknowledge the outcome in place.
///
/// Returns the confirming interaction with `processing_text` already shown,
/// or `None` when the author declined or let the prompt expire. The prompt
/// message is left without buttons in every case.
pub async fn confirm_action<U, E>(
    ctx: poise::Context<'_, U, E>,
    embed: serenity::CreateEmbed,
    processing_text: &str,
) -> Result<Option<serenity::ComponentInteraction>, serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    let ids = PromptIds::for_invocation(ctx.id());

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .content(PROMPT_TEXT)
                .embed(embed)
                .components(vec![ids.buttons()]),
        )
        .await?;
    let message = reply.message().await?.into_owned();

    let Some(press) = message
        .await_component_interaction(ctx)
        .author_id(ctx.author().id)
        .timeout(CONFIRMATION_TIMEOUT)
        .await
    else {
        message
            .channel_id
            .edit_message(
                ctx.http(),
                message.id,
                serenity::EditMessage::new()
                    .content(TIMED_OUT_TEXT)
                    .embeds(vec![])
                    .components(vec![]),
            )
            .await?;
        return Ok(None);
    };

    let confirmed = ids.is_confirm(&press.data.custom_id);
    let text = if confirmed { processing_text } else { DECLINED_TEXT };

    press
        .create_response(
            ctx.http(),
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .content(text)
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await?;

    Ok(confirmed.then_some(press))
}

#[cfg(test)]
mod tests {
    use super::PromptIds;

    #[test]
    fn ids_are_scoped_to_the_invocation() {
        let ids = PromptIds::for_invocation(77);
        assert_eq!(ids.confirm, "77_confirm");
        assert_eq!(ids.decline, "77_decline");

        assert!(ids.is_confirm("77_confirm"));
        assert!(!ids.is_confirm("77_decline"));
        assert!(!ids.is_confirm("78_confirm"));
    }
}
