use std::any::Any;

use poise::serenity_prelude as serenity;
use tracing::info;

use crate::replies::usage_message;
use inspector_core::{Context, Error};

/// Run a command as another member.
#[poise::command(prefix_command, owners_only, hide_in_help, guild_only, category = "Owner")]
pub async fn su(
    ctx: Context<'_>,
    #[description = "Member to act as"] member: serenity::Member,
    #[description = "Command and arguments, without a prefix"]
    #[rest]
    command: Option<String>,
) -> Result<(), Error> {
    let poise::Context::Prefix(prefix_ctx) = ctx else {
        return Ok(());
    };
    let Some(command) = command
        .map(|command| command.trim().to_owned())
        .filter(|command| !command.is_empty())
    else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    if ctx.data().commands.resolve(&command).is_none() {
        let name = command.split_whitespace().next().unwrap_or_default();
        ctx.say(format!("Command \"{name}\" is not found.")).await?;
        return Ok(());
    }

    info!(
        owner_id = ctx.author().id.get(),
        target_id = member.user.id.get(),
        %command,
        "running command as another member"
    );

    let msg = impersonated_message(prefix_ctx.msg, &member.user, prefix_ctx.prefix, &command);
    let invocation_data = tokio::sync::Mutex::new(Box::new(()) as Box<dyn Any + Send + Sync>);
    let mut parent_commands = Vec::new();

    if let Err(error) = poise::dispatch_message(
        ctx.framework(),
        ctx.serenity_context(),
        &msg,
        poise::MessageDispatchTrigger::MessageCreate,
        &invocation_data,
        &mut parent_commands,
    )
    .await
    {
        error.handle(ctx.framework().options).await;
    }

    Ok(())
}

/// Copy of `original` authored by `user` with `prefix` + `command` as content.
fn impersonated_message(
    original: &serenity::Message,
    user: &serenity::User,
    prefix: &str,
    command: &str,
) -> serenity::Message {
    let mut msg = original.clone();
    msg.author = user.clone();
    msg.member = None;
    msg.content = format!("{prefix}{command}");
    msg
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::impersonated_message;

    #[test]
    fn impersonation_swaps_author_and_content() {
        let mut original = serenity::Message::default();
        original.id = serenity::MessageId::new(5);
        original.author.id = serenity::UserId::new(1);
        original.content = "?su @someone tag list".to_owned();

        let mut target = serenity::User::default();
        target.id = serenity::UserId::new(2);

        let msg = impersonated_message(&original, &target, "?", "tag list");
        assert_eq!(msg.author.id, target.id);
        assert_eq!(msg.content, "?tag list");
        assert_eq!(msg.id, original.id);
        assert!(msg.member.is_none());
    }
}
