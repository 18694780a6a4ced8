use inspector_core::{Context, Error};

use crate::replies::usage_message;

/// Show usage syntax for a command or subcommand.
#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn usage(
    ctx: Context<'_>,
    #[description = "Command name, e.g. `tag create`"]
    #[rest]
    command: Option<String>,
) -> Result<(), Error> {
    let Some(raw_name) = command.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) else {
        ctx.say(usage_message(ctx)).await?;
        return Ok(());
    };

    let lookup = raw_name.trim_start_matches(ctx.prefix()).trim_start();

    match ctx.data().commands.resolve(lookup) {
        Some(resolved) => {
            ctx.say(format!("Usage: `{}{}`", ctx.prefix(), resolved.node.usage()))
                .await?;
        }
        None => {
            ctx.say(format!("Unknown command: `{}`", lookup.replace('`', "")))
                .await?;
        }
    }

    Ok(())
}
