use std::time::Instant;

use inspector_core::{Context, Error};

/// Replies with Pong! and the round trip time.
#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let started = Instant::now();
    let reply = ctx.say("Pong!").await?;
    let elapsed = started.elapsed().as_millis();

    let gateway = ctx.ping().await.as_millis();
    reply
        .edit(
            ctx,
            poise::CreateReply::default().content(format!(
                "Pong! Message: `{elapsed}ms` • Gateway: `{gateway}ms`"
            )),
        )
        .await?;

    Ok(())
}
