use poise::serenity_prelude as serenity;

use inspector_core::{Context, Error};

pub const SOURCE_URL: &str = "https://github.com/itsVale/code-inspector";

/// Permissions requested by the invite link.
pub fn invite_permissions() -> serenity::Permissions {
    serenity::Permissions::SEND_MESSAGES
        | serenity::Permissions::EMBED_LINKS
        | serenity::Permissions::ADD_REACTIONS
        | serenity::Permissions::ATTACH_FILES
        | serenity::Permissions::USE_EXTERNAL_EMOJIS
        | serenity::Permissions::CREATE_INSTANT_INVITE
        | serenity::Permissions::MANAGE_MESSAGES
        | serenity::Permissions::READ_MESSAGE_HISTORY
}

pub fn invite_url(bot_id: u64, permissions: serenity::Permissions) -> String {
    format!(
        "https://discord.com/api/oauth2/authorize?client_id={}&permissions={}&scope=bot%20applications.commands",
        bot_id,
        permissions.bits()
    )
}

/// Link to the bot's source code.
#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn source(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(format!("<{SOURCE_URL}>")).await?;
    Ok(())
}

/// Invite the bot to your server.
#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn invite(ctx: Context<'_>) -> Result<(), Error> {
    let url = invite_url(ctx.framework().bot_id.get(), invite_permissions());
    ctx.say(format!("Invite me with <{url}>")).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{invite_permissions, invite_url};

    #[test]
    fn invite_url_carries_permission_bits() {
        let permissions = invite_permissions();
        let url = invite_url(1234, permissions);

        assert!(url.starts_with("https://discord.com/api/oauth2/authorize?client_id=1234&"));
        assert!(url.contains(&format!("permissions={}", permissions.bits())));
        assert!(url.ends_with("scope=bot%20applications.commands"));
        assert!(!permissions.contains(poise::serenity_prelude::Permissions::ADMINISTRATOR));
    }
}
