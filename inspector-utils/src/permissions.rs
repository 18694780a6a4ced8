use poise::serenity_prelude as serenity;

/// Convert a permission bitset into a sorted display list.
///
/// If `ADMINISTRATOR` is present, only `ADMINISTRATOR` is returned because
/// it implicitly grants all permissions.
pub fn permission_names(perms: serenity::Permissions) -> Vec<String> {
    if perms.contains(serenity::Permissions::ADMINISTRATOR) {
        return vec!["ADMINISTRATOR".to_owned()];
    }

    let mut names: Vec<String> = perms
        .iter_names()
        .map(|(name, _flag)| name.to_owned())
        .collect();
    names.sort_unstable();
    names
}

/// Human readable list, e.g. `Manage Messages, Embed Links`.
pub fn describe_permissions(perms: serenity::Permissions) -> String {
    permission_names(perms)
        .iter()
        .map(|name| {
            name.split('_')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => format!(
                            "{}{}",
                            first.to_ascii_uppercase(),
                            chars.as_str().to_ascii_lowercase()
                        ),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Guild-level permissions of a member: `@everyone` plus every role they hold.
///
/// The guild owner implicitly has everything.
pub fn member_permissions<'r>(
    guild_id: serenity::GuildId,
    is_owner: bool,
    member_roles: &[serenity::RoleId],
    roles: impl IntoIterator<Item = &'r serenity::Role>,
) -> serenity::Permissions {
    if is_owner {
        return serenity::Permissions::all();
    }

    let everyone = serenity::RoleId::new(guild_id.get());
    roles
        .into_iter()
        .filter(|role| role.id == everyone || member_roles.contains(&role.id))
        .fold(serenity::Permissions::empty(), |acc, role| acc | role.permissions)
}

/// Fetch the guild, member and roles over HTTP and resolve the member's permissions.
pub async fn resolve_user_permissions(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> anyhow::Result<serenity::Permissions> {
    let guild = guild_id.to_partial_guild(http).await?;
    let member = guild_id.member(http, user_id).await?;

    Ok(member_permissions(
        guild_id,
        guild.owner_id == user_id,
        &member.roles,
        guild.roles.values(),
    ))
}

pub async fn has_user_permission(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    required: serenity::Permissions,
) -> anyhow::Result<bool> {
    let perms = resolve_user_permissions(http, guild_id, user_id).await?;

    Ok(perms.contains(serenity::Permissions::ADMINISTRATOR) || perms.contains(required))
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::{describe_permissions, member_permissions, permission_names};

    #[test]
    fn administrator_hides_the_rest() {
        let perms = serenity::Permissions::ADMINISTRATOR | serenity::Permissions::KICK_MEMBERS;
        assert_eq!(permission_names(perms), vec!["ADMINISTRATOR".to_owned()]);
    }

    #[test]
    fn describes_in_title_case() {
        let perms = serenity::Permissions::MANAGE_MESSAGES | serenity::Permissions::EMBED_LINKS;
        assert_eq!(describe_permissions(perms), "Embed Links, Manage Messages");
        assert_eq!(describe_permissions(serenity::Permissions::empty()), "");
    }

    #[test]
    fn owner_has_everything() {
        let guild_id = serenity::GuildId::new(10);
        let perms = member_permissions(guild_id, true, &[], std::iter::empty());
        assert_eq!(perms, serenity::Permissions::all());

        let perms = member_permissions(guild_id, false, &[], std::iter::empty());
        assert!(perms.is_empty());
    }
}
