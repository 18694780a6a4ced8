use inspector_core::Context;

pub fn guild_only_message() -> &'static str {
    "This command only works in servers."
}

pub fn permission_denied_message() -> &'static str {
    "You don't have permission to use this command."
}

/// `Usage: `<prefix><path> <params>`` for the command being run.
pub fn usage_message(ctx: Context<'_>) -> String {
    ctx.data()
        .commands
        .usage_line(ctx.prefix(), &ctx.command().qualified_name)
}
