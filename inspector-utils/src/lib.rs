/// Confirm/decline button prompts.
pub mod confirmation;
/// Embed builders and colors shared across commands.
pub mod embed;
/// Duration, byte and text formatting.
pub mod formatting;
/// Button driven embed pagination.
pub mod pagination;
/// Pure parser helpers.
pub mod parse;
/// Permission helper utilities.
pub mod permissions;
/// Command lookup by name, alias and prefix.
pub mod registry;
/// Clock and date parsing helpers.
pub mod time;
