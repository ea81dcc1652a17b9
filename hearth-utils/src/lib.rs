/// Message deletion helpers for channel cleanups.
pub mod cleanup;
/// Shared confirmation prompt helpers.
pub mod confirmation;
/// Generic embed builders shared across commands.
pub mod embed;
/// Shared formatting helpers (durations, counts, ordinals).
pub mod formatting;
/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '!';
/// Level curve and progress maths.
pub mod leveling;
/// Shared pagination helper utilities.
pub mod pagination;
/// Pure parser helpers.
pub mod parse;
/// Permission and role hierarchy helpers.
pub mod permissions;
/// Shared time helpers.
pub mod time;
