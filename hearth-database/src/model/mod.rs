pub mod guild_settings;
pub mod levels;
pub mod tickets;
pub mod warnings;
