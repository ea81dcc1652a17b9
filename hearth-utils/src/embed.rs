use poise::serenity_prelude as serenity;

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x90_55_30;
pub const SUCCESS_EMBED_COLOR: u32 = 0x57_F2_87;
pub const WARNING_EMBED_COLOR: u32 = 0xFE_E7_5C;
pub const ERROR_EMBED_COLOR: u32 = 0xED_42_45;

/// Untitled one-line status embed, colored by outcome.
pub fn status_embed(description: impl Into<String>, color: u32) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .description(description)
        .color(color)
}
