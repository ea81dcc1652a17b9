use tracing::{info, warn};

use poise::serenity_prelude as serenity;

use hearth_core::Data;
use hearth_database::impls::guild_settings::get_guild_settings;
use hearth_utils::embed::DEFAULT_EMBED_COLOR;
use hearth_utils::formatting::ordinal;

pub fn welcome_description(display_name: &str, member_count: Option<u64>) -> String {
    let mut text = format!("**Welcome {display_name} to the server!**");
    if let Some(count) = member_count {
        text.push_str(&format!("\n\nYou are our {} member.", ordinal(count)));
    }
    text
}

/// Greet a new member and grant the configured autorole.
pub async fn handle_member_join(ctx: &serenity::Context, data: &Data, member: &serenity::Member) {
    let guild_id = member.guild_id;
    let settings = match get_guild_settings(&data.db, guild_id.get()).await {
        Ok(settings) => settings,
        Err(source) => {
            warn!(?source, guild_id = guild_id.get(), "failed to load welcome settings");
            return;
        }
    };

    match settings.welcome_channel_id {
        Some(channel_id) => send_welcome(ctx, member, serenity::ChannelId::new(channel_id)).await,
        None => info!(guild_id = guild_id.get(), "no welcome channel configured; skipping greeting"),
    }

    match settings.autorole_id {
        Some(role_id) => {
            let role_id = serenity::RoleId::new(role_id);
            match member.add_role(&ctx.http, role_id).await {
                Ok(()) => info!(
                    guild_id = guild_id.get(),
                    user_id = member.user.id.get(),
                    role_id = role_id.get(),
                    "autorole granted"
                ),
                Err(source) => warn!(
                    ?source,
                    guild_id = guild_id.get(),
                    role_id = role_id.get(),
                    "failed to grant autorole"
                ),
            }
        }
        None => info!(guild_id = guild_id.get(), "no autorole configured; skipping"),
    }
}

async fn send_welcome(ctx: &serenity::Context, member: &serenity::Member, channel_id: serenity::ChannelId) {
    let member_count = ctx.cache.guild(member.guild_id).map(|guild| guild.member_count);

    let embed = serenity::CreateEmbed::new()
        .description(welcome_description(member.display_name(), member_count))
        .thumbnail(member.user.face())
        .color(DEFAULT_EMBED_COLOR)
        .timestamp(serenity::Timestamp::now());

    let message = serenity::CreateMessage::new()
        .content(format!("<@{}>", member.user.id.get()))
        .embed(embed);

    if let Err(source) = channel_id.send_message(&ctx.http, message).await {
        warn!(?source, guild_id = member.guild_id.get(), "failed to send welcome message");
    }
}

#[cfg(test)]
mod tests {
    use super::welcome_description;

    #[test]
    fn mentions_member_position() {
        assert_eq!(
            welcome_description("Sam", Some(23)),
            "**Welcome Sam to the server!**\n\nYou are our 23rd member."
        );
    }

    #[test]
    fn omits_count_when_unknown() {
        assert_eq!(welcome_description("Sam", None), "**Welcome Sam to the server!**");
    }
}
