use poise::serenity_prelude as serenity;

use hearth_core::Context;

/// Voice channel the invoker is connected to, from the gateway cache.
pub(crate) fn invoker_voice_channel(ctx: &Context<'_>) -> Option<serenity::ChannelId> {
    let guild = ctx.guild()?;
    guild
        .voice_states
        .get(&ctx.author().id)
        .and_then(|state| state.channel_id)
}

/// Whether the bot may connect and speak in `channel_id`.
///
/// Returns `None` when the guild, channel or bot member is not cached.
pub(crate) fn bot_can_speak_in(ctx: &Context<'_>, channel_id: serenity::ChannelId) -> Option<bool> {
    let guild = ctx.guild()?;
    let channel = guild.channels.get(&channel_id)?;
    let member = guild.members.get(&ctx.framework().bot_id)?;
    let permissions = guild.user_permissions_in(channel, member);

    Some(permissions.contains(serenity::Permissions::CONNECT | serenity::Permissions::SPEAK))
}
