use poise::serenity_prelude as serenity;

use hearth_core::Data;

/// Keep music sessions in sync with voice state changes.
pub async fn handle_voice_state_update(
    ctx: &serenity::Context,
    data: &Data,
    old: Option<&serenity::VoiceState>,
    new: &serenity::VoiceState,
) {
    let Some(guild_id) = new.guild_id.or_else(|| old.and_then(|state| state.guild_id)) else {
        return;
    };

    let bot_id = ctx.cache.current_user().id;
    if new.user_id == bot_id {
        match new.channel_id {
            None => data.music.handle_bot_disconnected(guild_id).await,
            Some(channel_id) => {
                let previous = old.and_then(|state| state.channel_id);
                if previous.is_some_and(|previous| previous != channel_id) {
                    data.music.handle_bot_moved(guild_id, channel_id).await;
                    data.music
                        .check_channel_occupancy(guild_id, ctx.cache.clone())
                        .await;
                }
            }
        }
        return;
    }

    let left_channel = old.and_then(|state| state.channel_id);
    if left_channel.is_none() || left_channel == new.channel_id {
        return;
    }

    if data.music.voice_channel(guild_id).await == left_channel {
        data.music
            .check_channel_occupancy(guild_id, ctx.cache.clone())
            .await;
    }
}
