use rand::Rng;
use tracing::{error, warn};

use poise::serenity_prelude as serenity;

use hearth_commands::leveling::embeds::level_up_message;
use hearth_core::Data;
use hearth_database::impls::levels::award_message_xp;
use hearth_utils::leveling::level_for_xp;
use hearth_utils::time::now_unix_secs;

const MESSAGE_XP_MIN: u64 = 10;
const MESSAGE_XP_MAX: u64 = 20;
const MESSAGE_XP_COOLDOWN_SECS: u64 = 60;

/// Award message XP and announce level-ups in the message's channel.
pub async fn handle_message_xp(ctx: &serenity::Context, data: &Data, message: &serenity::Message) {
    if message.author.bot || message.webhook_id.is_some() {
        return;
    }

    let Some(guild_id) = message.guild_id else {
        return;
    };

    let amount = rand::thread_rng().gen_range(MESSAGE_XP_MIN..=MESSAGE_XP_MAX);
    let award = award_message_xp(
        &data.db,
        guild_id.get(),
        message.author.id.get(),
        amount,
        now_unix_secs(),
        MESSAGE_XP_COOLDOWN_SECS,
    )
    .await;

    let change = match award {
        Ok(Some(change)) => change,
        Ok(None) => return,
        Err(source) => {
            error!(?source, guild_id = guild_id.get(), "failed to award message xp");
            return;
        }
    };

    let previous_level = level_for_xp(change.previous_xp);
    let new_level = level_for_xp(change.new_xp);
    if new_level <= previous_level {
        return;
    }

    if let Err(source) = message
        .channel_id
        .say(&ctx.http, level_up_message(message.author.id, new_level))
        .await
    {
        warn!(?source, guild_id = guild_id.get(), "failed to announce level up");
    }
}
