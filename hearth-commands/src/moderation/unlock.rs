use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::lock::{LockChange, apply_lock_change};
use hearth_core::{Context, Error};

pub const META: CommandMeta = CommandMeta {
    name: "unlock",
    desc: "Let @everyone send messages in a locked channel again.",
    category: "moderation",
    usage: "!unlock [#channel] [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn unlock(
    ctx: Context<'_>,
    #[description = "Channel to unlock (defaults to this one)"] channel: Option<serenity::GuildChannel>,
    #[description = "Reason for the unlock"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    apply_lock_change(ctx, channel, reason, LockChange::Unlock).await
}
