use tokio::time::{Duration, sleep};
use tracing::{error, warn};

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::components::respond_ephemeral;
use crate::leveling::embeds::{
    drop_button_row, drop_claimed_embed, drop_closed_row, drop_expired_embed, drop_open_embed,
};
use crate::moderation::{ensure_invoker_permission, guild_only_message, usage_message};
use hearth_core::drops::{ClaimOutcome, DROP_LIFETIME_SECS};
use hearth_core::{Context, Data, Error};
use hearth_database::impls::levels::adjust_xp;
use hearth_utils::time::now_unix_secs;

pub const META: CommandMeta = CommandMeta {
    name: "dropxp",
    desc: "Drop XP in the channel for the first member to claim it.",
    category: "leveling",
    usage: "!dropxp <amount 1-10000>",
};

const MAX_DROP_AMOUNT: u64 = 10_000;

#[poise::command(prefix_command, slash_command, category = "Leveling")]
pub async fn dropxp(
    ctx: Context<'_>,
    #[description = "Amount of XP to drop"] amount: Option<u64>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_invoker_permission(
        &ctx,
        guild_id,
        serenity::Permissions::MANAGE_MESSAGES,
        "Manage Messages",
    )
    .await?
    {
        return Ok(());
    }

    let Some(amount) = amount else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if !(1..=MAX_DROP_AMOUNT).contains(&amount) {
        ctx.say("Drops must be between 1 and 10000 XP.").await?;
        return Ok(());
    }

    let now = now_unix_secs();
    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(drop_open_embed(amount, now + DROP_LIFETIME_SECS))
                .components(vec![drop_button_row(amount)]),
        )
        .await?;
    let message = reply.message().await?.into_owned();

    let drops = ctx.data().drops.clone();
    drops.register(message.id, amount, now).await;

    let http = ctx.serenity_context().http.clone();
    tokio::spawn(async move {
        sleep(Duration::from_secs(DROP_LIFETIME_SECS)).await;
        let Some(expired) = drops.expire(message.id).await else {
            return;
        };

        let edit = serenity::EditMessage::new()
            .embed(drop_expired_embed(expired.amount))
            .components(vec![drop_closed_row("Expired")]);
        if let Err(source) = message.channel_id.edit_message(&http, message.id, edit).await {
            warn!(?source, message_id = message.id.get(), "failed to mark xp drop expired");
        }
    });

    Ok(())
}

/// Button handler for the claim button on a drop message.
pub async fn handle_claim_button(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::ComponentInteraction,
) -> Result<(), Error> {
    let Some(guild_id) = interaction.guild_id else {
        return Ok(());
    };

    let message_id = interaction.message.id;
    let user_id = interaction.user.id;
    let outcome = data.drops.claim(message_id, user_id, now_unix_secs()).await;

    let amount = match outcome {
        ClaimOutcome::Claimed { amount } => amount,
        ClaimOutcome::AlreadyClaimed { by } => {
            return respond_ephemeral(ctx, interaction, format!("Already claimed by <@{}>.", by.get()))
                .await;
        }
        ClaimOutcome::Expired | ClaimOutcome::Unknown => {
            return respond_ephemeral(ctx, interaction, "This drop has expired.").await;
        }
    };

    let delta = i64::try_from(amount)?;
    if let Err(source) = adjust_xp(&data.db, guild_id.get(), user_id.get(), delta).await {
        error!(?source, "failed to store claimed xp drop");
        data.drops.release(message_id, user_id).await;
        return respond_ephemeral(ctx, interaction, "Something went wrong, try again.").await;
    }

    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .embed(drop_claimed_embed(amount, user_id))
                    .components(vec![drop_closed_row("Claimed")]),
            ),
        )
        .await?;

    interaction
        .create_followup(
            &ctx.http,
            serenity::CreateInteractionResponseFollowup::new()
                .content(format!("+{amount} XP!"))
                .ephemeral(true),
        )
        .await?;

    Ok(())
}
