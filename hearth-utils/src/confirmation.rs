use std::time::Duration;

use poise::serenity_prelude as serenity;

pub const CONFIRMATION_TIMEOUT_SECS: u64 = 30;

pub struct ConfirmationText<'a> {
    pub timed_out: &'a str,
    pub declined: &'a str,
    pub processing: &'a str,
}

/// Ask the invoker to confirm with buttons and resolve the prompt message.
///
/// Returns `true` only when the invoker pressed Confirm before the timeout.
pub async fn confirm_action<U, E>(
    ctx: poise::Context<'_, U, E>,
    embed: serenity::CreateEmbed,
    text: ConfirmationText<'_>,
) -> Result<bool, serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    let ctx_id = ctx.id();
    let confirm_id = format!("{ctx_id}_confirm");
    let decline_id = format!("{ctx_id}_decline");

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(embed)
                .components(vec![serenity::CreateActionRow::Buttons(vec![
                    serenity::CreateButton::new(&confirm_id)
                        .label("Confirm")
                        .style(serenity::ButtonStyle::Danger),
                    serenity::CreateButton::new(&decline_id)
                        .label("Cancel")
                        .style(serenity::ButtonStyle::Secondary),
                ])]),
        )
        .await?;

    let message = reply.message().await?.into_owned();
    let interaction = message
        .await_component_interaction(ctx)
        .author_id(ctx.author().id)
        .timeout(Duration::from_secs(CONFIRMATION_TIMEOUT_SECS))
        .await;

    let Some(interaction) = interaction else {
        message
            .channel_id
            .edit_message(
                ctx.http(),
                message.id,
                serenity::EditMessage::new()
                    .content(text.timed_out)
                    .embeds(vec![])
                    .components(vec![]),
            )
            .await?;
        return Ok(false);
    };

    let confirmed = interaction.data.custom_id == confirm_id;
    let content = if confirmed { text.processing } else { text.declined };

    interaction
        .create_response(
            ctx.http(),
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await?;

    Ok(confirmed)
}
