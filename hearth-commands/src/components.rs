use tracing::{debug, error};

use poise::serenity_prelude as serenity;

use crate::leveling::dropxp::handle_claim_button;
use crate::leveling::embeds::CLAIM_XP_BUTTON_ID;
use crate::tickets::buttons::{TicketButton, handle_ticket_button};
use hearth_core::{Data, Error};

const FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

pub(crate) async fn respond_ephemeral(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: impl Into<String>,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

/// Route a button press to its handler, answering ephemerally when it fails.
pub async fn handle_component(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::ComponentInteraction,
) {
    let custom_id = interaction.data.custom_id.as_str();

    let result = if custom_id == CLAIM_XP_BUTTON_ID {
        handle_claim_button(ctx, data, interaction).await
    } else if let Some(button) = TicketButton::from_custom_id(custom_id) {
        handle_ticket_button(ctx, data, interaction, button).await
    } else {
        // Collector-driven buttons (pagination, confirmations) land here too.
        debug!(custom_id, "component not routed");
        return;
    };

    let Err(source) = result else {
        return;
    };
    error!(?source, custom_id, "component handler failed");

    if respond_ephemeral(ctx, interaction, FAILURE_MESSAGE).await.is_ok() {
        return;
    }

    let followup = serenity::CreateInteractionResponseFollowup::new()
        .content(FAILURE_MESSAGE)
        .ephemeral(true);
    if let Err(source) = interaction.create_followup(&ctx.http, followup).await {
        debug!(?source, "could not report component failure");
    }
}
