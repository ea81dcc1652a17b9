use std::collections::{HashMap, HashSet};

use tracing::{error, info, warn};

use poise::serenity_prelude as serenity;

use crate::components::respond_ephemeral;
use crate::tickets::embeds::{
    CANCEL_CLOSE, CANCEL_DELETE, CLOSE_TICKET, CONFIRM_CLOSE, CONFIRM_DELETE, CREATE_TICKET,
    DELETE_TICKET, REOPEN_TICKET, TranscriptLogInfo, close_row, closed_actions_row, closed_embed,
    confirm_close_embed, confirm_close_row, confirm_delete_embed, confirm_delete_row,
    greeting_embed, reopened_embed, staff_notification_embed, transcript_dm_embed,
    transcript_log_embed,
};
use crate::tickets::naming::{closed_channel_name, open_channel_name, sanitize_display_name};
use crate::tickets::transcript::{
    TranscriptEntry, TranscriptHeader, fetch_all_messages, render_transcript, save_transcript,
    transcript_file_name,
};
use hearth_core::{Data, Error};
use hearth_database::impls::tickets::{
    count_open_tickets, get_ticket, get_ticket_config, insert_ticket_within_limit,
    mark_ticket_closed, mark_ticket_reopened, remove_ticket,
};
use hearth_database::model::tickets::{NewTicket, Ticket, TicketConfig, TicketStatus};
use hearth_utils::time::now_unix_secs;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketButton {
    Create,
    Close,
    ConfirmClose,
    CancelClose,
    Reopen,
    Delete,
    ConfirmDelete,
    CancelDelete,
}

impl TicketButton {
    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        Some(match custom_id {
            CREATE_TICKET => Self::Create,
            CLOSE_TICKET => Self::Close,
            CONFIRM_CLOSE => Self::ConfirmClose,
            CANCEL_CLOSE => Self::CancelClose,
            REOPEN_TICKET => Self::Reopen,
            DELETE_TICKET => Self::Delete,
            CONFIRM_DELETE => Self::ConfirmDelete,
            CANCEL_DELETE => Self::CancelDelete,
            _ => return None,
        })
    }
}

fn owner_permissions() -> serenity::Permissions {
    serenity::Permissions::VIEW_CHANNEL
        | serenity::Permissions::SEND_MESSAGES
        | serenity::Permissions::READ_MESSAGE_HISTORY
        | serenity::Permissions::ATTACH_FILES
        | serenity::Permissions::EMBED_LINKS
}

fn staff_permissions() -> serenity::Permissions {
    owner_permissions() | serenity::Permissions::MANAGE_MESSAGES
}

fn is_staff(interaction: &serenity::ComponentInteraction, config: &TicketConfig) -> bool {
    let Some(staff_role) = config.staff_role_id.map(serenity::RoleId::new) else {
        return false;
    };

    interaction
        .member
        .as_ref()
        .is_some_and(|member| member.roles.contains(&staff_role))
}

fn is_owner(interaction: &serenity::ComponentInteraction, ticket: &Ticket) -> bool {
    interaction.user.id.get() == ticket.user_id
}

async fn update_message(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: &str,
) -> Result<(), Error> {
    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .content(content)
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await?;
    Ok(())
}

async fn edit_deferred(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    content: impl Into<String>,
) -> Result<(), Error> {
    interaction
        .edit_response(
            &ctx.http,
            serenity::EditInteractionResponse::new().content(content),
        )
        .await?;
    Ok(())
}

/// Names of the guild's text channels, except `skip`.
fn text_channel_names(
    channels: &HashMap<serenity::ChannelId, serenity::GuildChannel>,
    skip: Option<serenity::ChannelId>,
) -> HashSet<String> {
    channels
        .values()
        .filter(|channel| channel.kind == serenity::ChannelType::Text && Some(channel.id) != skip)
        .map(|channel| channel.name.clone())
        .collect()
}

pub async fn handle_ticket_button(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::ComponentInteraction,
    button: TicketButton,
) -> Result<(), Error> {
    let Some(guild_id) = interaction.guild_id else {
        return respond_ephemeral(ctx, interaction, "Tickets only work inside a server.").await;
    };

    match button {
        TicketButton::Create => create_ticket(ctx, data, interaction, guild_id).await,
        TicketButton::CancelClose => update_message(ctx, interaction, "❌ Close cancelled.").await,
        TicketButton::CancelDelete => update_message(ctx, interaction, "❌ Deletion cancelled.").await,
        _ => {
            let Some(ticket) = get_ticket(&data.db, interaction.channel_id.get()).await? else {
                return respond_ephemeral(ctx, interaction, "❌ This is not a ticket channel.").await;
            };
            let config = get_ticket_config(&data.db, guild_id.get()).await?;

            match button {
                TicketButton::Close => request_close(ctx, interaction, &ticket, &config).await,
                TicketButton::ConfirmClose => {
                    confirm_close(ctx, data, interaction, guild_id, &ticket, &config).await
                }
                TicketButton::Reopen => {
                    reopen_ticket(ctx, data, interaction, guild_id, &ticket, &config).await
                }
                TicketButton::Delete => request_delete(ctx, interaction, &config).await,
                TicketButton::ConfirmDelete => confirm_delete(ctx, data, interaction, &config).await,
                TicketButton::Create | TicketButton::CancelClose | TicketButton::CancelDelete => Ok(()),
            }
        }
    }
}

async fn create_ticket(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::ComponentInteraction,
    guild_id: serenity::GuildId,
) -> Result<(), Error> {
    interaction.defer_ephemeral(&ctx.http).await?;

    let config = get_ticket_config(&data.db, guild_id.get()).await?;
    let channels = guild_id.channels(&ctx.http).await?;

    let Some(category_id) = config
        .category_id
        .map(serenity::ChannelId::new)
        .filter(|id| {
            channels
                .get(id)
                .is_some_and(|channel| channel.kind == serenity::ChannelType::Category)
        })
    else {
        return edit_deferred(ctx, interaction, "❌ The ticket category is missing. Ask an admin to run `ticketconfig`.").await;
    };

    let roles = guild_id.roles(&ctx.http).await?;
    let Some(staff_role) = config
        .staff_role_id
        .map(serenity::RoleId::new)
        .filter(|id| roles.contains_key(id))
    else {
        return edit_deferred(ctx, interaction, "❌ The staff role is missing. Ask an admin to run `ticketconfig`.").await;
    };

    let user = &interaction.user;
    let creation = data.ticket_locks.acquire(guild_id, user.id).await;
    let open = count_open_tickets(&data.db, guild_id.get(), user.id.get()).await?;
    if open >= config.max_open_per_user {
        return edit_deferred(ctx, interaction, open_limit_message(config.max_open_per_user)).await;
    }

    let display_name = interaction
        .member
        .as_ref()
        .map(|member| member.display_name().to_owned())
        .unwrap_or_else(|| user.name.clone());
    let sanitized = sanitize_display_name(&display_name);
    let channel_name = open_channel_name(&sanitized, &text_channel_names(&channels, None));

    let overwrites = vec![
        serenity::PermissionOverwrite {
            allow: serenity::Permissions::empty(),
            deny: serenity::Permissions::VIEW_CHANNEL,
            kind: serenity::PermissionOverwriteType::Role(serenity::RoleId::new(guild_id.get())),
        },
        serenity::PermissionOverwrite {
            allow: owner_permissions(),
            deny: serenity::Permissions::empty(),
            kind: serenity::PermissionOverwriteType::Member(user.id),
        },
        serenity::PermissionOverwrite {
            allow: staff_permissions(),
            deny: serenity::Permissions::empty(),
            kind: serenity::PermissionOverwriteType::Role(staff_role),
        },
    ];

    let channel = guild_id
        .create_channel(
            &ctx.http,
            serenity::CreateChannel::new(&channel_name)
                .kind(serenity::ChannelType::Text)
                .category(category_id)
                .permissions(overwrites),
        )
        .await?;

    let record = NewTicket {
        channel_id: channel.id.get(),
        guild_id: guild_id.get(),
        user_id: user.id.get(),
        display_name: &display_name,
        sanitized_name: &sanitized,
        created_at: now_unix_secs(),
    };
    let inserted = insert_ticket_within_limit(&data.db, record, config.max_open_per_user).await;
    if !matches!(inserted, Ok(true)) {
        if let Err(cleanup) = channel.id.delete(&ctx.http).await {
            warn!(?cleanup, channel_id = channel.id.get(), "failed to remove orphaned ticket channel");
        }
        return match inserted {
            Err(source) => Err(source),
            Ok(_) => edit_deferred(ctx, interaction, open_limit_message(config.max_open_per_user)).await,
        };
    }
    drop(creation);

    info!(
        guild_id = guild_id.get(),
        channel_id = channel.id.get(),
        user_id = user.id.get(),
        "ticket created"
    );

    channel
        .id
        .send_message(
            &ctx.http,
            serenity::CreateMessage::new()
                .content(format!("<@{}>", user.id.get()))
                .embed(greeting_embed())
                .components(vec![close_row()]),
        )
        .await?;

    edit_deferred(ctx, interaction, format!("✅ Ticket created: <#{}>", channel.id.get())).await?;

    notify_staff(ctx, &config, guild_id, channel.id, user.id, staff_role).await;
    Ok(())
}

fn open_limit_message(max_open: u32) -> String {
    format!("❌ You already have {max_open} open tickets!")
}

async fn notify_staff(
    ctx: &serenity::Context,
    config: &TicketConfig,
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
    author: serenity::UserId,
    staff_role: serenity::RoleId,
) {
    let Some(notify_channel) = config.notification_channel_id.map(serenity::ChannelId::new) else {
        warn!(guild_id = guild_id.get(), "ticket notification channel not configured");
        return;
    };

    let message = serenity::CreateMessage::new()
        .content(format!("<@&{}>", staff_role.get()))
        .embed(staff_notification_embed(guild_id, channel_id, author))
        .allowed_mentions(serenity::CreateAllowedMentions::new().roles(vec![staff_role]));

    if let Err(source) = notify_channel.send_message(&ctx.http, message).await {
        warn!(?source, guild_id = guild_id.get(), "failed to notify staff about new ticket");
    }
}

async fn request_close(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    ticket: &Ticket,
    config: &TicketConfig,
) -> Result<(), Error> {
    if ticket.status == TicketStatus::Closed {
        return respond_ephemeral(ctx, interaction, "This ticket is already closed.").await;
    }
    if !is_owner(interaction, ticket) && !is_staff(interaction, config) {
        return respond_ephemeral(ctx, interaction, "❌ You can't close this ticket.").await;
    }

    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .embed(confirm_close_embed())
                    .components(vec![confirm_close_row()])
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

async fn confirm_close(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::ComponentInteraction,
    guild_id: serenity::GuildId,
    ticket: &Ticket,
    config: &TicketConfig,
) -> Result<(), Error> {
    if !is_owner(interaction, ticket) && !is_staff(interaction, config) {
        return respond_ephemeral(ctx, interaction, "❌ You can't close this ticket.").await;
    }

    let closed_at = now_unix_secs();
    let channel_id = interaction.channel_id;
    let closer = &interaction.user;

    if !mark_ticket_closed(&data.db, channel_id.get(), closer.id.get(), closed_at).await? {
        return update_message(ctx, interaction, "This ticket is already closed.").await;
    }
    if let Err(source) = update_message(ctx, interaction, "🔒 Closing the ticket...").await {
        warn!(?source, channel_id = channel_id.get(), "failed to acknowledge ticket close");
    }

    let mut report = CloseReport::default();

    if let Err(source) = archive_transcript(ctx, data, guild_id, ticket, config, closer, closed_at).await {
        error!(?source, channel_id = channel_id.get(), "failed to create ticket transcript");
        report.transcript_failed = true;
    }

    let revoke = channel_id
        .create_permission(
            &ctx.http,
            serenity::PermissionOverwrite {
                allow: serenity::Permissions::empty(),
                deny: serenity::Permissions::VIEW_CHANNEL | serenity::Permissions::SEND_MESSAGES,
                kind: serenity::PermissionOverwriteType::Member(serenity::UserId::new(ticket.user_id)),
            },
        )
        .await;
    if let Err(source) = revoke {
        warn!(?source, channel_id = channel_id.get(), "failed to revoke ticket owner access");
        report.access_kept = true;
    }

    let mut edit = serenity::EditChannel::new().name(closed_channel_name(&ticket.sanitized_name));
    if let Some(closed_category) = config.closed_category_id.map(serenity::ChannelId::new) {
        edit = edit.category(closed_category);
    }
    if let Err(source) = channel_id.edit(&ctx.http, edit).await {
        warn!(?source, channel_id = channel_id.get(), "failed to rename or move closed ticket");
        report.not_moved = true;
    }

    let mut message = serenity::CreateMessage::new()
        .embed(closed_embed(closer.id))
        .components(vec![closed_actions_row()]);
    if let Some(warnings) = report.warnings() {
        message = message.content(warnings);
    }

    if let Err(source) = channel_id.send_message(&ctx.http, message).await {
        // Reopen the record so the close button works again.
        if let Err(rollback) = mark_ticket_reopened(&data.db, ticket.channel_id).await {
            error!(?rollback, channel_id = channel_id.get(), "failed to roll back ticket close");
        }
        return Err(source.into());
    }

    info!(
        guild_id = guild_id.get(),
        channel_id = channel_id.get(),
        closed_by = closer.id.get(),
        "ticket closed"
    );
    Ok(())
}

/// Close steps that failed but did not stop the close.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct CloseReport {
    transcript_failed: bool,
    access_kept: bool,
    not_moved: bool,
}

impl CloseReport {
    fn warnings(self) -> Option<String> {
        let mut lines = Vec::new();
        if self.transcript_failed {
            lines.push("⚠️ Could not create the transcript for this ticket.");
        }
        if self.access_kept {
            lines.push("⚠️ Could not remove the creator's access to this channel.");
        }
        if self.not_moved {
            lines.push("⚠️ Could not rename or move this channel.");
        }

        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

async fn archive_transcript(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    ticket: &Ticket,
    config: &TicketConfig,
    closer: &serenity::User,
    closed_at: u64,
) -> Result<(), Error> {
    let channel_id = serenity::ChannelId::new(ticket.channel_id);
    let channel_name = channel_id
        .to_channel(&ctx.http)
        .await?
        .guild()
        .map(|channel| channel.name)
        .unwrap_or_else(|| format!("ticket-{}", ticket.sanitized_name));
    let guild_name = ctx
        .cache
        .guild(guild_id)
        .map(|guild| guild.name.clone())
        .unwrap_or_default();
    let creator = serenity::UserId::new(ticket.user_id).to_user(&ctx.http).await?;

    let messages = fetch_all_messages(&ctx.http, channel_id).await?;
    let entries: Vec<TranscriptEntry> = messages.iter().map(TranscriptEntry::from_message).collect();
    let creator_tag = creator.tag();
    let closer_tag = closer.tag();

    let header = TranscriptHeader {
        channel_name: &channel_name,
        channel_id: ticket.channel_id,
        guild_name: &guild_name,
        guild_id: guild_id.get(),
        creator: &creator_tag,
        creator_id: ticket.user_id,
        created_at: ticket.created_at,
        closed_by: &closer_tag,
        closed_by_id: closer.id.get(),
        closed_at,
    };
    let content = render_transcript(&header, &entries);
    let file_name = transcript_file_name(ticket.channel_id);
    let path = save_transcript(&data.transcript_dir, &file_name, &content).await?;
    info!(path = %path.display(), "ticket transcript saved");

    let attachment = serenity::CreateAttachment::bytes(content.into_bytes(), file_name);

    let dm = serenity::CreateMessage::new()
        .embed(transcript_dm_embed(&channel_name, closed_at))
        .add_file(attachment.clone());
    if let Err(source) = creator.direct_message(&ctx.http, dm).await {
        warn!(?source, user_id = ticket.user_id, "could not DM ticket transcript");
    }

    if let Some(log_channel) = config.log_channel_id.map(serenity::ChannelId::new) {
        let info = TranscriptLogInfo {
            channel_name: &channel_name,
            channel_id: ticket.channel_id,
            creator_id: ticket.user_id,
            closed_by: closer.id,
            created_at: ticket.created_at,
            closed_at,
            message_count: entries.len(),
        };
        let log = serenity::CreateMessage::new()
            .embed(transcript_log_embed(&info))
            .add_file(attachment);
        if let Err(source) = log_channel.send_message(&ctx.http, log).await {
            warn!(?source, guild_id = guild_id.get(), "failed to post ticket transcript log");
        }
    }

    Ok(())
}

async fn reopen_ticket(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::ComponentInteraction,
    guild_id: serenity::GuildId,
    ticket: &Ticket,
    config: &TicketConfig,
) -> Result<(), Error> {
    if !is_staff(interaction, config) {
        return respond_ephemeral(ctx, interaction, "❌ Only staff can reopen a ticket.").await;
    }
    if !mark_ticket_reopened(&data.db, ticket.channel_id).await? {
        return respond_ephemeral(ctx, interaction, "This ticket is already open.").await;
    }

    let channel_id = interaction.channel_id;
    let owner_id = serenity::UserId::new(ticket.user_id);

    channel_id
        .create_permission(
            &ctx.http,
            serenity::PermissionOverwrite {
                allow: owner_permissions(),
                deny: serenity::Permissions::empty(),
                kind: serenity::PermissionOverwriteType::Member(owner_id),
            },
        )
        .await?;

    let display_name = match guild_id.member(&ctx.http, owner_id).await {
        Ok(member) => member.display_name().to_owned(),
        Err(_) => ticket.display_name.clone(),
    };
    let channels = guild_id.channels(&ctx.http).await?;
    let channel_name = open_channel_name(
        &sanitize_display_name(&display_name),
        &text_channel_names(&channels, Some(channel_id)),
    );

    let mut edit = serenity::EditChannel::new().name(&channel_name);
    if let Some(category) = config.category_id.map(serenity::ChannelId::new) {
        edit = edit.category(category);
    }
    if let Err(source) = channel_id.edit(&ctx.http, edit).await {
        warn!(?source, channel_id = channel_id.get(), "failed to rename or move reopened ticket");
    }

    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .embed(reopened_embed(interaction.user.id, &channel_name))
                    .components(vec![close_row()]),
            ),
        )
        .await?;

    info!(guild_id = guild_id.get(), channel_id = channel_id.get(), "ticket reopened");
    Ok(())
}

async fn request_delete(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    config: &TicketConfig,
) -> Result<(), Error> {
    if !is_staff(interaction, config) {
        return respond_ephemeral(ctx, interaction, "❌ Only staff can delete a ticket.").await;
    }

    interaction
        .create_response(
            &ctx.http,
            serenity::CreateInteractionResponse::Message(
                serenity::CreateInteractionResponseMessage::new()
                    .embed(confirm_delete_embed())
                    .components(vec![confirm_delete_row()]),
            ),
        )
        .await?;
    Ok(())
}

async fn confirm_delete(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::ComponentInteraction,
    config: &TicketConfig,
) -> Result<(), Error> {
    if !is_staff(interaction, config) {
        return respond_ephemeral(ctx, interaction, "❌ Only staff can delete a ticket.").await;
    }

    update_message(ctx, interaction, "🗑 Deleting permanently...").await?;

    let channel_id = interaction.channel_id;
    remove_ticket(&data.db, channel_id.get(), true).await?;
    channel_id.delete(&ctx.http).await?;

    info!(channel_id = channel_id.get(), "ticket deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CloseReport, TicketButton, open_limit_message};

    #[test]
    fn maps_every_ticket_button_id() {
        let ids = [
            ("create_ticket", TicketButton::Create),
            ("close_ticket", TicketButton::Close),
            ("confirm_close", TicketButton::ConfirmClose),
            ("cancel_close", TicketButton::CancelClose),
            ("reopen_ticket", TicketButton::Reopen),
            ("delete_ticket", TicketButton::Delete),
            ("confirm_delete", TicketButton::ConfirmDelete),
            ("cancel_delete", TicketButton::CancelDelete),
        ];

        for (id, expected) in ids {
            assert_eq!(TicketButton::from_custom_id(id), Some(expected));
        }
        assert_eq!(TicketButton::from_custom_id("claim_xp"), None);
    }

    #[test]
    fn clean_close_has_no_warnings() {
        assert_eq!(CloseReport::default().warnings(), None);
    }

    #[test]
    fn failed_close_steps_are_reported_together() {
        let report = CloseReport {
            transcript_failed: false,
            access_kept: true,
            not_moved: true,
        };
        let warnings = report.warnings().expect("warnings");

        assert_eq!(warnings.lines().count(), 2);
        assert!(warnings.contains("creator's access"));
        assert!(warnings.contains("rename or move"));
        assert!(!warnings.contains("transcript"));
    }

    #[test]
    fn limit_message_names_the_limit() {
        assert_eq!(open_limit_message(3), "❌ You already have 3 open tickets!");
    }
}
