use poise::serenity_prelude as serenity;

use hearth_database::model::tickets::{Ticket, TicketConfig, TicketStats, TicketStatus};
use hearth_utils::embed::{DEFAULT_EMBED_COLOR, ERROR_EMBED_COLOR, SUCCESS_EMBED_COLOR, WARNING_EMBED_COLOR};
use hearth_utils::formatting::escape_mentions;

pub const CREATE_TICKET: &str = "create_ticket";
pub const CLOSE_TICKET: &str = "close_ticket";
pub const CONFIRM_CLOSE: &str = "confirm_close";
pub const CANCEL_CLOSE: &str = "cancel_close";
pub const REOPEN_TICKET: &str = "reopen_ticket";
pub const DELETE_TICKET: &str = "delete_ticket";
pub const CONFIRM_DELETE: &str = "confirm_delete";
pub const CANCEL_DELETE: &str = "cancel_delete";

/// Most fields Discord accepts on one embed.
pub const MAX_LIST_FIELDS: usize = 25;

fn button(id: &str, label: &str, emoji: char, style: serenity::ButtonStyle) -> serenity::CreateButton {
    serenity::CreateButton::new(id)
        .label(label)
        .emoji(emoji)
        .style(style)
}

pub fn panel_embed() -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("🎫 Support")
        .description(
            "Click the button below to open a support ticket.\n\n**Our team will get back to you shortly!**",
        )
        .color(DEFAULT_EMBED_COLOR)
}

pub fn panel_row() -> serenity::CreateActionRow {
    serenity::CreateActionRow::Buttons(vec![button(
        CREATE_TICKET,
        "Create a ticket",
        '🎫',
        serenity::ButtonStyle::Primary,
    )])
}

pub fn greeting_embed() -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("🎫 New ticket")
        .description(
            "Hi! The team has been notified and will answer soon.\n\nPlease describe your request in as much **detail** as you can.",
        )
        .color(SUCCESS_EMBED_COLOR)
}

pub fn close_row() -> serenity::CreateActionRow {
    serenity::CreateActionRow::Buttons(vec![button(
        CLOSE_TICKET,
        "Close ticket",
        '🔒',
        serenity::ButtonStyle::Danger,
    )])
}

pub fn confirm_close_embed() -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("🔒 Close ticket")
        .description("Do you really want to close this ticket?")
        .color(WARNING_EMBED_COLOR)
}

pub fn confirm_close_row() -> serenity::CreateActionRow {
    serenity::CreateActionRow::Buttons(vec![
        button(CONFIRM_CLOSE, "Confirm", '✅', serenity::ButtonStyle::Danger),
        button(CANCEL_CLOSE, "Cancel", '❌', serenity::ButtonStyle::Secondary),
    ])
}

pub fn closed_embed(closed_by: serenity::UserId) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("🔒 Ticket closed")
        .description(format!("This ticket was closed by <@{}>.", closed_by.get()))
        .color(ERROR_EMBED_COLOR)
}

pub fn closed_actions_row() -> serenity::CreateActionRow {
    serenity::CreateActionRow::Buttons(vec![
        button(REOPEN_TICKET, "Reopen", '🔓', serenity::ButtonStyle::Success),
        button(DELETE_TICKET, "Delete", '🗑', serenity::ButtonStyle::Danger),
    ])
}

pub fn reopened_embed(reopened_by: serenity::UserId, channel_name: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("🔓 Ticket reopened")
        .description(format!(
            "This ticket was reopened by <@{}>.\n\nNew name: `{channel_name}`",
            reopened_by.get()
        ))
        .color(SUCCESS_EMBED_COLOR)
}

pub fn confirm_delete_embed() -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("🗑 Delete permanently")
        .description("⚠️ This cannot be undone!")
        .color(ERROR_EMBED_COLOR)
}

pub fn confirm_delete_row() -> serenity::CreateActionRow {
    serenity::CreateActionRow::Buttons(vec![
        button(CONFIRM_DELETE, "Yes, delete", '💀', serenity::ButtonStyle::Danger),
        button(CANCEL_DELETE, "Cancel", '❌', serenity::ButtonStyle::Secondary),
    ])
}

pub fn staff_notification_embed(
    guild_id: serenity::GuildId,
    channel_id: serenity::ChannelId,
    author: serenity::UserId,
) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("🎫 New ticket")
        .field("Author", format!("<@{}>", author.get()), true)
        .field(
            "Channel",
            format!(
                "[Open the ticket](https://discord.com/channels/{}/{})",
                guild_id.get(),
                channel_id.get()
            ),
            true,
        )
        .color(SUCCESS_EMBED_COLOR)
        .timestamp(serenity::Timestamp::now())
}

pub fn transcript_dm_embed(channel_name: &str, closed_at: u64) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("📋 Your ticket transcript")
        .description(format!("Here is the full history of your ticket **{channel_name}**."))
        .field("Status", "Closed", true)
        .field("Closed", format!("<t:{closed_at}:f>"), true)
        .color(DEFAULT_EMBED_COLOR)
}

pub struct TranscriptLogInfo<'a> {
    pub channel_name: &'a str,
    pub channel_id: u64,
    pub creator_id: u64,
    pub closed_by: serenity::UserId,
    pub created_at: u64,
    pub closed_at: u64,
    pub message_count: usize,
}

pub fn transcript_log_embed(info: &TranscriptLogInfo<'_>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("📋 Closed ticket transcript")
        .description(format!(
            "Ticket **{}** closed by <@{}>",
            info.channel_name,
            info.closed_by.get()
        ))
        .field("Ticket ID", info.channel_id.to_string(), true)
        .field("Created by", format!("<@{}>", info.creator_id), true)
        .field("Closed by", format!("<@{}>", info.closed_by.get()), true)
        .field("Created", format!("<t:{}:f>", info.created_at), true)
        .field("Closed", format!("<t:{}:f>", info.closed_at), true)
        .field("Messages", info.message_count.to_string(), true)
        .color(WARNING_EMBED_COLOR)
        .timestamp(serenity::Timestamp::now())
}

pub fn status_icon(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Open => "🟢",
        TicketStatus::Closed => "🔒",
    }
}

/// One `tickets` list field: `(name, value)`.
pub fn ticket_list_field(ticket: &Ticket, channel_name: &str) -> (String, String) {
    (
        format!("{} {channel_name}", status_icon(ticket.status)),
        format!(
            "👤 {} (<@{}>)\n📅 <t:{}:d>",
            escape_mentions(&ticket.display_name),
            ticket.user_id,
            ticket.created_at
        ),
    )
}

pub fn stats_embed(stats: &TicketStats, active: usize) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("📊 Ticket statistics")
        .field("Created", stats.created.to_string(), true)
        .field("Closed", stats.closed.to_string(), true)
        .field("Deleted", stats.deleted.to_string(), true)
        .field("Active", active.to_string(), true)
        .color(WARNING_EMBED_COLOR)
        .timestamp(serenity::Timestamp::now())
}

fn channel_value(id: Option<u64>) -> String {
    id.map_or_else(|| "Not set".to_owned(), |id| format!("<#{id}>"))
}

pub fn config_embed(config: &TicketConfig) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("Ticket configuration")
        .field("category", channel_value(config.category_id), true)
        .field("closedcategory", channel_value(config.closed_category_id), true)
        .field(
            "staffrole",
            config
                .staff_role_id
                .map_or_else(|| "Not set".to_owned(), |id| format!("<@&{id}>")),
            true,
        )
        .field("logchannel", channel_value(config.log_channel_id), true)
        .field("notifychannel", channel_value(config.notification_channel_id), true)
        .field("maxopen", config.max_open_per_user.to_string(), true)
        .color(DEFAULT_EMBED_COLOR)
}

#[cfg(test)]
mod tests {
    use hearth_database::model::tickets::{Ticket, TicketStatus};

    use super::ticket_list_field;

    #[test]
    fn list_field_shows_status_owner_and_date() {
        let ticket = Ticket {
            channel_id: 9,
            guild_id: 1,
            user_id: 77,
            display_name: "@everyone fan".into(),
            sanitized_name: "everyone-fan".into(),
            status: TicketStatus::Closed,
            created_at: 1_700_000_000,
            closed_at: Some(1_700_000_100),
            closed_by: Some(5),
        };

        let (name, value) = ticket_list_field(&ticket, "closed-everyone-fan");

        assert_eq!(name, "🔒 closed-everyone-fan");
        assert!(value.contains("(<@77>)"));
        assert!(value.contains("<t:1700000000:d>"));
        assert!(!value.contains("@everyone"));
    }
}
