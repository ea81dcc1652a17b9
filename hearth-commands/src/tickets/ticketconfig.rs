use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::{ensure_invoker_permission, guild_only_message, usage_message};
use crate::settings::{SettingInput, parse_setting_input};
use crate::tickets::embeds::config_embed;
use hearth_core::{Context, Error};
use hearth_database::impls::tickets::{get_ticket_config, set_max_open_per_user, set_ticket_config_id};
use hearth_database::model::tickets::TicketConfigField;
use hearth_utils::parse::{parse_channel_id, parse_role_id};

pub const META: CommandMeta = CommandMeta {
    name: "ticketconfig",
    desc: "View or change the ticket system configuration.",
    category: "tickets",
    usage: "!ticketconfig [category|closedcategory|staffrole|logchannel|notifychannel|maxopen] [value|clear]",
};

const MAX_OPEN_FIELD: &str = "maxopen";
const MAX_OPEN_LIMIT: u32 = 25;

fn id_parser(field: TicketConfigField) -> fn(&str) -> Option<u64> {
    match field {
        TicketConfigField::StaffRole => parse_role_id,
        _ => parse_channel_id,
    }
}

fn parse_max_open(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|value| (1..=MAX_OPEN_LIMIT).contains(value))
}

#[poise::command(prefix_command, slash_command, category = "Tickets")]
pub async fn ticketconfig(
    ctx: Context<'_>,
    #[description = "Setting to change"] field: Option<String>,
    #[description = "Channel/role mention or id, a number for maxopen, or 'clear'"]
    #[rest]
    value: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_invoker_permission(&ctx, guild_id, serenity::Permissions::ADMINISTRATOR, "Administrator")
        .await?
    {
        return Ok(());
    }

    let db = &ctx.data().db;
    let Some(field) = field else {
        let config = get_ticket_config(db, guild_id.get()).await?;
        ctx.send(poise::CreateReply::default().embed(config_embed(&config)))
            .await?;
        return Ok(());
    };

    if field.trim().eq_ignore_ascii_case(MAX_OPEN_FIELD) {
        let Some(max) = value.as_deref().and_then(parse_max_open) else {
            ctx.say(format!("`maxopen` must be a number between 1 and {MAX_OPEN_LIMIT}."))
                .await?;
            return Ok(());
        };
        set_max_open_per_user(db, guild_id.get(), max).await?;
        ctx.say(format!("Members can now have up to **{max}** open tickets."))
            .await?;
        return Ok(());
    }

    let Some(field) = TicketConfigField::from_key(&field) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    let mention = |id: u64| match field {
        TicketConfigField::StaffRole => format!("<@&{id}>"),
        _ => format!("<#{id}>"),
    };

    match parse_setting_input(value.as_deref(), id_parser(field)) {
        SettingInput::Show => {
            let config = get_ticket_config(db, guild_id.get()).await?;
            ctx.send(poise::CreateReply::default().embed(config_embed(&config)))
                .await?;
        }
        SettingInput::Clear => {
            set_ticket_config_id(db, guild_id.get(), field, None).await?;
            ctx.say(format!("`{}` cleared.", field.key())).await?;
        }
        SettingInput::Set(id) => {
            set_ticket_config_id(db, guild_id.get(), field, Some(id)).await?;
            ctx.say(format!("`{}` set to {}.", field.key(), mention(id))).await?;
        }
        SettingInput::Invalid => {
            ctx.say(usage_message(META.usage)).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_max_open;

    #[test]
    fn max_open_must_be_in_range() {
        assert_eq!(parse_max_open(" 3 "), Some(3));
        assert_eq!(parse_max_open("0"), None);
        assert_eq!(parse_max_open("26"), None);
        assert_eq!(parse_max_open("three"), None);
    }
}
