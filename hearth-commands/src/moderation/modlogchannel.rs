use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::guild_only_message;
use crate::moderation::guard::ensure_invoker_permission;
use crate::settings::{SettingInput, parse_setting_input};
use hearth_core::{Context, Error};
use hearth_database::impls::guild_settings::{get_guild_settings, set_guild_setting};
use hearth_database::model::guild_settings::GuildSettingField;
use hearth_utils::parse::parse_channel_id;

pub const META: CommandMeta = CommandMeta {
    name: "modlogchannel",
    desc: "Set or view the moderation log channel.",
    category: "moderation",
    usage: "!modlogchannel [#channel|channel_id|clear]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn modlogchannel(
    ctx: Context<'_>,
    #[description = "Channel mention/id, or 'clear'"]
    #[rest]
    input: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_invoker_permission(&ctx, guild_id, serenity::Permissions::MANAGE_GUILD, "Manage Server")
        .await?
    {
        return Ok(());
    }

    let db = &ctx.data().db;
    match parse_setting_input(input.as_deref(), parse_channel_id) {
        SettingInput::Show => {
            let settings = get_guild_settings(db, guild_id.get()).await?;
            match settings.modlog_channel_id {
                Some(channel_id) => {
                    ctx.say(format!("Current modlog channel: <#{channel_id}>"))
                        .await?
                }
                None => ctx.say("No modlog channel configured.").await?,
            };
        }
        SettingInput::Clear => {
            set_guild_setting(db, guild_id.get(), GuildSettingField::ModlogChannel, None).await?;
            ctx.say("Modlog channel cleared.").await?;
        }
        SettingInput::Set(channel_id) => {
            set_guild_setting(
                db,
                guild_id.get(),
                GuildSettingField::ModlogChannel,
                Some(channel_id),
            )
            .await?;
            ctx.say(format!("Modlog channel set to <#{channel_id}>."))
                .await?;
        }
        SettingInput::Invalid => {
            ctx.say("Provide a valid channel mention/id, or `clear`.")
                .await?;
        }
    }

    Ok(())
}
