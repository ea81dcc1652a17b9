use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::{ensure_invoker_permission, guild_only_message};
use crate::settings::{SettingInput, parse_setting_input};
use hearth_core::{Context, Error};
use hearth_database::impls::guild_settings::{get_guild_settings, set_guild_setting};
use hearth_database::model::guild_settings::GuildSettingField;
use hearth_utils::parse::parse_channel_id;

pub const META: CommandMeta = CommandMeta {
    name: "welcomechannel",
    desc: "Set or view the channel where new members are greeted.",
    category: "welcome",
    usage: "!welcomechannel [#channel|channel_id|clear]",
};

#[poise::command(prefix_command, slash_command, category = "Welcome")]
pub async fn welcomechannel(
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
    let reply = match parse_setting_input(input.as_deref(), parse_channel_id) {
        SettingInput::Show => match get_guild_settings(db, guild_id.get()).await?.welcome_channel_id {
            Some(channel_id) => format!("New members are welcomed in <#{channel_id}>."),
            None => "No welcome channel configured.".to_owned(),
        },
        SettingInput::Clear => {
            set_guild_setting(db, guild_id.get(), GuildSettingField::WelcomeChannel, None).await?;
            "Welcome channel cleared. New members will no longer be greeted.".to_owned()
        }
        SettingInput::Set(channel_id) => {
            set_guild_setting(
                db,
                guild_id.get(),
                GuildSettingField::WelcomeChannel,
                Some(channel_id),
            )
            .await?;
            format!("Welcome channel set to <#{channel_id}>.")
        }
        SettingInput::Invalid => "Provide a valid channel mention/id, or `clear`.".to_owned(),
    };

    ctx.say(reply).await?;
    Ok(())
}
