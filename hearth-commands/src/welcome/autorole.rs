use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::{ensure_permission, guild_only_message};
use crate::settings::{SettingInput, parse_setting_input};
use hearth_core::{Context, Error};
use hearth_database::impls::guild_settings::{get_guild_settings, set_guild_setting};
use hearth_database::model::guild_settings::GuildSettingField;
use hearth_utils::parse::parse_role_id;

pub const META: CommandMeta = CommandMeta {
    name: "autorole",
    desc: "Set or view the role given to members when they join.",
    category: "welcome",
    usage: "!autorole [@role|role_id|clear]",
};

#[poise::command(prefix_command, slash_command, category = "Welcome")]
pub async fn autorole(
    ctx: Context<'_>,
    #[description = "Role mention/id, or 'clear'"]
    #[rest]
    input: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !ensure_permission(&ctx, guild_id, serenity::Permissions::MANAGE_GUILD, "Manage Server").await? {
        return Ok(());
    }

    let db = &ctx.data().db;
    let reply = match parse_setting_input(input.as_deref(), parse_role_id) {
        SettingInput::Show => match get_guild_settings(db, guild_id.get()).await?.autorole_id {
            Some(role_id) => format!("New members receive <@&{role_id}>."),
            None => "No autorole configured.".to_owned(),
        },
        SettingInput::Clear => {
            set_guild_setting(db, guild_id.get(), GuildSettingField::Autorole, None).await?;
            "Autorole cleared.".to_owned()
        }
        SettingInput::Set(role_id) => {
            let roles = guild_id.roles(ctx.http()).await?;
            match roles.get(&serenity::RoleId::new(role_id)) {
                None => "That role does not exist in this server.".to_owned(),
                Some(role) if role.managed => {
                    "That role is managed by an integration and can't be assigned.".to_owned()
                }
                Some(_) => {
                    set_guild_setting(db, guild_id.get(), GuildSettingField::Autorole, Some(role_id))
                        .await?;
                    format!("New members will receive <@&{role_id}>.")
                }
            }
        }
        SettingInput::Invalid => "Provide a valid role mention/id, or `clear`.".to_owned(),
    };

    ctx.send(
        poise::CreateReply::default()
            .content(reply)
            .allowed_mentions(serenity::CreateAllowedMentions::new()),
    )
    .await?;
    Ok(())
}
