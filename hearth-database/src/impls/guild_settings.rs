use crate::cache::{CONFIG_CACHE_TTL, guild_settings_key, invalidate_guild_settings};
use crate::database::{Database, from_db_id, to_db_id};
use crate::model::guild_settings::{GuildSettingField, GuildSettings};

#[derive(sqlx::FromRow)]
struct GuildSettingsRow {
    welcome_channel_id: Option<i64>,
    autorole_id: Option<i64>,
    modlog_channel_id: Option<i64>,
}

fn optional_id(value: Option<i64>, field: &'static str) -> anyhow::Result<Option<u64>> {
    value.map(|raw| from_db_id(raw, field)).transpose()
}

pub async fn get_guild_settings(db: &Database, guild_id: u64) -> anyhow::Result<GuildSettings> {
    let cache_key = guild_settings_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || async {
            let row: Option<GuildSettingsRow> = sqlx::query_as(
                "SELECT welcome_channel_id, autorole_id, modlog_channel_id
                 FROM guild_settings WHERE guild_id = $1",
            )
            .bind(to_db_id(guild_id, "guild_id")?)
            .fetch_optional(db.pool())
            .await?;

            let Some(row) = row else {
                return Ok(GuildSettings::default());
            };

            Ok(GuildSettings {
                welcome_channel_id: optional_id(row.welcome_channel_id, "welcome_channel_id")?,
                autorole_id: optional_id(row.autorole_id, "autorole_id")?,
                modlog_channel_id: optional_id(row.modlog_channel_id, "modlog_channel_id")?,
            })
        })
        .await
}

/// Set or clear (`None`) a single settings column.
pub async fn set_guild_setting(
    db: &Database,
    guild_id: u64,
    field: GuildSettingField,
    value: Option<u64>,
) -> anyhow::Result<()> {
    let statement = match field {
        GuildSettingField::WelcomeChannel => {
            "INSERT INTO guild_settings (guild_id, welcome_channel_id) VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE SET welcome_channel_id = EXCLUDED.welcome_channel_id"
        }
        GuildSettingField::Autorole => {
            "INSERT INTO guild_settings (guild_id, autorole_id) VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE SET autorole_id = EXCLUDED.autorole_id"
        }
        GuildSettingField::ModlogChannel => {
            "INSERT INTO guild_settings (guild_id, modlog_channel_id) VALUES ($1, $2)
             ON CONFLICT (guild_id) DO UPDATE SET modlog_channel_id = EXCLUDED.modlog_channel_id"
        }
    };

    let value = value.map(|id| to_db_id(id, "setting value")).transpose()?;

    sqlx::query(statement)
        .bind(to_db_id(guild_id, "guild_id")?)
        .bind(value)
        .execute(db.pool())
        .await?;

    invalidate_guild_settings(db.cache(), guild_id).await?;

    Ok(())
}
