use std::env;
use std::path::PathBuf;

const DEFAULT_REDIS_KEY_PREFIX: &str = "hearth:prod";
const DEFAULT_TRANSCRIPT_DIR: &str = "./transcripts";
const DEFAULT_TICKET_AUTO_DELETE_HOURS: u64 = 7 * 24;

/// Process-level settings read from the environment (and `.env`).
#[derive(Debug)]
pub struct BotConfig {
    pub token: String,
    pub database_url: String,
    /// Register slash commands in this guild only, instead of globally.
    pub dev_guild_id: Option<u64>,
    pub redis_enabled: bool,
    pub redis_url: Option<String>,
    pub redis_key_prefix: String,
    pub auto_run_migrations: bool,
    pub transcript_dir: PathBuf,
    pub ticket_auto_delete_hours: u64,
}

impl BotConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let token = env::var("DISCORD_TOKEN").map_err(|_| anyhow::anyhow!("DISCORD_TOKEN is not set"))?;
        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;

        let dev_guild_id = match env_string("DISCORD_GUILD_ID") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("DISCORD_GUILD_ID must be a numeric guild id"))?,
            ),
            None => None,
        };

        Ok(Self {
            token,
            database_url,
            dev_guild_id,
            redis_enabled: env_bool("REDIS_ENABLED", false),
            redis_url: env_string("REDIS_URL"),
            redis_key_prefix: env_string("REDIS_KEY_PREFIX")
                .unwrap_or_else(|| DEFAULT_REDIS_KEY_PREFIX.to_owned()),
            auto_run_migrations: env_bool("AUTO_RUN_MIGRATIONS", true),
            transcript_dir: env_string("TRANSCRIPT_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_TRANSCRIPT_DIR), PathBuf::from),
            ticket_auto_delete_hours: env_u64("TICKET_AUTO_DELETE_HOURS", DEFAULT_TICKET_AUTO_DELETE_HOURS),
        })
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |value| parse_bool(&value))
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::parse_bool;

    #[test]
    fn accepts_common_truthy_spellings() {
        for raw in ["1", "true", " YES ", "On"] {
            assert!(parse_bool(raw), "{raw} should be true");
        }
        for raw in ["0", "false", "off", ""] {
            assert!(!parse_bool(raw), "{raw} should be false");
        }
    }
}
