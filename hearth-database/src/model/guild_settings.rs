use serde::{Deserialize, Serialize};

/// Per-guild channel and role settings edited through commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSettings {
    pub welcome_channel_id: Option<u64>,
    pub autorole_id: Option<u64>,
    pub modlog_channel_id: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuildSettingField {
    WelcomeChannel,
    Autorole,
    ModlogChannel,
}
