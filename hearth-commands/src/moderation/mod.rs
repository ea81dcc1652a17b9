pub mod ban;
pub mod clearmessages;
pub mod kick;
pub mod lock;
pub mod modlogchannel;
pub mod slowmode;
pub mod timeout;
pub mod unban;
pub mod unlock;
pub mod untimeout;
pub mod unwarn;
pub mod warn;
pub mod warnings;

pub(crate) mod embeds;
mod guard;
mod logging;

pub(crate) use embeds::{guild_only_message, usage_message};
pub(crate) use guard::{ensure_invoker_permission, ensure_permission};
