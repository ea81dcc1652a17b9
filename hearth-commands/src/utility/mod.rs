pub mod avatar;
pub mod help;
pub mod ping;
pub mod serverinfo;
pub mod usage;
pub mod userinfo;

mod embeds;
