pub mod adminxp;
pub mod dropxp;
pub mod leaderboard;
pub mod level;

pub mod embeds;
