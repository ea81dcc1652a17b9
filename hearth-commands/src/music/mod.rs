pub mod clearqueue;
pub mod nowplaying;
pub mod pause;
pub mod play;
pub mod queue;
pub mod shuffle;
pub mod skip;
pub mod stop;
pub mod volume;

mod embeds;
mod voice;
