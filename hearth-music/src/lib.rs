/// Embeds for playback notices.
pub mod embeds;
/// Per-guild playback sessions on top of songbird.
pub mod player;
pub mod queue;
/// Query to song resolution through yt-dlp and Spotify.
pub mod resolver;
/// Classification of `play` queries.
pub mod source;
pub mod spotify;
mod ytdlp;

pub use player::{ControlError, EnqueueOutcome, MusicService, QueueSnapshot, SessionTarget};
pub use queue::{Song, SongSource};
pub use resolver::{ResolveError, TrackResolver};
pub use source::QueryKind;
