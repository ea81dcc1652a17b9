use std::path::PathBuf;

use hearth_database::Database;
use hearth_music::MusicService;

/// Pending `dropxp` claims.
pub mod drops;
pub mod ticket_locks;

pub use drops::DropRegistry;
pub use ticket_locks::TicketCreationLocks;

pub type Error = anyhow::Error;

#[derive(Clone, Debug)]
pub struct Data {
    pub db: Database,
    pub music: MusicService,
    pub drops: DropRegistry,
    pub ticket_locks: TicketCreationLocks,
    /// Where closed-ticket transcripts are written.
    pub transcript_dir: PathBuf,
}

pub type Context<'a> = poise::Context<'a, Data, Error>;
