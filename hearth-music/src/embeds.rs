use serenity::all::{CreateEmbed, CreateEmbedFooter};

use hearth_utils::embed::{DEFAULT_EMBED_COLOR, status_embed};
use hearth_utils::formatting::{escape_mentions, format_track_duration, truncate_chars};

use crate::queue::Song;

pub const QUEUE_PREVIEW_LEN: usize = 10;

pub fn duration_label(song: &Song) -> String {
    song.duration_secs
        .map(format_track_duration)
        .unwrap_or_else(|| "live".to_owned())
}

/// `[Title](url)` with markdown-breaking characters removed.
pub fn song_link(song: &Song) -> String {
    let title = truncate_chars(&song.title, 80).replace(['[', ']'], "");
    format!("[{}]({})", escape_mentions(&title), song.url)
}

pub fn now_playing_embed(song: &Song) -> CreateEmbed {
    let mut description = song_link(song);
    if let Some(artist) = song.artist.as_deref() {
        description.push_str(&format!("\nby {}", escape_mentions(artist)));
    }

    let mut embed = CreateEmbed::new()
        .title("Now playing")
        .description(description)
        .color(DEFAULT_EMBED_COLOR)
        .field("Duration", duration_label(song), true)
        .field("Requested by", format!("<@{}>", song.requested_by.get()), true)
        .footer(CreateEmbedFooter::new(song.source.label()));

    if let Some(thumbnail) = song.thumbnail.as_deref() {
        embed = embed.thumbnail(thumbnail);
    }

    embed
}

pub fn notice_embed(text: impl Into<String>) -> CreateEmbed {
    status_embed(text, DEFAULT_EMBED_COLOR)
}
