use poise::serenity_prelude as serenity;

use hearth_music::embeds::{QUEUE_PREVIEW_LEN, duration_label, song_link};
use hearth_music::{QueueSnapshot, Song};
use hearth_utils::embed::{DEFAULT_EMBED_COLOR, ERROR_EMBED_COLOR, WARNING_EMBED_COLOR};
use hearth_utils::formatting::format_long_duration;

pub fn queued_embed(song: &Song, position: usize) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title("Added to the queue")
        .description(song_link(song))
        .color(WARNING_EMBED_COLOR)
        .field("Position", position.to_string(), true)
        .field("Duration", duration_label(song), true)
        .field("Requested by", format!("<@{}>", song.requested_by.get()), true);

    if let Some(thumbnail) = song.thumbnail.as_deref() {
        embed = embed.thumbnail(thumbnail);
    }
    embed
}

pub fn collection_embed(added: usize, queue_len: usize, started: bool) -> serenity::CreateEmbed {
    let description = if started {
        format!("Added **{added}** songs and started playing.")
    } else {
        format!("Added **{added}** songs to the queue.")
    };

    serenity::CreateEmbed::new()
        .title("Playlist queued")
        .description(description)
        .color(DEFAULT_EMBED_COLOR)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "The queue now holds {queue_len} song(s)"
        )))
}

pub fn error_embed(title: &str, description: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(ERROR_EMBED_COLOR)
        .footer(serenity::CreateEmbedFooter::new(
            "Supported: YouTube links, playlists, Spotify tracks, playlists and albums, or search text",
        ))
}

/// Total duration label, noting entries whose length is unknown.
pub fn total_duration_label(total_secs: u64, unknown: usize) -> String {
    match unknown {
        0 => format_long_duration(total_secs),
        n => format!("{} (+{n} live)", format_long_duration(total_secs)),
    }
}

pub fn queue_description(songs: &[Song]) -> String {
    songs
        .iter()
        .take(QUEUE_PREVIEW_LEN)
        .enumerate()
        .map(|(index, song)| {
            let prefix = if index == 0 {
                "**Now playing:**".to_owned()
            } else {
                format!("`{index}.`")
            };
            format!(
                "{prefix} {} `{}` • <@{}>",
                song_link(song),
                duration_label(song),
                song.requested_by.get()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn queue_embed(snapshot: &QueueSnapshot) -> serenity::CreateEmbed {
    let total = snapshot.songs.len();
    let mut embed = serenity::CreateEmbed::new()
        .title("Queue")
        .description(queue_description(&snapshot.songs))
        .color(DEFAULT_EMBED_COLOR)
        .field("Songs", total.to_string(), true)
        .field(
            "Total duration",
            total_duration_label(snapshot.total_secs, snapshot.unknown_durations),
            true,
        )
        .field("Volume", format!("{}%", snapshot.volume_percent), true);

    if total > QUEUE_PREVIEW_LEN {
        embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
            "... and {} more",
            total - QUEUE_PREVIEW_LEN
        )));
    }
    embed
}

pub fn now_playing_status_embed(snapshot: &QueueSnapshot) -> Option<serenity::CreateEmbed> {
    let current = snapshot.songs.first()?;
    let title = if snapshot.paused { "Paused" } else { "Now playing" };
    let mut embed = serenity::CreateEmbed::new()
        .title(title)
        .description(song_link(current))
        .color(if snapshot.paused { WARNING_EMBED_COLOR } else { DEFAULT_EMBED_COLOR })
        .field("Artist", current.artist.as_deref().unwrap_or("Unknown"), true)
        .field("Duration", duration_label(current), true)
        .field("Requested by", format!("<@{}>", current.requested_by.get()), true)
        .field("Source", current.source.label(), true);

    if let Some(next) = snapshot.songs.get(1) {
        embed = embed.field("Up next", song_link(next), false);
    }
    if let Some(thumbnail) = current.thumbnail.as_deref() {
        embed = embed.thumbnail(thumbnail);
    }
    Some(embed)
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use hearth_music::{Song, SongSource};

    use super::{queue_description, total_duration_label};

    fn song(title: &str) -> Song {
        Song {
            title: title.to_owned(),
            artist: None,
            url: format!("https://www.youtube.com/watch?v={title}"),
            duration_secs: Some(65),
            thumbnail: None,
            source: SongSource::Youtube,
            requested_by: serenity::UserId::new(5),
        }
    }

    #[test]
    fn queue_marks_current_song_and_numbers_the_rest() {
        let songs: Vec<_> = ["a", "b", "c"].into_iter().map(song).collect();
        let text = queue_description(&songs);
        let lines: Vec<_> = text.lines().collect();

        assert!(lines[0].starts_with("**Now playing:** [a]"));
        assert!(lines[1].starts_with("`1.` [b]"));
        assert!(lines[2].contains("`1:05`"));
    }

    #[test]
    fn queue_preview_is_capped() {
        let songs: Vec<_> = (0..15).map(|n| song(&n.to_string())).collect();
        assert_eq!(queue_description(&songs).lines().count(), 10);
    }

    #[test]
    fn total_duration_mentions_live_entries() {
        assert_eq!(total_duration_label(90, 0), "1 minute and 30 seconds");
        assert_eq!(total_duration_label(60, 2), "1 minute (+2 live)");
    }
}
