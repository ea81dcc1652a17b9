use std::fmt;
use std::sync::Arc;

use serenity::all::UserId;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

use crate::queue::{Song, SongSource};
use crate::source::QueryKind;
use crate::spotify::{SpotifyClient, SpotifyTrack};
use crate::ytdlp::{self, VideoInfo};

pub const MAX_COLLECTION_SONGS: usize = 100;
const SEARCH_RESULTS: usize = 5;
const SEARCH_MAX_SECS: u64 = 30 * 60;
const SPOTIFY_MATCH_MAX_SECS: u64 = 20 * 60;
const SPOTIFY_CONCURRENCY: usize = 3;

#[derive(Debug)]
pub enum ResolveError {
    SpotifyDisabled,
    NothingFound,
    Backend(anyhow::Error),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpotifyDisabled => f.write_str("spotify support is not configured"),
            Self::NothingFound => f.write_str("no playable results"),
            Self::Backend(source) => write!(f, "lookup failed: {source}"),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<anyhow::Error> for ResolveError {
    fn from(source: anyhow::Error) -> Self {
        Self::Backend(source)
    }
}

/// Turns `play` queries into queueable songs.
#[derive(Clone, Debug)]
pub struct TrackResolver {
    spotify: Option<Arc<SpotifyClient>>,
}

impl TrackResolver {
    pub fn new(spotify: Option<SpotifyClient>) -> Self {
        Self {
            spotify: spotify.map(Arc::new),
        }
    }

    pub async fn resolve(
        &self,
        query: &QueryKind,
        requested_by: UserId,
    ) -> Result<Vec<Song>, ResolveError> {
        let songs = match query {
            QueryKind::YoutubeVideo(url) => {
                let info = ytdlp::video_info(url).await?;
                song_from_info(&info, requested_by).into_iter().collect()
            }
            QueryKind::YoutubePlaylist(url) => ytdlp::playlist_entries(url, MAX_COLLECTION_SONGS)
                .await?
                .iter()
                .filter_map(|info| song_from_info(info, requested_by))
                .collect(),
            QueryKind::Search(text) => search_best(text, SEARCH_MAX_SECS, requested_by)
                .await?
                .into_iter()
                .collect(),
            QueryKind::SpotifyTrack(id) => {
                let track = self.spotify()?.track(id).await?;
                resolve_spotify_track(&track, requested_by)
                    .await?
                    .into_iter()
                    .collect()
            }
            QueryKind::SpotifyPlaylist(id) => {
                let tracks = self.spotify()?.playlist_tracks(id, MAX_COLLECTION_SONGS).await?;
                resolve_spotify_tracks(tracks, requested_by).await
            }
            QueryKind::SpotifyAlbum(id) => {
                let tracks = self.spotify()?.album_tracks(id, MAX_COLLECTION_SONGS).await?;
                resolve_spotify_tracks(tracks, requested_by).await
            }
        };

        if songs.is_empty() {
            return Err(ResolveError::NothingFound);
        }

        Ok(songs)
    }

    fn spotify(&self) -> Result<&SpotifyClient, ResolveError> {
        self.spotify.as_deref().ok_or(ResolveError::SpotifyDisabled)
    }
}

fn song_from_info(info: &VideoInfo, requested_by: UserId) -> Option<Song> {
    Some(Song {
        title: info.title.clone().unwrap_or_else(|| "Unknown title".to_owned()),
        artist: info.uploader.clone().or_else(|| info.channel.clone()),
        url: info.page_url()?,
        duration_secs: info.duration_secs(),
        thumbnail: info.thumbnail_url(),
        source: SongSource::Youtube,
        requested_by,
    })
}

/// Index of the first result under `max_secs`, else the first result.
pub fn pick_preferred(durations: &[Option<u64>], max_secs: u64) -> Option<usize> {
    if durations.is_empty() {
        return None;
    }

    durations
        .iter()
        .position(|duration| duration.is_some_and(|secs| secs < max_secs))
        .or(Some(0))
}

async fn search_best(
    query: &str,
    max_secs: u64,
    requested_by: UserId,
) -> anyhow::Result<Option<Song>> {
    let results: Vec<VideoInfo> = ytdlp::search(query, SEARCH_RESULTS)
        .await?
        .into_iter()
        .filter(|info| !info.is_unavailable())
        .collect();

    let durations: Vec<Option<u64>> = results.iter().map(VideoInfo::duration_secs).collect();
    Ok(pick_preferred(&durations, max_secs).and_then(|index| song_from_info(&results[index], requested_by)))
}

async fn resolve_spotify_track(
    track: &SpotifyTrack,
    requested_by: UserId,
) -> anyhow::Result<Option<Song>> {
    let found = search_best(&track.search_query(), SPOTIFY_MATCH_MAX_SECS, requested_by).await?;

    Ok(found.map(|song| Song {
        title: track.name.clone(),
        artist: Some(track.artists.join(", ")).filter(|artists| !artists.is_empty()),
        duration_secs: song
            .duration_secs
            .or(Some(track.duration_ms / 1_000)),
        thumbnail: track.image_url.clone().or(song.thumbnail),
        source: SongSource::Spotify,
        ..song
    }))
}

/// Resolve Spotify tracks to YouTube matches, a few at a time, keeping order.
async fn resolve_spotify_tracks(tracks: Vec<SpotifyTrack>, requested_by: UserId) -> Vec<Song> {
    let permits = Arc::new(Semaphore::new(SPOTIFY_CONCURRENCY));
    let mut tasks = JoinSet::new();

    for (index, track) in tracks.into_iter().enumerate() {
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await.ok()?;
            match resolve_spotify_track(&track, requested_by).await {
                Ok(song) => song.map(|song| (index, song)),
                Err(source) => {
                    warn!(?source, track = %track.name, "spotify track lookup failed");
                    None
                }
            }
        });
    }

    let mut resolved = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        if let Ok(Some(entry)) = joined {
            resolved.push(entry);
        }
    }

    resolved.sort_by_key(|(index, _)| *index);
    resolved.into_iter().map(|(_, song)| song).collect()
}

#[cfg(test)]
mod tests {
    use super::pick_preferred;

    #[test]
    fn prefers_first_result_under_limit() {
        assert_eq!(pick_preferred(&[Some(4000), Some(200), Some(100)], 1800), Some(1));
    }

    #[test]
    fn falls_back_to_first_result() {
        assert_eq!(pick_preferred(&[Some(4000), None], 1800), Some(0));
        assert_eq!(pick_preferred(&[], 1800), None);
    }

    #[test]
    fn unknown_durations_are_not_preferred() {
        assert_eq!(pick_preferred(&[None, Some(10)], 1800), Some(1));
    }
}
