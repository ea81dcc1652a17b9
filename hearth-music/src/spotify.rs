use std::env;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpotifyTrack {
    pub name: String,
    pub artists: Vec<String>,
    pub duration_ms: u64,
    pub image_url: Option<String>,
}

impl SpotifyTrack {
    pub fn search_query(&self) -> String {
        match self.artists.first() {
            Some(artist) => format!("{} {}", artist, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Deserialize)]
struct ApiImage {
    url: String,
}

#[derive(Deserialize)]
struct ApiAlbumRef {
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Deserialize)]
struct ApiTrack {
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    duration_ms: u64,
    album: Option<ApiAlbumRef>,
}

#[derive(Deserialize)]
struct PlaylistItem {
    track: Option<ApiTrack>,
}

#[derive(Deserialize)]
struct Page<T> {
    items: Vec<T>,
    next: Option<String>,
}

impl From<ApiTrack> for SpotifyTrack {
    fn from(track: ApiTrack) -> Self {
        Self {
            name: track.name,
            artists: track.artists.into_iter().map(|artist| artist.name).collect(),
            duration_ms: track.duration_ms,
            image_url: track
                .album
                .and_then(|album| album.images.into_iter().next())
                .map(|image| image.url),
        }
    }
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Client-credentials Spotify Web API client.
pub struct SpotifyClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl SpotifyClient {
    pub fn new(http: reqwest::Client, client_id: String, client_secret: String) -> Self {
        Self {
            http,
            client_id,
            client_secret,
            token: Mutex::new(None),
        }
    }

    /// Build a client from `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`, or `None` when unset.
    pub fn from_env_optional(http: reqwest::Client) -> Option<Self> {
        let read = |key: &str| {
            env::var(key)
                .ok()
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let client_id = read("SPOTIFY_CLIENT_ID")?;
        let client_secret = read("SPOTIFY_CLIENT_SECRET")?;
        Some(Self::new(http, client_id, client_secret))
    }

    async fn access_token(&self) -> anyhow::Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > Instant::now()
        {
            return Ok(token.value.clone());
        }

        let response: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()
            .context("spotify token request rejected")?
            .json()
            .await?;

        debug!(expires_in = response.expires_in, "spotify access token refreshed");

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        *cached = Some(CachedToken {
            value: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(response.access_token)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> anyhow::Result<T> {
        let token = self.access_token().await?;
        let value = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("spotify request failed: {url}"))?
            .json()
            .await?;

        Ok(value)
    }

    pub async fn track(&self, id: &str) -> anyhow::Result<SpotifyTrack> {
        let track: ApiTrack = self.get(&format!("{API_BASE}/tracks/{id}")).await?;
        Ok(track.into())
    }

    pub async fn playlist_tracks(&self, id: &str, limit: usize) -> anyhow::Result<Vec<SpotifyTrack>> {
        let mut url = Some(format!("{API_BASE}/playlists/{id}/tracks?limit=100"));
        let mut tracks = Vec::new();

        while let Some(current) = url.take()
            && tracks.len() < limit
        {
            let page: Page<PlaylistItem> = self.get(&current).await?;
            tracks.extend(page.items.into_iter().filter_map(|item| item.track).map(SpotifyTrack::from));
            url = page.next;
        }

        tracks.truncate(limit);
        Ok(tracks)
    }

    pub async fn album_tracks(&self, id: &str, limit: usize) -> anyhow::Result<Vec<SpotifyTrack>> {
        let mut url = Some(format!("{API_BASE}/albums/{id}/tracks?limit=50"));
        let mut tracks = Vec::new();

        while let Some(current) = url.take()
            && tracks.len() < limit
        {
            let page: Page<ApiTrack> = self.get(&current).await?;
            tracks.extend(page.items.into_iter().map(SpotifyTrack::from));
            url = page.next;
        }

        tracks.truncate(limit);
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiTrack, SpotifyTrack};

    #[test]
    fn maps_api_track() {
        let raw = r#"{
            "name": "Song",
            "artists": [{"name": "Artist"}, {"name": "Feat"}],
            "duration_ms": 201000,
            "album": {"images": [{"url": "https://i.scdn.co/image/big"}]}
        }"#;
        let api: ApiTrack = serde_json::from_str(raw).expect("valid json");
        let track = SpotifyTrack::from(api);

        assert_eq!(track.artists, vec!["Artist", "Feat"]);
        assert_eq!(track.image_url.as_deref(), Some("https://i.scdn.co/image/big"));
        assert_eq!(track.search_query(), "Artist Song");
    }

    #[test]
    fn search_query_without_artist() {
        let track = SpotifyTrack {
            name: "Lonely".into(),
            artists: vec![],
            duration_ms: 0,
            image_url: None,
        };
        assert_eq!(track.search_query(), "Lonely");
    }
}
