/// What a `play` query points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryKind {
    YoutubeVideo(String),
    YoutubePlaylist(String),
    SpotifyTrack(String),
    SpotifyPlaylist(String),
    SpotifyAlbum(String),
    Search(String),
}

impl QueryKind {
    pub fn classify(raw: &str) -> Self {
        let query = raw.trim();
        let lower = query.to_ascii_lowercase();

        if lower.contains("open.spotify.com/") {
            if let Some(id) = spotify_id(query, "/track/") {
                return Self::SpotifyTrack(id);
            }
            if let Some(id) = spotify_id(query, "/playlist/") {
                return Self::SpotifyPlaylist(id);
            }
            if let Some(id) = spotify_id(query, "/album/") {
                return Self::SpotifyAlbum(id);
            }
        }

        if is_youtube_url(&lower) {
            if lower.contains("youtube.com/playlist")
                || (lower.contains("youtube.com/watch?") && has_query_param(&lower, "list"))
            {
                return Self::YoutubePlaylist(query.to_owned());
            }
            return Self::YoutubeVideo(query.to_owned());
        }

        Self::Search(query.to_owned())
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Self::YoutubePlaylist(_) | Self::SpotifyPlaylist(_) | Self::SpotifyAlbum(_)
        )
    }
}

fn is_youtube_url(lower: &str) -> bool {
    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(lower);

    ["www.youtube.com/", "youtube.com/", "m.youtube.com/", "music.youtube.com/", "youtu.be/"]
        .iter()
        .any(|host| without_scheme.starts_with(host))
}

fn has_query_param(url: &str, name: &str) -> bool {
    let Some((_, query)) = url.split_once('?') else {
        return false;
    };

    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, value)| key == name && !value.is_empty())
}

/// Spotify id: the path segment following `marker`, without query or fragment.
fn spotify_id(url: &str, marker: &str) -> Option<String> {
    let (_, rest) = url.split_once(marker)?;
    let id = rest
        .split(['?', '#', '/'])
        .next()
        .map(str::trim)
        .filter(|id| !id.is_empty())?;

    Some(id.to_owned())
}

#[cfg(test)]
mod tests {
    use super::QueryKind;

    #[test]
    fn youtube_videos_and_playlists() {
        assert_eq!(
            QueryKind::classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            QueryKind::YoutubeVideo("https://www.youtube.com/watch?v=dQw4w9WgXcQ".into())
        );
        assert_eq!(
            QueryKind::classify("https://youtu.be/dQw4w9WgXcQ"),
            QueryKind::YoutubeVideo("https://youtu.be/dQw4w9WgXcQ".into())
        );
        assert!(matches!(
            QueryKind::classify("https://www.youtube.com/playlist?list=PL123"),
            QueryKind::YoutubePlaylist(_)
        ));
        assert!(matches!(
            QueryKind::classify("https://www.youtube.com/watch?v=abc&list=PL123"),
            QueryKind::YoutubePlaylist(_)
        ));
        assert!(matches!(
            QueryKind::classify("https://www.youtube.com/watch?v=abc&list="),
            QueryKind::YoutubeVideo(_)
        ));
    }

    #[test]
    fn spotify_links_extract_ids() {
        assert_eq!(
            QueryKind::classify("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC?si=abc"),
            QueryKind::SpotifyTrack("4uLU6hMCjMI75M1A2tKUQC".into())
        );
        assert_eq!(
            QueryKind::classify("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M"),
            QueryKind::SpotifyPlaylist("37i9dQZF1DXcBWIGoYBM5M".into())
        );
        assert_eq!(
            QueryKind::classify("https://open.spotify.com/intl-fr/album/1DFixLWuPkv3KT3TnV35m3?si=x"),
            QueryKind::SpotifyAlbum("1DFixLWuPkv3KT3TnV35m3".into())
        );
    }

    #[test]
    fn everything_else_is_a_search() {
        assert_eq!(
            QueryKind::classify("  never gonna give you up "),
            QueryKind::Search("never gonna give you up".into())
        );
        assert!(matches!(
            QueryKind::classify("https://example.com/watch?v=1"),
            QueryKind::Search(_)
        ));
        assert!(matches!(
            QueryKind::classify("https://open.spotify.com/artist/abc"),
            QueryKind::Search(_)
        ));
    }

    #[test]
    fn collections() {
        assert!(QueryKind::SpotifyAlbum("x".into()).is_collection());
        assert!(!QueryKind::SpotifyTrack("x".into()).is_collection());
        assert!(!QueryKind::Search("x".into()).is_collection());
    }
}
