use std::process::Stdio;

use anyhow::Context as _;
use serde::Deserialize;
use tokio::process::Command;

const YTDLP_BINARY: &str = "yt-dlp";

#[derive(Clone, Debug, Deserialize)]
pub struct VideoInfo {
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub webpage_url: Option<String>,
    pub duration: Option<f64>,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistInfo {
    #[serde(default)]
    entries: Vec<Option<VideoInfo>>,
}

impl VideoInfo {
    /// Best page url for playback: the webpage url, a full entry url, or one built from the id.
    pub fn page_url(&self) -> Option<String> {
        if let Some(url) = self.webpage_url.as_deref().filter(|url| url.starts_with("http")) {
            return Some(url.to_owned());
        }
        if let Some(url) = self.url.as_deref().filter(|url| url.starts_with("http")) {
            return Some(url.to_owned());
        }
        self.id
            .as_deref()
            .map(|id| format!("https://www.youtube.com/watch?v={id}"))
    }

    pub fn duration_secs(&self) -> Option<u64> {
        self.duration
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(|secs| secs.round() as u64)
    }

    pub fn thumbnail_url(&self) -> Option<String> {
        self.thumbnail
            .clone()
            .or_else(|| self.thumbnails.last().map(|thumb| thumb.url.clone()))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(
            self.title.as_deref(),
            Some("[Private video]") | Some("[Deleted video]")
        )
    }
}

async fn run(args: &[&str]) -> anyhow::Result<Vec<u8>> {
    let output = Command::new(YTDLP_BINARY)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("failed to spawn {YTDLP_BINARY}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{YTDLP_BINARY} exited with {}: {}", output.status, stderr.trim());
    }

    Ok(output.stdout)
}

/// Metadata for a single video url.
pub async fn video_info(url: &str) -> anyhow::Result<VideoInfo> {
    let stdout = run(&["-j", "--no-playlist", "--no-warnings", url]).await?;
    serde_json::from_slice(&stdout).context("invalid yt-dlp video json")
}

/// Up to `limit` search results for a free-text query.
pub async fn search(query: &str, limit: usize) -> anyhow::Result<Vec<VideoInfo>> {
    let target = format!("ytsearch{limit}:{query}");
    let stdout = run(&["-j", "--flat-playlist", "--no-warnings", &target]).await?;
    parse_json_lines(&stdout)
}

/// Flat playlist entries, in playlist order, without unavailable videos.
pub async fn playlist_entries(url: &str, limit: usize) -> anyhow::Result<Vec<VideoInfo>> {
    let end = limit.to_string();
    let stdout = run(&[
        "-J",
        "--flat-playlist",
        "--no-warnings",
        "--playlist-end",
        &end,
        url,
    ])
    .await?;

    let playlist: PlaylistInfo =
        serde_json::from_slice(&stdout).context("invalid yt-dlp playlist json")?;

    Ok(playlist
        .entries
        .into_iter()
        .flatten()
        .filter(|entry| !entry.is_unavailable())
        .take(limit)
        .collect())
}

fn parse_json_lines(stdout: &[u8]) -> anyhow::Result<Vec<VideoInfo>> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).context("invalid yt-dlp search json"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{VideoInfo, parse_json_lines};

    #[test]
    fn parses_search_lines() {
        let raw = br#"{"id":"abc","title":"First","url":"https://www.youtube.com/watch?v=abc","duration":212.0}
{"id":"def","title":"Second","duration":null}
"#;
        let results = parse_json_lines(raw).expect("valid lines");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].duration_secs(), Some(212));
        assert_eq!(
            results[1].page_url().as_deref(),
            Some("https://www.youtube.com/watch?v=def")
        );
        assert_eq!(results[1].duration_secs(), None);
    }

    #[test]
    fn flags_unavailable_entries() {
        let entry: VideoInfo =
            serde_json::from_str(r#"{"id":"x","title":"[Private video]"}"#).expect("json");
        assert!(entry.is_unavailable());
    }

    #[test]
    fn thumbnail_falls_back_to_list() {
        let entry: VideoInfo = serde_json::from_str(
            r#"{"id":"x","thumbnails":[{"url":"small"},{"url":"large"}]}"#,
        )
        .expect("json");
        assert_eq!(entry.thumbnail_url().as_deref(), Some("large"));
    }
}
