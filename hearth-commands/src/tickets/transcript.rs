use std::path::{Path, PathBuf};

use anyhow::Context as _;
use poise::serenity_prelude as serenity;

use hearth_utils::time::format_utc;

const RULE_WIDTH: usize = 70;
const FETCH_PAGE: u8 = 100;
const UNKNOWN_TIME: &str = "unknown time";

pub struct TranscriptHeader<'a> {
    pub channel_name: &'a str,
    pub channel_id: u64,
    pub guild_name: &'a str,
    pub guild_id: u64,
    pub creator: &'a str,
    pub creator_id: u64,
    pub created_at: u64,
    pub closed_by: &'a str,
    pub closed_by_id: u64,
    pub closed_at: u64,
}

#[derive(Clone, Debug)]
pub struct TranscriptEntry {
    pub sent_at: serenity::Timestamp,
    pub author: String,
    pub content: String,
    pub attachments: Vec<String>,
    /// Title of the first embed, `Some(None)` for an untitled one.
    pub embed_title: Option<Option<String>>,
}

impl TranscriptEntry {
    pub fn from_message(message: &serenity::Message) -> Self {
        Self {
            sent_at: message.timestamp,
            author: message.author.tag(),
            content: message.content.clone(),
            attachments: message
                .attachments
                .iter()
                .map(|attachment| attachment.url.clone())
                .collect(),
            embed_title: message.embeds.first().map(|embed| embed.title.clone()),
        }
    }
}

fn stamp(unix_secs: i64) -> String {
    format_utc(unix_secs).unwrap_or_else(|| UNKNOWN_TIME.to_owned())
}

fn stamp_stored(unix_secs: u64) -> String {
    i64::try_from(unix_secs).map_or_else(|_| UNKNOWN_TIME.to_owned(), stamp)
}

pub fn transcript_file_name(channel_id: u64) -> String {
    format!("transcript-{channel_id}.txt")
}

/// Plain-text transcript: header block, one line per message, footer.
pub fn render_transcript(header: &TranscriptHeader<'_>, entries: &[TranscriptEntry]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str("=== TRANSCRIPT ===\n");
    out.push_str(&format!("Channel: {}\n", header.channel_name));
    out.push_str(&format!("Channel ID: {}\n", header.channel_id));
    out.push_str(&format!("Created by: {} ({})\n", header.creator, header.creator_id));
    out.push_str(&format!("Created at: {}\n", stamp_stored(header.created_at)));
    out.push_str(&format!("Closed by: {} ({})\n", header.closed_by, header.closed_by_id));
    out.push_str(&format!("Closed at: {}\n", stamp_stored(header.closed_at)));
    out.push_str(&format!("Total messages: {}\n", entries.len()));
    out.push_str(&format!("Server: {} ({})\n", header.guild_name, header.guild_id));
    out.push_str(&format!("\n{rule}\n\n"));

    for entry in entries {
        out.push_str(&format!(
            "[{}] {}: {}\n",
            stamp(entry.sent_at.unix_timestamp()),
            entry.author,
            entry.content
        ));
        for url in &entry.attachments {
            out.push_str(&format!("  -> File: {url}\n"));
        }
        if let Some(title) = &entry.embed_title {
            out.push_str(&format!(
                "  -> Embed: [{}]\n",
                title.as_deref().unwrap_or("Untitled")
            ));
        }
    }

    out.push_str(&format!("\n{rule}\n"));
    out.push_str(&format!("Generated at: {}\n", stamp_stored(header.closed_at)));
    out
}

/// Every message in the channel, oldest first.
pub async fn fetch_all_messages(
    http: &serenity::Http,
    channel_id: serenity::ChannelId,
) -> anyhow::Result<Vec<serenity::Message>> {
    let mut messages = Vec::new();
    let mut before: Option<serenity::MessageId> = None;

    loop {
        let mut request = serenity::GetMessages::new().limit(FETCH_PAGE);
        if let Some(id) = before {
            request = request.before(id);
        }

        let page = channel_id.messages(http, request).await?;
        let Some(oldest) = page.last() else {
            break;
        };
        before = Some(oldest.id);
        let done = page.len() < usize::from(FETCH_PAGE);
        messages.extend(page);

        if done {
            break;
        }
    }

    messages.reverse();
    Ok(messages)
}

pub async fn save_transcript(dir: &Path, file_name: &str, content: &str) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create transcript directory {}", dir.display()))?;

    let path = dir.join(file_name);
    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("failed to write transcript {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::{TranscriptEntry, TranscriptHeader, render_transcript, transcript_file_name};

    fn at(unix_secs: i64) -> serenity::Timestamp {
        serenity::Timestamp::from_unix_timestamp(unix_secs).expect("valid timestamp")
    }

    fn header() -> TranscriptHeader<'static> {
        TranscriptHeader {
            channel_name: "ticket-sam",
            channel_id: 10,
            guild_name: "Hearth",
            guild_id: 1,
            creator: "sam",
            creator_id: 20,
            created_at: 0,
            closed_by: "mod",
            closed_by_id: 30,
            closed_at: 3_600,
        }
    }

    #[test]
    fn renders_header_and_message_lines() {
        let entries = vec![
            TranscriptEntry {
                sent_at: at(60),
                author: "sam".into(),
                content: "hello".into(),
                attachments: vec!["https://cdn.example/a.png".into()],
                embed_title: None,
            },
            TranscriptEntry {
                sent_at: at(120),
                author: "Hearth".into(),
                content: String::new(),
                attachments: vec![],
                embed_title: Some(None),
            },
        ];

        let text = render_transcript(&header(), &entries);

        assert!(text.starts_with("=== TRANSCRIPT ===\nChannel: ticket-sam\n"));
        assert!(text.contains("Closed by: mod (30)\n"));
        assert!(text.contains("Total messages: 2\n"));
        assert!(text.contains("[1970-01-01 00:01:00 UTC] sam: hello\n  -> File: https://cdn.example/a.png\n"));
        assert!(text.contains("  -> Embed: [Untitled]\n"));
        assert!(text.ends_with("Generated at: 1970-01-01 01:00:00 UTC\n"));
    }

    #[test]
    fn empty_channel_still_has_header() {
        let text = render_transcript(&header(), &[]);
        assert!(text.contains("Total messages: 0\n"));
    }

    #[test]
    fn unrepresentable_stored_times_are_marked_unknown() {
        let header = TranscriptHeader {
            closed_at: u64::MAX,
            ..header()
        };
        let text = render_transcript(&header, &[]);
        assert!(text.contains("Closed at: unknown time\n"));
        assert!(text.contains("Created at: 1970-01-01 00:00:00 UTC\n"));
    }

    #[test]
    fn file_name_uses_channel_id() {
        assert_eq!(transcript_file_name(42), "transcript-42.txt");
    }
}
