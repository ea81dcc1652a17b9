use std::time::Duration;

use rand::seq::SliceRandom;
use tracing::{info, warn};

use poise::serenity_prelude as serenity;

const ROTATION_INTERVAL: Duration = Duration::from_secs(100);
const STREAM_URL: &str = "https://www.twitch.tv/anyme023";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Custom(&'static str),
    Streaming(&'static str),
    Playing(&'static str),
    Competing(&'static str),
    Listening(&'static str),
}

const STATUSES: [Status; 5] = [
    Status::Custom("Nah, i'd win"),
    Status::Streaming("the best streamer"),
    Status::Playing("with the best bot"),
    Status::Competing("the best community"),
    Status::Listening("#lopsa"),
];

impl Status {
    fn activity(self) -> serenity::ActivityData {
        match self {
            Self::Custom(text) => serenity::ActivityData::custom(text),
            Self::Streaming(name) => serenity::ActivityData::streaming(name, STREAM_URL)
                .unwrap_or_else(|_| serenity::ActivityData::playing(name)),
            Self::Playing(name) => serenity::ActivityData::playing(name),
            Self::Competing(name) => serenity::ActivityData::competing(name),
            Self::Listening(name) => serenity::ActivityData::listening(name),
        }
    }
}

/// Log who we are and start rotating the bot's activity.
pub fn start(ctx: &serenity::Context, ready: &serenity::Ready) {
    info!(
        user = %ready.user.tag(),
        guilds = ready.guilds.len(),
        "connected to the gateway"
    );

    let ctx = ctx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ROTATION_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(status) = STATUSES.choose(&mut rand::thread_rng()).copied() else {
                warn!("no presence statuses configured");
                return;
            };
            ctx.set_presence(Some(status.activity()), serenity::OnlineStatus::Online);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::{STATUSES, Status};

    #[test]
    fn every_status_has_text() {
        for status in STATUSES {
            let text = match status {
                Status::Custom(text)
                | Status::Streaming(text)
                | Status::Playing(text)
                | Status::Competing(text)
                | Status::Listening(text) => text,
            };
            assert!(!text.is_empty());
        }
    }
}
