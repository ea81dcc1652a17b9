use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serenity::all::{Cache, ChannelId, CreateMessage, GuildId, Http};
use serenity::async_trait;
use songbird::events::{Event, EventContext, EventHandler as VoiceEventHandler, TrackEvent};
use songbird::input::YoutubeDl;
use songbird::tracks::TrackHandle;
use songbird::{CoreEvent, Songbird};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::embeds::{notice_embed, now_playing_embed};
use crate::queue::{Song, SongQueue};
use crate::resolver::TrackResolver;

pub const DEFAULT_VOLUME_PERCENT: u8 = 50;
const NEXT_SONG_DELAY: Duration = Duration::from_secs(1);
const IDLE_LEAVE_DELAY: Duration = Duration::from_secs(30);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const EMPTY_CHANNEL_DELAY: Duration = Duration::from_secs(60);

/// Where a guild's session lives and reports to.
#[derive(Clone)]
pub struct SessionTarget {
    pub guild_id: GuildId,
    pub voice_channel_id: ChannelId,
    pub text_channel_id: ChannelId,
    pub http: Arc<Http>,
}

struct GuildSession {
    queue: SongQueue,
    voice_channel_id: ChannelId,
    text_channel_id: ChannelId,
    http: Arc<Http>,
    handle: Option<TrackHandle>,
    /// Generation of the track the driver is playing, if any.
    playing: Option<u64>,
    generation: u64,
    paused: bool,
    volume_percent: u8,
    reconnect_attempted: bool,
    empty_check_pending: bool,
}

/// What the session does once a track ends.
#[derive(Debug, PartialEq, Eq)]
enum AfterTrack {
    PlayNext,
    LeaveWhenIdle,
}

#[derive(Debug)]
struct TrackEnd {
    finished: Option<Song>,
    next: AfterTrack,
}

impl GuildSession {
    fn new(target: &SessionTarget) -> Self {
        Self {
            queue: SongQueue::default(),
            voice_channel_id: target.voice_channel_id,
            text_channel_id: target.text_channel_id,
            http: Arc::clone(&target.http),
            handle: None,
            playing: None,
            generation: 0,
            paused: false,
            volume_percent: DEFAULT_VOLUME_PERCENT,
            reconnect_attempted: false,
            empty_check_pending: false,
        }
    }

    fn notifier(&self) -> Notifier {
        Notifier {
            http: Arc::clone(&self.http),
            channel_id: self.text_channel_id,
        }
    }

    /// Append songs. Returns the position of the first one and whether playback should start.
    fn accept_songs(&mut self, songs: Vec<Song>) -> (usize, bool) {
        let position = self.queue.push_all(songs);
        (position, self.playing.is_none() && position == 1)
    }

    /// Mark the queue head as playing under a fresh generation.
    fn begin_track(&mut self) -> Option<(Song, u64)> {
        let song = self.queue.current().cloned()?;
        self.generation += 1;
        self.playing = Some(self.generation);
        self.paused = false;
        Some((song, self.generation))
    }

    /// `None` when the event belongs to a track that was already replaced.
    fn finish_track(&mut self, generation: u64) -> Option<TrackEnd> {
        if self.playing != Some(generation) {
            return None;
        }

        self.playing = None;
        self.handle = None;
        self.paused = false;
        let finished = self.queue.advance();
        let next = if self.queue.is_empty() {
            AfterTrack::LeaveWhenIdle
        } else {
            AfterTrack::PlayNext
        };
        Some(TrackEnd { finished, next })
    }

    fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.playing.is_none()
    }

    /// The channel to rejoin, or `None` when a reconnect was already tried.
    fn claim_reconnect(&mut self) -> Option<ChannelId> {
        if self.reconnect_attempted {
            return None;
        }
        self.reconnect_attempted = true;
        Some(self.voice_channel_id)
    }

    fn reconnect_settled(&mut self) {
        self.reconnect_attempted = false;
    }

    /// Whether an empty-channel countdown should start now.
    fn begin_empty_check(&mut self, humans: usize) -> bool {
        if self.empty_check_pending || humans > 0 {
            return false;
        }
        self.empty_check_pending = true;
        true
    }
}

#[derive(Clone)]
struct Notifier {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl Notifier {
    async fn send(&self, message: CreateMessage) {
        if let Err(source) = self.channel_id.send_message(&*self.http, message).await {
            warn!(?source, channel_id = self.channel_id.get(), "music notice failed");
        }
    }

    async fn notice(&self, text: impl Into<String>) {
        self.send(CreateMessage::new().embed(notice_embed(text))).await;
    }
}

#[derive(Clone, Debug)]
pub struct EnqueueOutcome {
    pub first: Song,
    pub added: usize,
    /// 1-based queue position of the first added song.
    pub position: usize,
    /// Whether playback started with this request.
    pub started: bool,
}

#[derive(Clone, Debug)]
pub struct QueueSnapshot {
    pub songs: Vec<Song>,
    pub paused: bool,
    pub volume_percent: u8,
    pub total_secs: u64,
    pub unknown_durations: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ControlError {
    NotPlaying,
    NoNextSong,
    NotEnoughSongs,
    Driver,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotPlaying => "Nothing is playing right now.",
            Self::NoNextSong => "There is no next song in the queue.",
            Self::NotEnoughSongs => "Need at least two upcoming songs to shuffle.",
            Self::Driver => "The voice connection rejected that request.",
        })
    }
}

impl std::error::Error for ControlError {}

struct Inner {
    songbird: Arc<Songbird>,
    http_client: reqwest::Client,
    resolver: TrackResolver,
    sessions: Mutex<HashMap<GuildId, GuildSession>>,
}

/// Per-guild music queues and their voice connections.
#[derive(Clone)]
pub struct MusicService {
    inner: Arc<Inner>,
}

impl fmt::Debug for MusicService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MusicService")
            .field("resolver", &self.inner.resolver)
            .finish_non_exhaustive()
    }
}

impl MusicService {
    pub fn new(songbird: Arc<Songbird>, http_client: reqwest::Client, resolver: TrackResolver) -> Self {
        Self {
            inner: Arc::new(Inner {
                songbird,
                http_client,
                resolver,
                sessions: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn resolver(&self) -> &TrackResolver {
        &self.inner.resolver
    }

    pub async fn voice_channel(&self, guild_id: GuildId) -> Option<ChannelId> {
        let sessions = self.inner.sessions.lock().await;
        sessions.get(&guild_id).map(|session| session.voice_channel_id)
    }

    /// Join if needed, append songs, and start playback when the queue was idle.
    pub async fn enqueue(
        &self,
        target: SessionTarget,
        songs: Vec<Song>,
    ) -> anyhow::Result<EnqueueOutcome> {
        let Some(first) = songs.first().cloned() else {
            anyhow::bail!("enqueue called without songs");
        };

        let needs_join = {
            let sessions = self.inner.sessions.lock().await;
            !sessions.contains_key(&target.guild_id)
        };

        if needs_join {
            let call = self
                .inner
                .songbird
                .join(target.guild_id, target.voice_channel_id)
                .await?;
            call.lock().await.add_global_event(
                CoreEvent::DriverDisconnect.into(),
                DisconnectHandler {
                    service: self.clone(),
                    guild_id: target.guild_id,
                },
            );
            info!(guild_id = target.guild_id.get(), "joined voice channel");
        }

        let added = songs.len();
        let (position, started) = {
            let mut sessions = self.inner.sessions.lock().await;
            let session = sessions
                .entry(target.guild_id)
                .or_insert_with(|| GuildSession::new(&target));
            session.text_channel_id = target.text_channel_id;
            session.accept_songs(songs)
        };

        if started {
            self.start_current(target.guild_id, false).await;
        }

        Ok(EnqueueOutcome {
            first,
            added,
            position,
            started,
        })
    }

    pub async fn snapshot(&self, guild_id: GuildId) -> Option<QueueSnapshot> {
        let sessions = self.inner.sessions.lock().await;
        let session = sessions.get(&guild_id)?;
        let (total_secs, unknown_durations) = session.queue.total_duration();

        Some(QueueSnapshot {
            songs: session.queue.iter().cloned().collect(),
            paused: session.paused,
            volume_percent: session.volume_percent,
            total_secs,
            unknown_durations,
        })
    }

    /// Stop the current song; the end-of-track handler moves on to the next.
    pub async fn skip(&self, guild_id: GuildId) -> Result<Song, ControlError> {
        let sessions = self.inner.sessions.lock().await;
        let session = sessions.get(&guild_id).ok_or(ControlError::NotPlaying)?;
        let handle = session.handle.as_ref().ok_or(ControlError::NotPlaying)?;
        if session.queue.next().is_none() {
            return Err(ControlError::NoNextSong);
        }

        let skipped = session.queue.current().cloned().ok_or(ControlError::NotPlaying)?;
        handle.stop().map_err(|_| ControlError::Driver)?;
        Ok(skipped)
    }

    /// Returns the new paused state.
    pub async fn toggle_pause(&self, guild_id: GuildId) -> Result<bool, ControlError> {
        let mut sessions = self.inner.sessions.lock().await;
        let session = sessions.get_mut(&guild_id).ok_or(ControlError::NotPlaying)?;
        let handle = session.handle.as_ref().ok_or(ControlError::NotPlaying)?;

        if session.paused {
            handle.play().map_err(|_| ControlError::Driver)?;
        } else {
            handle.pause().map_err(|_| ControlError::Driver)?;
        }

        session.paused = !session.paused;
        Ok(session.paused)
    }

    pub async fn set_volume(&self, guild_id: GuildId, percent: u8) -> Result<(), ControlError> {
        let mut sessions = self.inner.sessions.lock().await;
        let session = sessions.get_mut(&guild_id).ok_or(ControlError::NotPlaying)?;
        let percent = percent.min(100);

        if let Some(handle) = session.handle.as_ref() {
            handle
                .set_volume(volume_gain(percent))
                .map_err(|_| ControlError::Driver)?;
        }

        session.volume_percent = percent;
        Ok(())
    }

    /// Returns how many upcoming songs were shuffled.
    pub async fn shuffle(&self, guild_id: GuildId) -> Result<usize, ControlError> {
        let mut sessions = self.inner.sessions.lock().await;
        let session = sessions.get_mut(&guild_id).ok_or(ControlError::NotPlaying)?;
        let upcoming = session.queue.upcoming_len();
        if upcoming < 2 {
            return Err(ControlError::NotEnoughSongs);
        }

        session.queue.shuffle_upcoming(&mut rand::thread_rng());
        Ok(upcoming)
    }

    /// Returns how many upcoming songs were removed.
    pub async fn clear_upcoming(&self, guild_id: GuildId) -> Result<usize, ControlError> {
        let mut sessions = self.inner.sessions.lock().await;
        let session = sessions.get_mut(&guild_id).ok_or(ControlError::NotPlaying)?;
        Ok(session.queue.clear_upcoming())
    }

    /// Clear the queue and leave voice. Returns whether anything was playing.
    pub async fn stop(&self, guild_id: GuildId) -> bool {
        self.cleanup(guild_id, None).await
    }

    /// The bot was removed from voice by someone else.
    pub async fn handle_bot_disconnected(&self, guild_id: GuildId) {
        if self.cleanup(guild_id, None).await {
            info!(guild_id = guild_id.get(), "disconnected from voice externally; session cleared");
        }
    }

    pub async fn handle_bot_moved(&self, guild_id: GuildId, channel_id: ChannelId) {
        let mut sessions = self.inner.sessions.lock().await;
        if let Some(session) = sessions.get_mut(&guild_id) {
            session.voice_channel_id = channel_id;
        }
    }

    /// Leave after a grace period if only bots remain in the session's channel.
    pub async fn check_channel_occupancy(&self, guild_id: GuildId, cache: Arc<Cache>) {
        {
            let mut sessions = self.inner.sessions.lock().await;
            let Some(session) = sessions.get_mut(&guild_id) else {
                return;
            };
            let humans = humans_in_channel(&cache, guild_id, session.voice_channel_id);
            if !session.begin_empty_check(humans) {
                return;
            }
        }

        let service = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(EMPTY_CHANNEL_DELAY).await;

            let still_empty = {
                let mut sessions = service.inner.sessions.lock().await;
                let Some(session) = sessions.get_mut(&guild_id) else {
                    return;
                };
                session.empty_check_pending = false;
                humans_in_channel(&cache, guild_id, session.voice_channel_id) == 0
            };

            if still_empty {
                service
                    .cleanup(guild_id, Some("Everyone left the voice channel, so I stopped the music."))
                    .await;
            }
        });
    }

    async fn start_current(&self, guild_id: GuildId, announce: bool) {
        let Some(call) = self.inner.songbird.get(guild_id) else {
            warn!(guild_id = guild_id.get(), "no voice call for active session");
            self.cleanup(guild_id, None).await;
            return;
        };

        let (song, notifier) = {
            let mut sessions = self.inner.sessions.lock().await;
            let Some(session) = sessions.get_mut(&guild_id) else {
                return;
            };
            let Some((song, generation)) = session.begin_track() else {
                return;
            };

            let input = YoutubeDl::new(self.inner.http_client.clone(), song.url.clone());
            let handle = call.lock().await.play_only_input(input.into());

            if let Err(source) = handle.set_volume(volume_gain(session.volume_percent)) {
                debug!(?source, "failed to apply volume to new track");
            }
            for (event, failed) in [(TrackEvent::End, false), (TrackEvent::Error, true)] {
                let handler = TrackFinishedHandler {
                    service: self.clone(),
                    guild_id,
                    generation,
                    failed,
                };
                if let Err(source) = handle.add_event(Event::Track(event), handler) {
                    warn!(?source, "failed to register track event");
                }
            }

            session.handle = Some(handle);
            (song, session.notifier())
        };

        info!(guild_id = guild_id.get(), title = %song.title, "playing song");
        if announce {
            notifier
                .send(CreateMessage::new().embed(now_playing_embed(&song)))
                .await;
        }
    }

    async fn on_track_finished(&self, guild_id: GuildId, generation: u64, failed: bool) {
        let (end, notifier) = {
            let mut sessions = self.inner.sessions.lock().await;
            let Some(session) = sessions.get_mut(&guild_id) else {
                return;
            };
            let Some(end) = session.finish_track(generation) else {
                debug!(guild_id = guild_id.get(), generation, "ignoring stale track event");
                return;
            };
            (end, session.notifier())
        };

        if failed && let Some(song) = end.finished.as_ref() {
            warn!(guild_id = guild_id.get(), title = %song.title, "track failed to play");
            notifier
                .notice(format!("Couldn't play **{}**, skipping it.", song.title))
                .await;
        }

        let service = self.clone();
        match end.next {
            AfterTrack::PlayNext => tokio::spawn(async move {
                tokio::time::sleep(NEXT_SONG_DELAY).await;
                service.start_current(guild_id, true).await;
            }),
            AfterTrack::LeaveWhenIdle => tokio::spawn(async move {
                tokio::time::sleep(IDLE_LEAVE_DELAY).await;
                service.leave_if_idle(guild_id).await;
            }),
        };
    }

    async fn leave_if_idle(&self, guild_id: GuildId) {
        let idle = {
            let sessions = self.inner.sessions.lock().await;
            sessions.get(&guild_id).is_some_and(GuildSession::is_idle)
        };

        if idle {
            self.cleanup(guild_id, Some("The queue is empty, so I left the voice channel."))
                .await;
        }
    }

    async fn on_driver_disconnect(&self, guild_id: GuildId) {
        tokio::time::sleep(RECONNECT_DELAY).await;

        let channel_id = {
            let mut sessions = self.inner.sessions.lock().await;
            let Some(session) = sessions.get_mut(&guild_id) else {
                return;
            };
            let Some(channel_id) = session.claim_reconnect() else {
                return;
            };
            channel_id
        };

        if let Some(call) = self.inner.songbird.get(guild_id)
            && call.lock().await.current_connection().is_some()
        {
            self.clear_reconnect_flag(guild_id).await;
            return;
        }

        match self.inner.songbird.join(guild_id, channel_id).await {
            Ok(_) => {
                info!(guild_id = guild_id.get(), "voice connection re-established");
                self.clear_reconnect_flag(guild_id).await;
            }
            Err(source) => {
                warn!(?source, guild_id = guild_id.get(), "voice reconnect failed");
                self.cleanup(guild_id, Some("I lost the voice connection and couldn't reconnect."))
                    .await;
            }
        }
    }

    async fn clear_reconnect_flag(&self, guild_id: GuildId) {
        let mut sessions = self.inner.sessions.lock().await;
        if let Some(session) = sessions.get_mut(&guild_id) {
            session.reconnect_settled();
        }
    }

    /// Drop the session and leave the call. Returns whether a session existed.
    async fn cleanup(&self, guild_id: GuildId, notice: Option<&str>) -> bool {
        let removed = self.inner.sessions.lock().await.remove(&guild_id);

        if let Some(handle) = removed.as_ref().and_then(|session| session.handle.as_ref()) {
            let _ = handle.stop();
        }

        if let Err(source) = self.inner.songbird.remove(guild_id).await {
            debug!(?source, guild_id = guild_id.get(), "no voice call to remove");
        }

        let Some(session) = removed else {
            return false;
        };

        if let Some(text) = notice {
            session.notifier().notice(text).await;
        }
        true
    }
}

/// Songbird gain for a 0..=100 volume.
pub fn volume_gain(percent: u8) -> f32 {
    f32::from(percent.min(100)) / 100.0
}

fn humans_in_channel(cache: &Cache, guild_id: GuildId, channel_id: ChannelId) -> usize {
    let Some(guild) = cache.guild(guild_id) else {
        return 0;
    };

    guild
        .voice_states
        .values()
        .filter(|state| state.channel_id == Some(channel_id))
        .filter(|state| {
            let is_bot = state
                .member
                .as_ref()
                .map(|member| member.user.bot)
                .or_else(|| cache.user(state.user_id).map(|user| user.bot))
                .unwrap_or(false);
            !is_bot
        })
        .count()
}

struct TrackFinishedHandler {
    service: MusicService,
    guild_id: GuildId,
    generation: u64,
    failed: bool,
}

#[async_trait]
impl VoiceEventHandler for TrackFinishedHandler {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(_) = ctx {
            self.service
                .on_track_finished(self.guild_id, self.generation, self.failed)
                .await;
        }
        None
    }
}

struct DisconnectHandler {
    service: MusicService,
    guild_id: GuildId,
}

#[async_trait]
impl VoiceEventHandler for DisconnectHandler {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::DriverDisconnect(_) = ctx {
            let service = self.service.clone();
            let guild_id = self.guild_id;
            tokio::spawn(async move { service.on_driver_disconnect(guild_id).await });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serenity::all::{ChannelId, GuildId, Http, UserId};

    use super::{AfterTrack, ControlError, GuildSession, SessionTarget, volume_gain};
    use crate::queue::{Song, SongSource};

    fn session() -> GuildSession {
        GuildSession::new(&SessionTarget {
            guild_id: GuildId::new(1),
            voice_channel_id: ChannelId::new(2),
            text_channel_id: ChannelId::new(3),
            http: Arc::new(Http::new("token")),
        })
    }

    fn song(title: &str) -> Song {
        Song {
            title: title.to_owned(),
            artist: None,
            url: format!("https://youtu.be/{title}"),
            duration_secs: Some(60),
            thumbnail: None,
            source: SongSource::Youtube,
            requested_by: UserId::new(4),
        }
    }

    #[test]
    fn volume_is_linear_and_clamped() {
        assert_eq!(volume_gain(0), 0.0);
        assert_eq!(volume_gain(50), 0.5);
        assert_eq!(volume_gain(100), 1.0);
        assert_eq!(volume_gain(200), 1.0);
    }

    #[test]
    fn control_errors_read_as_sentences() {
        assert!(ControlError::NoNextSong.to_string().ends_with('.'));
        assert!(ControlError::NotEnoughSongs.to_string().contains("shuffle"));
    }

    #[test]
    fn enqueue_starts_playback_only_when_idle() {
        let mut session = session();
        assert_eq!(session.accept_songs(vec![song("a"), song("b")]), (1, true));

        session.begin_track();
        assert_eq!(session.accept_songs(vec![song("c")]), (3, false));
    }

    #[test]
    fn enqueue_waits_for_a_pending_next_song() {
        let mut session = session();
        session.accept_songs(vec![song("a"), song("b")]);
        let (_, generation) = session.begin_track().unwrap();
        session.finish_track(generation).unwrap();

        // "b" is about to start after the delay.
        assert_eq!(session.accept_songs(vec![song("c")]), (2, false));
    }

    #[test]
    fn stale_track_events_are_ignored() {
        let mut session = session();
        session.accept_songs(vec![song("a"), song("b")]);
        let (_, first) = session.begin_track().unwrap();
        let (_, second) = session.begin_track().unwrap();

        assert!(session.finish_track(first).is_none());
        assert_eq!(session.queue.len(), 2);
        assert_eq!(session.playing, Some(second));
    }

    #[test]
    fn finished_track_advances_to_the_next_song() {
        let mut session = session();
        session.accept_songs(vec![song("a"), song("b")]);
        let (playing, generation) = session.begin_track().unwrap();
        assert_eq!(playing.title, "a");

        let end = session.finish_track(generation).unwrap();
        assert_eq!(end.finished.map(|song| song.title), Some("a".to_owned()));
        assert_eq!(end.next, AfterTrack::PlayNext);
        assert_eq!(session.queue.current().map(|song| song.title.as_str()), Some("b"));
        assert!(!session.is_idle());

        assert!(session.finish_track(generation).is_none());
    }

    #[test]
    fn last_track_ending_leaves_when_idle() {
        let mut session = session();
        session.accept_songs(vec![song("a")]);
        let (_, generation) = session.begin_track().unwrap();

        let end = session.finish_track(generation).unwrap();
        assert_eq!(end.next, AfterTrack::LeaveWhenIdle);
        assert!(session.is_idle());
    }

    #[test]
    fn begin_track_needs_a_song() {
        let mut session = session();
        assert!(session.begin_track().is_none());
        assert!(session.playing.is_none());
    }

    #[test]
    fn reconnect_is_attempted_once_until_settled() {
        let mut session = session();
        assert_eq!(session.claim_reconnect(), Some(ChannelId::new(2)));
        assert_eq!(session.claim_reconnect(), None);

        session.reconnect_settled();
        assert_eq!(session.claim_reconnect(), Some(ChannelId::new(2)));
    }

    #[test]
    fn empty_channel_countdown_runs_once() {
        let mut session = session();
        assert!(!session.begin_empty_check(1));
        assert!(session.begin_empty_check(0));
        assert!(!session.begin_empty_check(0));
    }
}
