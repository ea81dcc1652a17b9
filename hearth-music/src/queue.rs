use std::collections::VecDeque;

use rand::Rng;
use serenity::all::UserId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SongSource {
    Youtube,
    Spotify,
}

impl SongSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Youtube => "YouTube",
            Self::Spotify => "Spotify",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Song {
    pub title: String,
    pub artist: Option<String>,
    /// Playable page url handed to yt-dlp.
    pub url: String,
    pub duration_secs: Option<u64>,
    pub thumbnail: Option<String>,
    pub source: SongSource,
    pub requested_by: UserId,
}

/// Per-guild song list. The head is the song currently playing.
#[derive(Clone, Debug, Default)]
pub struct SongQueue {
    songs: VecDeque<Song>,
}

impl SongQueue {
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn current(&self) -> Option<&Song> {
        self.songs.front()
    }

    pub fn next(&self) -> Option<&Song> {
        self.songs.get(1)
    }

    pub fn upcoming_len(&self) -> usize {
        self.songs.len().saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter()
    }

    /// Append songs, returning the 1-based position of the first one added.
    pub fn push_all(&mut self, songs: impl IntoIterator<Item = Song>) -> usize {
        let position = self.songs.len() + 1;
        self.songs.extend(songs);
        position
    }

    /// Drop the finished head and return it.
    pub fn advance(&mut self) -> Option<Song> {
        self.songs.pop_front()
    }

    /// Fisher-Yates over every song but the head.
    pub fn shuffle_upcoming<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let len = self.songs.len();
        if len < 3 {
            return;
        }

        for i in (2..len).rev() {
            let j = rng.gen_range(1..=i);
            self.songs.swap(i, j);
        }
    }

    /// Remove every song but the head, returning how many were dropped.
    pub fn clear_upcoming(&mut self) -> usize {
        let removed = self.upcoming_len();
        self.songs.truncate(1);
        removed
    }

    /// Sum of known durations plus how many songs have no known length.
    pub fn total_duration(&self) -> (u64, usize) {
        self.songs
            .iter()
            .fold((0, 0), |(total, unknown), song| match song.duration_secs {
                Some(secs) => (total + secs, unknown),
                None => (total, unknown + 1),
            })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serenity::all::UserId;

    use super::{Song, SongQueue, SongSource};

    fn song(title: &str, duration: Option<u64>) -> Song {
        Song {
            title: title.to_owned(),
            artist: None,
            url: format!("https://youtu.be/{title}"),
            duration_secs: duration,
            thumbnail: None,
            source: SongSource::Youtube,
            requested_by: UserId::new(1),
        }
    }

    fn queue_of(titles: &[&str]) -> SongQueue {
        let mut queue = SongQueue::default();
        queue.push_all(titles.iter().map(|title| song(title, Some(60))));
        queue
    }

    fn titles(queue: &SongQueue) -> Vec<String> {
        queue.iter().map(|song| song.title.clone()).collect()
    }

    #[test]
    fn push_reports_position_of_first_added() {
        let mut queue = SongQueue::default();
        assert_eq!(queue.push_all([song("a", None)]), 1);
        assert_eq!(queue.push_all([song("b", None), song("c", None)]), 2);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.upcoming_len(), 2);
    }

    #[test]
    fn advance_pops_the_head() {
        let mut queue = queue_of(&["a", "b"]);
        assert_eq!(queue.advance().map(|s| s.title), Some("a".to_owned()));
        assert_eq!(queue.current().map(|s| s.title.as_str()), Some("b"));
        assert_eq!(queue.next(), None);
        queue.advance();
        assert!(queue.is_empty());
        assert_eq!(queue.advance(), None);
    }

    #[test]
    fn shuffle_keeps_head_and_members() {
        let mut queue = queue_of(&["now", "a", "b", "c", "d", "e", "f"]);
        let mut rng = StdRng::seed_from_u64(7);
        queue.shuffle_upcoming(&mut rng);

        let shuffled = titles(&queue);
        assert_eq!(shuffled[0], "now");
        let mut rest = shuffled[1..].to_vec();
        rest.sort();
        assert_eq!(rest, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn shuffle_ignores_short_queues() {
        let mut queue = queue_of(&["now", "a"]);
        let mut rng = StdRng::seed_from_u64(1);
        queue.shuffle_upcoming(&mut rng);
        assert_eq!(titles(&queue), vec!["now", "a"]);
    }

    #[test]
    fn clear_upcoming_keeps_head() {
        let mut queue = queue_of(&["now", "a", "b"]);
        assert_eq!(queue.clear_upcoming(), 2);
        assert_eq!(titles(&queue), vec!["now"]);

        let mut empty = SongQueue::default();
        assert_eq!(empty.clear_upcoming(), 0);
    }

    #[test]
    fn total_duration_counts_unknowns() {
        let mut queue = SongQueue::default();
        queue.push_all([song("a", Some(90)), song("b", None), song("c", Some(30))]);
        assert_eq!(queue.total_duration(), (120, 1));
    }
}
