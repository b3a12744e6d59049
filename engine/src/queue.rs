use parking_lot::Mutex;
use rand::Rng;

use playback_types::Track;

/// Ordered, mutable list of pending tracks.
///
/// Mutation (`append_many`, `push_front`, `remove_where_id`, `clear`,
/// `dequeue_next`) only ever happens from the loop's single-consumer
/// context; the inner `Mutex` exists solely so `snapshot` is safe to call
/// from any thread, not to allow concurrent writers.
#[derive(Default)]
pub struct TrackQueue {
    tracks: Mutex<Vec<Track>>,
}

impl TrackQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_many(&self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }
        self.tracks.lock().extend(tracks);
    }

    pub fn push_front(&self, track: Track) {
        self.tracks.lock().insert(0, track);
    }

    /// Removes every track whose `uri` matches `uri`, wherever it sits in
    /// the queue. Used by `PlayNow` to dedup before front-inserting.
    pub fn remove_where_id(&self, uri: &str) {
        self.tracks.lock().retain(|t| t.uri != uri);
    }

    pub fn clear(&self) {
        self.tracks.lock().clear();
    }

    /// Removes and returns the next track to play: the head when
    /// `shuffle` is `false`, a uniformly random element otherwise.
    pub fn dequeue_next(&self, shuffle: bool) -> Option<Track> {
        let mut tracks = self.tracks.lock();
        if tracks.is_empty() {
            return None;
        }
        let index = if shuffle {
            rand::thread_rng().gen_range(0..tracks.len())
        } else {
            0
        };
        Some(tracks.remove(index))
    }

    /// A consistent point-in-time copy, safe to call from any thread.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Track> {
        self.tracks.lock().clone()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.tracks.lock().len()
    }
}
