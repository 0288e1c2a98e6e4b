//! Playback session store
//!
//! Single source of truth for the queue, the current position and the
//! play/loop/shuffle flags. Every operation is a total transition: nothing
//! here does I/O and nothing can fail.

use crate::shuffle::next_shuffle_index;
use crate::types::{Episode, EpisodeQueue, PlaybackConfig, SessionState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Authoritative playback session
///
/// States are Empty / Loaded-Paused / Loaded-Playing, crossed with the two
/// independent mode flags. Empty is initial and there is no terminal state.
#[derive(Debug)]
pub struct PlaybackSession {
    queue: EpisodeQueue,
    current_index: Option<usize>,
    is_playing: bool,
    is_looping: bool,
    is_shuffling: bool,

    // Bumped whenever the selected episode may have changed
    selection_generation: u64,

    rng: StdRng,
}

impl PlaybackSession {
    /// Create an empty session
    pub fn new(config: &PlaybackConfig) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            queue: Arc::from(Vec::new()),
            current_index: None,
            is_playing: false,
            is_looping: config.looping,
            is_shuffling: config.shuffle,
            selection_generation: 0,
            rng,
        }
    }

    /// Create an empty session with a fixed shuffle seed
    pub fn with_seed(seed: u64) -> Self {
        Self::new(&PlaybackConfig {
            shuffle_seed: Some(seed),
            ..PlaybackConfig::default()
        })
    }

    // ===== Transitions =====

    /// Replace the queue and start playing at `start_index`
    ///
    /// `start_index` must be valid for `queue`. An out-of-range index is a
    /// caller bug: it asserts in debug builds and is ignored in release.
    pub fn play(&mut self, queue: impl Into<EpisodeQueue>, start_index: usize) {
        let queue = queue.into();

        debug_assert!(
            start_index < queue.len(),
            "start index {start_index} out of range for queue of {}",
            queue.len()
        );
        if start_index >= queue.len() {
            tracing::error!(
                start_index,
                queue_len = queue.len(),
                "play called with out-of-range start index, ignoring"
            );
            return;
        }

        tracing::debug!(start_index, queue_len = queue.len(), "Loading queue");

        self.queue = queue;
        self.current_index = Some(start_index);
        self.is_playing = true;
        self.selection_generation += 1;
    }

    /// Play a single episode as a one-item queue
    pub fn play_episode(&mut self, episode: Episode) {
        self.play(vec![episode], 0);
    }

    /// Flip the playing flag (no effect while nothing is selected)
    pub fn toggle_play(&mut self) {
        if self.current_index.is_none() {
            return;
        }
        self.is_playing = !self.is_playing;
        tracing::debug!(is_playing = self.is_playing, "Toggled play");
    }

    /// Set the playing flag directly
    ///
    /// Used for play/pause transitions reported by the device itself.
    pub fn set_playing_state(&mut self, playing: bool) {
        if self.current_index.is_none() {
            return;
        }
        self.is_playing = playing;
    }

    pub fn toggle_loop(&mut self) {
        self.is_looping = !self.is_looping;
        tracing::debug!(is_looping = self.is_looping, "Toggled loop");
    }

    pub fn toggle_shuffle(&mut self) {
        self.is_shuffling = !self.is_shuffling;
        tracing::debug!(is_shuffling = self.is_shuffling, "Toggled shuffle");
    }

    /// Advance according to the current mode
    ///
    /// Shuffling draws a random other episode. Otherwise moves one forward,
    /// and at the end of the queue holds position without touching the
    /// playing flag.
    pub fn play_next(&mut self) {
        let Some(current) = self.current_index else {
            return;
        };

        let next = if self.is_shuffling {
            next_shuffle_index(&mut self.rng, self.queue.len(), Some(current))
        } else if current + 1 < self.queue.len() {
            current + 1
        } else {
            tracing::debug!(index = current, "Queue exhausted, holding position");
            return;
        };

        // A one-episode shuffle draws the same slot; treat it as holding position
        if next != current {
            self.select(next);
        }
    }

    /// Step back one episode; no wraparound at the start
    pub fn play_previous(&mut self) {
        if let Some(current) = self.current_index.filter(|&current| current > 0) {
            self.select(current - 1);
        }
    }

    /// Reset to the empty session
    pub fn clear(&mut self) {
        tracing::debug!("Clearing session");

        // Only a real deselection counts as a selection change
        if self.current_index.take().is_some() {
            self.selection_generation += 1;
        }

        self.queue = Arc::from(Vec::new());
        self.is_playing = false;
        self.is_looping = false;
        self.is_shuffling = false;
    }

    fn select(&mut self, index: usize) {
        tracing::debug!(from = ?self.current_index, to = index, "Selecting episode");

        self.current_index = Some(index);
        self.selection_generation += 1;
    }

    // ===== Derived predicates =====

    /// Whether `play_next` can move anywhere
    pub fn has_next(&self) -> bool {
        match self.current_index {
            Some(current) => self.is_shuffling || current + 1 < self.queue.len(),
            None => false,
        }
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.current_index, Some(current) if current > 0)
    }

    // ===== State queries =====

    pub fn queue(&self) -> &EpisodeQueue {
        &self.queue
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_episode(&self) -> Option<&Episode> {
        self.current_index.and_then(|index| self.queue.get(index))
    }

    /// Playing flag; always false while nothing is selected
    pub fn is_playing(&self) -> bool {
        self.current_index.is_some() && self.is_playing
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn is_shuffling(&self) -> bool {
        self.is_shuffling
    }

    /// Counter that changes every time the selected episode may have changed
    ///
    /// Loading a new queue at the same index still bumps it.
    pub fn selection_generation(&self) -> u64 {
        self.selection_generation
    }

    /// Value copy of the session state
    pub fn state(&self) -> SessionState {
        SessionState {
            queue: Arc::clone(&self.queue),
            current_index: self.current_index,
            is_playing: self.is_playing(),
            is_looping: self.is_looping,
            is_shuffling: self.is_shuffling,
        }
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}
