//! Core types for the playback session

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A podcast episode as handed over by the queue-population layer
///
/// Immutable once loaded. The session holds episodes through a shared
/// [`EpisodeQueue`], so loading a queue never deep-copies episode data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Episode identifier
    pub id: String,

    /// Episode title
    pub title: String,

    /// Participants, already joined into a display string
    pub members: String,

    /// Thumbnail reference (URL or asset path)
    pub thumbnail: String,

    /// Audio source reference handed to the device on bind
    #[serde(alias = "url")]
    pub source: String,

    /// Duration in whole seconds
    #[serde(alias = "duration")]
    pub duration_seconds: u32,
}

/// Ordered playback plan, shared with whoever populated it
pub type EpisodeQueue = Arc<[Episode]>;

/// Value copy of the session's authoritative state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub queue: EpisodeQueue,
    pub current_index: Option<usize>,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_shuffling: bool,
}

impl SessionState {
    /// The empty session: no queue, nothing selected, all flags off
    pub fn empty() -> Self {
        Self {
            queue: Arc::from(Vec::new()),
            current_index: None,
            is_playing: false,
            is_looping: false,
            is_shuffling: false,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::empty()
    }
}

/// Elapsed time in the current episode, as last reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Progress {
    /// Seconds elapsed, always within the episode's duration
    Available(u32),

    /// The device could not bind or play the current source
    Unavailable,
}

impl Progress {
    /// Seconds to display; unavailable progress shows as zero
    pub fn seconds(self) -> u32 {
        match self {
            Progress::Available(secs) => secs,
            Progress::Unavailable => 0,
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Progress::Available(_))
    }
}

impl Default for Progress {
    fn default() -> Self {
        Progress::Available(0)
    }
}

/// Configuration for the player
///
/// Every field has a default, so hosts can deserialize partial documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// Initial loop flag (default: false)
    pub looping: bool,

    /// Fixed seed for shuffle selection (default: seeded from entropy)
    pub shuffle_seed: Option<u64>,
}
