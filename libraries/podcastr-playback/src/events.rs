//! Player events
//!
//! Change notifications for the display layer. They are queued while
//! operations run and drained by the host, which forwards them to whatever UI
//! it drives:
//! - Play/pause changes
//! - Episode changes (including to and from nothing selected)
//! - Loop/shuffle changes
//! - Progress updates
//! - Device failures

use serde::{Deserialize, Serialize};

/// Events emitted by the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Playing flag changed
    StateChanged {
        is_playing: bool,
    },

    /// Selected episode changed
    EpisodeChanged {
        /// ID of the new episode (`None` once cleared)
        episode_id: Option<String>,
        /// ID of the episode selected before
        previous_episode_id: Option<String>,
    },

    /// Loop or shuffle flag changed
    ModesChanged {
        is_looping: bool,
        is_shuffling: bool,
    },

    /// Displayed progress changed
    ProgressUpdated {
        progress_secs: u32,
    },

    /// The device could not bind or play the current source
    SourceUnavailable {
        /// Human-readable reason
        message: String,
    },
}
