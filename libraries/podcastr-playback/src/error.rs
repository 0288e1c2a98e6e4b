//! Error types for the playback device boundary
//!
//! Session transitions are total and never return these. They only surface
//! from [`PlaybackDevice`](crate::PlaybackDevice) implementations, and the
//! bridge absorbs them into a degraded display state.

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The audio source reference could not be resolved or opened
    #[error("Source unavailable: {source_ref}: {reason}")]
    SourceUnavailable {
        /// Source reference that failed to bind
        source_ref: String,
        /// Device-provided reason
        reason: String,
    },

    /// Device rejected a command (resume, pause, seek, ...)
    #[error("Device error: {0}")]
    Device(String),
}

/// Result type for device operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
