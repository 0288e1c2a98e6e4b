//! Podcastr - Playback Session Core
//!
//! Playback session management for a sequential podcast queue.
//!
//! This crate provides:
//! - A session store (queue, current episode, play/loop/shuffle flags)
//! - Shuffle selection over an injected, seedable RNG
//! - A device bridge keeping one audio device in step with the session
//! - Display progress folded from device-reported time
//! - `M:SS` duration formatting for the display layer
//!
//! # Architecture
//!
//! `podcastr-playback` never touches audio itself:
//! - No dependency on an audio backend
//! - No dependency on a UI toolkit
//! - No persistence, no network
//!
//! The audio device is supplied through the [`PlaybackDevice`] trait. Device
//! callbacks report back through a [`DeviceEventSender`].
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use podcastr_playback::{Episode, PlaybackConfig, PlaybackDevice, Player, Result};
//!
//! // Implement PlaybackDevice for your platform
//! #[derive(Default)]
//! struct SilentDevice;
//!
//! impl PlaybackDevice for SilentDevice {
//!     fn bind(&mut self, _source_ref: &str) -> Result<()> { Ok(()) }
//!     fn resume(&mut self) -> Result<()> { Ok(()) }
//!     fn pause(&mut self) -> Result<()> { Ok(()) }
//!     fn seek(&mut self, _seconds: u32) -> Result<()> { Ok(()) }
//!     fn set_looping(&mut self, _looping: bool) -> Result<()> { Ok(()) }
//!     fn disconnect(&mut self) -> Result<()> { Ok(()) }
//! }
//!
//! let mut player = Player::new(SilentDevice, PlaybackConfig::default());
//!
//! let episode = Episode {
//!     id: "ep1".to_string(),
//!     title: "Pilot".to_string(),
//!     members: "Ana, Bruno".to_string(),
//!     thumbnail: "https://cdn.example.com/ep1.jpg".to_string(),
//!     source: "https://cdn.example.com/ep1.mp3".to_string(),
//!     duration_seconds: 125,
//! };
//!
//! player.play(vec![episode], 0);
//! assert!(player.snapshot().is_playing);
//!
//! player.handle_seek(65);
//! assert_eq!(player.snapshot().progress_label(), "1:05");
//! assert_eq!(player.snapshot().duration_label(), "2:05");
//! ```
//!
//! # Example: Device Events
//!
//! ```rust,no_run
//! # use podcastr_playback::{PlaybackConfig, PlaybackDevice, Player, Result};
//! # #[derive(Default)]
//! # struct SilentDevice;
//! # impl PlaybackDevice for SilentDevice {
//! #     fn bind(&mut self, _: &str) -> Result<()> { Ok(()) }
//! #     fn resume(&mut self) -> Result<()> { Ok(()) }
//! #     fn pause(&mut self) -> Result<()> { Ok(()) }
//! #     fn seek(&mut self, _: u32) -> Result<()> { Ok(()) }
//! #     fn set_looping(&mut self, _: bool) -> Result<()> { Ok(()) }
//! #     fn disconnect(&mut self) -> Result<()> { Ok(()) }
//! # }
//! let mut player = Player::new(SilentDevice, PlaybackConfig::default());
//!
//! // Hand this to the backend's callbacks
//! let events = player.event_sender();
//! std::thread::spawn(move || {
//!     events.metadata_loaded();
//!     events.position_advanced(12);
//!     events.ended();
//! });
//!
//! // On the owning thread, apply them in arrival order
//! player.process_device_events();
//! for event in player.drain_events() {
//!     println!("{:?}", event);
//! }
//! ```

mod bridge;
mod device;
mod error;
mod events;
mod format;
mod player;
mod session;
mod shuffle;
pub mod types;

// Public exports
pub use bridge::DeviceBridge;
pub use device::{DeviceEvent, DeviceEventSender, PlaybackDevice, SessionTransition};
pub use error::{PlaybackError, Result};
pub use events::PlayerEvent;
pub use format::format_duration;
pub use player::{Player, PlayerSnapshot};
pub use session::PlaybackSession;
pub use shuffle::next_shuffle_index;
pub use types::{Episode, EpisodeQueue, PlaybackConfig, Progress, SessionState};
