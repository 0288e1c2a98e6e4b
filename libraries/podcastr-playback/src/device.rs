//! Audio-rendering device contract
//!
//! The bridge only needs a handful of fire-and-forget commands from the
//! device. Completion is observed later through [`DeviceEvent`]s, never by
//! waiting on a command.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{SendError, Sender};
use std::sync::Arc;

/// Minimum capability set the bridge requires from an audio device
///
/// Implementors wrap a concrete backend (an HTML media element behind a
/// webview, a native decoder + output stream, a cast target, ...).
pub trait PlaybackDevice {
    /// Point the device at a new audio source
    ///
    /// Supersedes whatever was bound before, including its pending events.
    /// Returns `Err` when the reference cannot be resolved at all; failures
    /// found later are reported with [`DeviceEvent::Failed`].
    fn bind(&mut self, source_ref: &str) -> Result<()>;

    /// Start or continue rendering the bound source
    fn resume(&mut self) -> Result<()>;

    /// Pause rendering, keeping the position
    fn pause(&mut self) -> Result<()>;

    /// Move the playback position
    fn seek(&mut self, seconds: u32) -> Result<()>;

    /// Restart the source on natural end instead of reporting `Ended`
    fn set_looping(&mut self, looping: bool) -> Result<()>;

    /// Drop the bound source and go silent
    fn disconnect(&mut self) -> Result<()>;
}

impl<D: PlaybackDevice + ?Sized> PlaybackDevice for Box<D> {
    fn bind(&mut self, source_ref: &str) -> Result<()> {
        (**self).bind(source_ref)
    }

    fn resume(&mut self) -> Result<()> {
        (**self).resume()
    }

    fn pause(&mut self) -> Result<()> {
        (**self).pause()
    }

    fn seek(&mut self, seconds: u32) -> Result<()> {
        (**self).seek(seconds)
    }

    fn set_looping(&mut self, looping: bool) -> Result<()> {
        (**self).set_looping(looping)
    }

    fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect()
    }
}

/// Events reported by the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceEvent {
    /// Playback position moved; arrives at irregular intervals
    PositionAdvanced(u32),

    /// The bound source played to its end (never fires while looping)
    Ended,

    /// The bound source finished loading and is ready to report progress
    MetadataLoaded,

    /// The device started rendering on its own (media keys, autoplay)
    Played,

    /// The device stopped rendering on its own
    Paused,

    /// The bound source failed after binding
    Failed(String),
}

/// Session transition requested by a device event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTransition {
    PlayNext,
    SetPlaying(bool),
}

impl DeviceEvent {
    /// Event-to-transition table
    ///
    /// Events without a session transition are handled inside the bridge
    /// (progress, arming, availability).
    pub fn transition(&self) -> Option<SessionTransition> {
        match self {
            DeviceEvent::Ended => Some(SessionTransition::PlayNext),
            DeviceEvent::Played => Some(SessionTransition::SetPlaying(true)),
            DeviceEvent::Paused => Some(SessionTransition::SetPlaying(false)),
            DeviceEvent::PositionAdvanced(_)
            | DeviceEvent::MetadataLoaded
            | DeviceEvent::Failed(_) => None,
        }
    }
}

/// Counter of device binds, shared between the bridge and event senders
///
/// Every bind (and disconnect) starts a new epoch. Events are stamped with
/// the epoch current when they are reported, so anything reported for a
/// superseded source is recognisable once it is drained.
#[derive(Debug, Clone, Default)]
pub(crate) struct BindEpoch(Arc<AtomicU64>);

impl BindEpoch {
    pub(crate) fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn advance(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// A device event together with the bind it was reported for
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StampedEvent {
    pub(crate) epoch: u64,
    pub(crate) event: DeviceEvent,
}

/// Handle for device callbacks to report events
///
/// Cloneable and `Send`, so backends may report from their own threads. The
/// owning [`Player`](crate::Player) applies events in arrival order and
/// drops those reported before the device was last rebound.
#[derive(Debug, Clone)]
pub struct DeviceEventSender {
    tx: Sender<StampedEvent>,
    epoch: BindEpoch,
}

impl DeviceEventSender {
    pub(crate) fn new(tx: Sender<StampedEvent>, epoch: BindEpoch) -> Self {
        Self { tx, epoch }
    }

    /// Report an event; fails only once the player is gone
    pub fn send(&self, event: DeviceEvent) -> std::result::Result<(), SendError<DeviceEvent>> {
        let stamped = StampedEvent {
            epoch: self.epoch.current(),
            event,
        };
        self.tx.send(stamped).map_err(|e| SendError(e.0.event))
    }

    pub fn position_advanced(&self, seconds: u32) {
        self.report(DeviceEvent::PositionAdvanced(seconds));
    }

    pub fn ended(&self) {
        self.report(DeviceEvent::Ended);
    }

    pub fn metadata_loaded(&self) {
        self.report(DeviceEvent::MetadataLoaded);
    }

    pub fn played(&self) {
        self.report(DeviceEvent::Played);
    }

    pub fn paused(&self) {
        self.report(DeviceEvent::Paused);
    }

    pub fn failed(&self, reason: impl Into<String>) {
        self.report(DeviceEvent::Failed(reason.into()));
    }

    fn report(&self, event: DeviceEvent) {
        if let Err(e) = self.send(event) {
            tracing::debug!(event = ?e.0, "Player dropped, discarding device event");
        }
    }
}
