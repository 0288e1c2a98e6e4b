//! Player - session and device bridge under one owner
//!
//! The display layer talks to a [`Player`]: it reads snapshots, drains change
//! events and requests changes only through the session operations exposed
//! here. Every operation runs the bridge reaction to completion before
//! returning, so a selection change has always rebound the device and reset
//! progress before the next event is looked at.

use crate::bridge::DeviceBridge;
use crate::device::{
    DeviceEvent, DeviceEventSender, PlaybackDevice, SessionTransition, StampedEvent,
};
use crate::events::PlayerEvent;
use crate::format::format_duration;
use crate::session::PlaybackSession;
use crate::types::{Episode, EpisodeQueue, PlaybackConfig, Progress};
use serde::Serialize;
use std::sync::mpsc::{self, Receiver};

/// Everything the display layer renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSnapshot {
    pub current_episode: Option<Episode>,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_shuffling: bool,
    /// Elapsed seconds; 0 while unavailable
    pub progress_secs: u32,
    pub progress_available: bool,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PlayerSnapshot {
    /// Elapsed time as `M:SS`
    pub fn progress_label(&self) -> String {
        format_duration(self.progress_secs)
    }

    /// Episode length as `M:SS` (`0:00` when nothing is selected)
    pub fn duration_label(&self) -> String {
        format_duration(
            self.current_episode
                .as_ref()
                .map_or(0, |episode| episode.duration_seconds),
        )
    }
}

/// Session fields the player diffs to emit change events
#[derive(Debug, Clone, PartialEq, Eq)]
struct Observation {
    selection_generation: u64,
    episode_id: Option<String>,
    is_playing: bool,
    is_looping: bool,
    is_shuffling: bool,
}

impl Observation {
    fn of(session: &PlaybackSession) -> Self {
        Self {
            selection_generation: session.selection_generation(),
            episode_id: session.current_episode().map(|episode| episode.id.clone()),
            is_playing: session.is_playing(),
            is_looping: session.is_looping(),
            is_shuffling: session.is_shuffling(),
        }
    }
}

/// Single owner of the playback session and the device bridge
pub struct Player<D: PlaybackDevice> {
    session: PlaybackSession,
    bridge: DeviceBridge<D>,

    device_events_tx: mpsc::Sender<StampedEvent>,
    device_events_rx: Receiver<StampedEvent>,

    // Event queue for UI synchronization
    pending_events: Vec<PlayerEvent>,
}

impl<D: PlaybackDevice> Player<D> {
    /// Create a player driving `device`
    pub fn new(device: D, config: PlaybackConfig) -> Self {
        let (device_events_tx, device_events_rx) = mpsc::channel();

        let mut player = Self {
            session: PlaybackSession::new(&config),
            bridge: DeviceBridge::new(device),
            device_events_tx,
            device_events_rx,
            pending_events: Vec::new(),
        };
        player.bridge.sync(&player.session);
        player
    }

    // ===== Session operations =====

    /// Replace the queue and start playing at `start_index`
    pub fn play(&mut self, queue: impl Into<EpisodeQueue>, start_index: usize) {
        let queue = queue.into();
        self.apply(|session| session.play(queue, start_index));
    }

    /// Play a single episode on its own
    pub fn play_episode(&mut self, episode: Episode) {
        self.apply(|session| session.play_episode(episode));
    }

    pub fn toggle_play(&mut self) {
        self.apply(PlaybackSession::toggle_play);
    }

    pub fn set_playing_state(&mut self, playing: bool) {
        self.apply(|session| session.set_playing_state(playing));
    }

    pub fn toggle_loop(&mut self) {
        self.apply(PlaybackSession::toggle_loop);
    }

    pub fn toggle_shuffle(&mut self) {
        self.apply(PlaybackSession::toggle_shuffle);
    }

    pub fn play_next(&mut self) {
        self.apply(PlaybackSession::play_next);
    }

    pub fn play_previous(&mut self) {
        self.apply(PlaybackSession::play_previous);
    }

    pub fn clear(&mut self) {
        self.apply(PlaybackSession::clear);
    }

    /// Seek within the current episode; the display updates immediately
    pub fn handle_seek(&mut self, target_secs: u32) {
        self.bridge.handle_seek(target_secs);
        self.collect_bridge_events();
    }

    /// Bind the current episode again, e.g. after the source was unavailable
    pub fn retry_source(&mut self) {
        tracing::debug!(index = ?self.session.current_index(), "Retrying current source");
        self.bridge.rebind_current(&self.session);
        self.bridge.sync(&self.session);
        self.collect_bridge_events();
    }

    fn apply<F: FnOnce(&mut PlaybackSession)>(&mut self, transition: F) {
        let before = Observation::of(&self.session);
        transition(&mut self.session);
        self.bridge.sync(&self.session);
        self.emit_session_changes(&before);
        self.collect_bridge_events();
    }

    // ===== Device events =====

    /// Handle for device callbacks, possibly on other threads
    ///
    /// Events are stamped with the bind current when they are reported.
    /// Whatever is still queued when the device gets rebound (by a user
    /// operation or by an earlier event) is dropped on drain.
    pub fn event_sender(&self) -> DeviceEventSender {
        DeviceEventSender::new(self.device_events_tx.clone(), self.bridge.epoch_handle())
    }

    /// Apply every queued device event in arrival order
    ///
    /// Returns how many events were taken off the queue, stale ones included.
    pub fn process_device_events(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(StampedEvent { epoch, event }) = self.device_events_rx.try_recv() {
            self.apply_device_event(epoch, event);
            processed += 1;
        }
        processed
    }

    /// Apply one device event for the currently bound source immediately
    pub fn handle_device_event(&mut self, event: DeviceEvent) {
        let epoch = self.bridge.bind_epoch();
        self.apply_device_event(epoch, event);
    }

    fn apply_device_event(&mut self, epoch: u64, event: DeviceEvent) {
        tracing::debug!(?event, epoch, "Device event");

        if !self.bridge.handle_device_event(epoch, &event) {
            self.collect_bridge_events();
            return;
        }

        match event.transition() {
            Some(SessionTransition::PlayNext) => self.apply(PlaybackSession::play_next),
            Some(SessionTransition::SetPlaying(playing)) => {
                self.apply(|session| session.set_playing_state(playing));
            }
            None => self.collect_bridge_events(),
        }
    }

    // ===== State queries =====

    /// Read-only view of the session
    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn progress(&self) -> Progress {
        self.bridge.progress()
    }

    pub fn device(&self) -> &D {
        self.bridge.device()
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let progress = self.bridge.progress();

        PlayerSnapshot {
            current_episode: self.session.current_episode().cloned(),
            is_playing: self.session.is_playing(),
            is_looping: self.session.is_looping(),
            is_shuffling: self.session.is_shuffling(),
            progress_secs: progress.seconds(),
            progress_available: progress.is_available(),
            has_next: self.session.has_next(),
            has_previous: self.session.has_previous(),
        }
    }

    // ===== Events =====

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn emit_session_changes(&mut self, before: &Observation) {
        let after = Observation::of(&self.session);
        if after == *before {
            return;
        }

        if after.selection_generation != before.selection_generation {
            self.pending_events.push(PlayerEvent::EpisodeChanged {
                episode_id: after.episode_id.clone(),
                previous_episode_id: before.episode_id.clone(),
            });
        }

        if after.is_playing != before.is_playing {
            self.pending_events.push(PlayerEvent::StateChanged {
                is_playing: after.is_playing,
            });
        }

        if after.is_looping != before.is_looping || after.is_shuffling != before.is_shuffling {
            self.pending_events.push(PlayerEvent::ModesChanged {
                is_looping: after.is_looping,
                is_shuffling: after.is_shuffling,
            });
        }
    }

    fn collect_bridge_events(&mut self) {
        self.pending_events.extend(self.bridge.drain_events());
    }
}

impl<D: PlaybackDevice + Default> Default for Player<D> {
    fn default() -> Self {
        Self::new(D::default(), PlaybackConfig::default())
    }
}
