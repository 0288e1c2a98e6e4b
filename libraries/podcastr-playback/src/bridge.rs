//! Playback device bridge
//!
//! Keeps the one live device consistent with the session and turns
//! device-reported time into the displayed progress value. The bridge never
//! mutates the session; device events that need a session transition are
//! mapped by [`DeviceEvent::transition`] and applied by the owner.

use crate::device::{BindEpoch, DeviceEvent, PlaybackDevice};
use crate::events::PlayerEvent;
use crate::session::PlaybackSession;
use crate::types::{Episode, Progress};

/// What the bridge last pushed to (or heard from) the device
///
/// `None` means unknown, which forces the next sync to issue the command.
#[derive(Debug, Clone, Copy, Default)]
struct DeviceView {
    selection_generation: u64,
    is_playing: Option<bool>,
    is_looping: Option<bool>,
}

/// Translator between the session and a live audio device
pub struct DeviceBridge<D: PlaybackDevice> {
    device: D,

    // Source currently bound, if binding succeeded
    bound_source: Option<String>,
    duration_secs: u32,

    progress: Progress,

    // Position events are only trusted once the bound source reported its metadata
    progress_armed: bool,

    // Advanced on every rebind; events stamped with an older epoch are stale
    epoch: BindEpoch,

    view: DeviceView,
    pending_events: Vec<PlayerEvent>,
}

impl<D: PlaybackDevice> DeviceBridge<D> {
    /// Wrap a device; nothing is bound until the first sync sees a selection
    pub fn new(device: D) -> Self {
        Self {
            device,
            bound_source: None,
            duration_secs: 0,
            progress: Progress::default(),
            progress_armed: false,
            epoch: BindEpoch::default(),
            view: DeviceView::default(),
            pending_events: Vec::new(),
        }
    }

    // ===== Session -> device =====

    /// Issue whatever device commands the session state now calls for
    ///
    /// A selection change is handled first and to completion (progress reset,
    /// rebind), then the loop flag, then play/pause.
    pub fn sync(&mut self, session: &PlaybackSession) {
        if session.selection_generation() != self.view.selection_generation {
            self.view.selection_generation = session.selection_generation();
            self.rebind(session.current_episode());
        }

        if self.bound_source.is_none() {
            return;
        }

        let looping = session.is_looping();
        if self.view.is_looping != Some(looping) {
            tracing::debug!(looping, "Device looping");
            if let Err(e) = self.device.set_looping(looping) {
                tracing::warn!("Failed to set device looping: {}", e);
            }
            self.view.is_looping = Some(looping);
        }

        let playing = session.is_playing();
        if self.view.is_playing != Some(playing) {
            self.view.is_playing = Some(playing);
            if playing {
                tracing::debug!("Device resume");
                if let Err(e) = self.device.resume() {
                    self.mark_unavailable(format!("resume failed: {}", e));
                }
            } else {
                tracing::debug!("Device pause");
                if let Err(e) = self.device.pause() {
                    tracing::warn!("Failed to pause device: {}", e);
                }
            }
        }
    }

    /// Bind the current episode again after a failure
    ///
    /// The session is untouched; the next sync replays loop and play state.
    pub fn rebind_current(&mut self, session: &PlaybackSession) {
        self.rebind(session.current_episode());
    }

    fn rebind(&mut self, episode: Option<&Episode>) {
        let epoch = self.epoch.advance();
        tracing::debug!(epoch, "New bind epoch");

        self.progress_armed = false;
        self.set_progress(Progress::Available(0));

        // A freshly bound source is silent and has no loop setting yet
        self.view.is_playing = Some(false);
        self.view.is_looping = None;

        match episode {
            Some(episode) => {
                tracing::debug!(episode = %episode.id, source = %episode.source, "Binding source");
                self.duration_secs = episode.duration_seconds;

                match self.device.bind(&episode.source) {
                    Ok(()) => self.bound_source = Some(episode.source.clone()),
                    Err(e) => {
                        self.bound_source = None;
                        self.mark_unavailable(e.to_string());
                    }
                }
            }
            None => {
                self.duration_secs = 0;
                if self.bound_source.take().is_some() {
                    tracing::debug!("Disconnecting device");
                    if let Err(e) = self.device.disconnect() {
                        tracing::warn!("Failed to disconnect device: {}", e);
                    }
                }
            }
        }
    }

    /// Move the device to `target_secs` and show it right away
    ///
    /// The displayed value does not wait for the device to confirm. Targets
    /// past the end are clamped to the episode's duration.
    pub fn handle_seek(&mut self, target_secs: u32) {
        if self.bound_source.is_none() {
            tracing::debug!(target_secs, "Seek ignored, no source bound");
            return;
        }

        let target = target_secs.min(self.duration_secs);
        self.set_progress(Progress::Available(target));

        if let Err(e) = self.device.seek(target) {
            self.mark_unavailable(format!("seek failed: {}", e));
        }
    }

    // ===== Device -> bridge =====

    /// Apply the bridge-local part of a device event reported in `epoch`
    ///
    /// Returns `false` when the event is stale (reported before the last
    /// rebind, or nothing bound) and its session transition must be dropped
    /// too.
    pub fn handle_device_event(&mut self, epoch: u64, event: &DeviceEvent) -> bool {
        if epoch != self.epoch.current() {
            tracing::debug!(
                ?event,
                epoch,
                current = self.epoch.current(),
                "Stale device event, ignoring"
            );
            return false;
        }

        if self.bound_source.is_none() {
            tracing::debug!(?event, "Device event with no source bound, ignoring");
            return false;
        }

        match event {
            DeviceEvent::PositionAdvanced(seconds) => {
                if self.progress_armed {
                    self.set_progress(Progress::Available((*seconds).min(self.duration_secs)));
                }
            }
            DeviceEvent::MetadataLoaded => {
                self.progress_armed = true;
                self.set_progress(Progress::Available(0));
                if let Err(e) = self.device.seek(0) {
                    tracing::warn!("Failed to rewind freshly loaded source: {}", e);
                }
            }
            DeviceEvent::Played => self.view.is_playing = Some(true),
            DeviceEvent::Paused => self.view.is_playing = Some(false),
            DeviceEvent::Ended => {}
            DeviceEvent::Failed(reason) => {
                self.progress_armed = false;
                self.mark_unavailable(reason.clone());
            }
        }

        true
    }

    // ===== Progress =====

    fn set_progress(&mut self, progress: Progress) {
        if self.progress == progress {
            return;
        }

        let previous_secs = self.progress.seconds();
        self.progress = progress;

        if progress.seconds() != previous_secs {
            self.pending_events.push(PlayerEvent::ProgressUpdated {
                progress_secs: progress.seconds(),
            });
        }
    }

    fn mark_unavailable(&mut self, message: String) {
        tracing::warn!(source = ?self.bound_source, "Source unavailable: {}", message);
        self.set_progress(Progress::Unavailable);
        self.pending_events.push(PlayerEvent::SourceUnavailable { message });
    }

    /// Current displayed progress
    pub fn progress(&self) -> Progress {
        self.progress
    }

    /// Epoch of the current bind; events reported now belong to it
    pub fn bind_epoch(&self) -> u64 {
        self.epoch.current()
    }

    pub(crate) fn epoch_handle(&self) -> BindEpoch {
        self.epoch.clone()
    }

    /// Source reference the device is bound to
    pub fn bound_source(&self) -> Option<&str> {
        self.bound_source.as_deref()
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Take events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }
}
