//! Integration tests for the player
//!
//! Drive the session and bridge together through a recording device and
//! check what the display layer and the device end up seeing.

use podcastr_playback::{
    DeviceEvent, Episode, PlaybackConfig, PlaybackDevice, PlaybackError, Player, PlayerEvent,
    Progress,
};
use std::collections::HashSet;
use std::thread;

// ===== Test Helpers =====

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Bind(String),
    Resume,
    Pause,
    Seek(u32),
    Looping(bool),
    Disconnect,
}

/// Device that records every command it receives
#[derive(Debug, Default)]
struct RecordingDevice {
    calls: Vec<Call>,
    unreachable_sources: HashSet<String>,
}

impl RecordingDevice {
    fn failing_on(source: &str) -> Self {
        Self {
            unreachable_sources: HashSet::from([source.to_string()]),
            ..Default::default()
        }
    }

    fn binds(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Bind(source) => Some(source.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl PlaybackDevice for RecordingDevice {
    fn bind(&mut self, source_ref: &str) -> podcastr_playback::Result<()> {
        self.calls.push(Call::Bind(source_ref.to_string()));
        if self.unreachable_sources.contains(source_ref) {
            return Err(PlaybackError::SourceUnavailable {
                source_ref: source_ref.to_string(),
                reason: "404".to_string(),
            });
        }
        Ok(())
    }

    fn resume(&mut self) -> podcastr_playback::Result<()> {
        self.calls.push(Call::Resume);
        Ok(())
    }

    fn pause(&mut self) -> podcastr_playback::Result<()> {
        self.calls.push(Call::Pause);
        Ok(())
    }

    fn seek(&mut self, seconds: u32) -> podcastr_playback::Result<()> {
        self.calls.push(Call::Seek(seconds));
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) -> podcastr_playback::Result<()> {
        self.calls.push(Call::Looping(looping));
        Ok(())
    }

    fn disconnect(&mut self) -> podcastr_playback::Result<()> {
        self.calls.push(Call::Disconnect);
        Ok(())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn episode(id: &str, duration_seconds: u32) -> Episode {
    Episode {
        id: id.to_string(),
        title: format!("Episode {}", id),
        members: "Diego, Richard".to_string(),
        thumbnail: format!("https://cdn.example.com/{}.jpg", id),
        source: format!("https://cdn.example.com/{}.mp3", id),
        duration_seconds,
    }
}

fn source(id: &str) -> String {
    format!("https://cdn.example.com/{}.mp3", id)
}

fn player() -> Player<RecordingDevice> {
    init_tracing();
    Player::new(
        RecordingDevice::default(),
        PlaybackConfig {
            shuffle_seed: Some(42),
            ..Default::default()
        },
    )
}

// ===== Scenarios =====

#[test]
fn progress_follows_device_and_seek_is_immediate() {
    let mut player = player();
    player.play(vec![episode("a", 125), episode("b", 60)], 0);

    let snapshot = player.snapshot();
    assert_eq!(snapshot.progress_secs, 0);
    assert_eq!(snapshot.duration_label(), "2:05");

    player.handle_device_event(DeviceEvent::MetadataLoaded);
    player.handle_device_event(DeviceEvent::PositionAdvanced(65));
    assert_eq!(player.snapshot().progress_label(), "1:05");

    player.handle_seek(10);
    assert_eq!(player.snapshot().progress_label(), "0:10");
    assert_eq!(player.device().calls.last(), Some(&Call::Seek(10)));
}

#[test]
fn play_emits_episode_and_state_changes() {
    let mut player = player();
    player.play(vec![episode("a", 125)], 0);

    assert_eq!(
        player.drain_events(),
        vec![
            PlayerEvent::EpisodeChanged {
                episode_id: Some("a".to_string()),
                previous_episode_id: None,
            },
            PlayerEvent::StateChanged { is_playing: true },
        ]
    );
    assert!(!player.has_pending_events());
    assert_eq!(
        player.device().calls,
        vec![Call::Bind(source("a")), Call::Looping(false), Call::Resume]
    );
}

#[test]
fn ended_mid_queue_advances_and_rebinds() {
    let mut player = player();
    player.play(vec![episode("a", 125), episode("b", 60)], 0);
    player.handle_device_event(DeviceEvent::MetadataLoaded);
    player.handle_device_event(DeviceEvent::PositionAdvanced(125));

    player.handle_device_event(DeviceEvent::Ended);

    let snapshot = player.snapshot();
    assert_eq!(snapshot.current_episode.unwrap().id, "b");
    assert_eq!(snapshot.progress_secs, 0);
    assert!(snapshot.is_playing);
    assert!(snapshot.has_previous);
    assert!(!snapshot.has_next);
    assert_eq!(player.device().binds(), vec![source("a"), source("b")]);
}

#[test]
fn ended_on_last_episode_holds_position() {
    let mut player = player();
    player.play(vec![episode("a", 125), episode("b", 60)], 1);
    player.drain_events();
    let calls_before = player.device().calls.len();

    player.handle_device_event(DeviceEvent::Ended);

    let snapshot = player.snapshot();
    assert_eq!(player.session().current_index(), Some(1));
    assert!(snapshot.is_playing);
    assert_eq!(player.device().calls.len(), calls_before);
    assert!(player.drain_events().is_empty());
}

#[test]
fn device_play_state_does_not_echo_commands() {
    let mut player = player();
    player.play(vec![episode("a", 125)], 0);
    let calls_before = player.device().calls.len();

    player.handle_device_event(DeviceEvent::Paused);
    assert!(!player.snapshot().is_playing);

    player.handle_device_event(DeviceEvent::Played);
    assert!(player.snapshot().is_playing);

    assert_eq!(player.device().calls.len(), calls_before);
}

#[test]
fn toggle_play_drives_device() {
    let mut player = player();
    player.play(vec![episode("a", 125)], 0);

    player.toggle_play();
    player.toggle_play();

    let calls = &player.device().calls;
    assert_eq!(&calls[calls.len() - 2..], &[Call::Pause, Call::Resume]);
}

#[test]
fn loop_is_delegated_to_device() {
    let mut player = player();
    player.play(vec![episode("a", 125), episode("b", 60)], 0);

    player.toggle_loop();
    assert_eq!(player.device().calls.last(), Some(&Call::Looping(true)));
    assert!(player.snapshot().is_looping);

    // The bound source keeps looping after moving on
    player.play_next();
    let calls = &player.device().calls;
    assert_eq!(
        &calls[calls.len() - 3..],
        &[Call::Bind(source("b")), Call::Looping(true), Call::Resume]
    );
}

#[test]
fn stale_position_from_previous_source_never_shows() {
    let mut player = player();
    player.play(vec![episode("a", 125), episode("b", 60)], 0);
    player.handle_device_event(DeviceEvent::MetadataLoaded);
    player.drain_events();

    let events = player.event_sender();
    let old_source = events.clone();
    thread::spawn(move || {
        old_source.ended();
        // Late tick from the old source, queued behind its end
        old_source.position_advanced(50);
    })
    .join()
    .unwrap();

    assert_eq!(player.process_device_events(), 2);
    assert_eq!(player.session().current_index(), Some(1));
    assert_eq!(player.progress(), Progress::Available(0));
    assert!(!player
        .drain_events()
        .contains(&PlayerEvent::ProgressUpdated { progress_secs: 50 }));

    // Reports made after the rebind belong to the new source
    thread::spawn(move || {
        events.metadata_loaded();
        events.position_advanced(3);
    })
    .join()
    .unwrap();

    assert_eq!(player.process_device_events(), 2);
    assert_eq!(player.progress(), Progress::Available(3));
}

#[test]
fn queued_progress_does_not_leak_into_next_episode() {
    let mut player = player();
    player.play(vec![episode("a", 125), episode("b", 60), episode("c", 30)], 0);
    let events = player.event_sender();

    events.metadata_loaded();
    events.position_advanced(45);
    player.play_next();
    player.drain_events();

    assert_eq!(player.process_device_events(), 2);
    assert_eq!(player.session().current_index(), Some(1));
    assert_eq!(player.progress(), Progress::Available(0));
    assert!(player.drain_events().is_empty());

    // Position still waits for the new source's own metadata
    events.position_advanced(12);
    player.process_device_events();
    assert_eq!(player.progress(), Progress::Available(0));

    events.metadata_loaded();
    events.position_advanced(12);
    player.process_device_events();
    assert_eq!(player.progress(), Progress::Available(12));
}

#[test]
fn queued_end_does_not_skip_past_next_episode() {
    let mut player = player();
    player.play(vec![episode("a", 125), episode("b", 60), episode("c", 30)], 0);
    let events = player.event_sender();

    events.ended();
    player.play_next();
    player.process_device_events();

    assert_eq!(player.session().current_index(), Some(1));
    assert_eq!(player.device().binds(), vec![source("a"), source("b")]);
}

#[test]
fn queued_pause_does_not_stop_previous_episode() {
    let mut player = player();
    player.play(vec![episode("a", 125), episode("b", 60)], 1);
    let events = player.event_sender();

    events.paused();
    events.ended();
    player.play_previous();
    let calls_before = player.device().calls.len();

    assert_eq!(player.process_device_events(), 2);
    assert_eq!(player.session().current_index(), Some(0));
    assert!(player.snapshot().is_playing);
    assert_eq!(player.device().calls.len(), calls_before);
}

#[test]
fn queued_events_do_not_act_on_a_replaced_queue() {
    let mut player = player();
    player.play(vec![episode("a", 125), episode("b", 60)], 0);
    let events = player.event_sender();

    events.metadata_loaded();
    events.position_advanced(30);
    events.ended();
    player.play(vec![episode("c", 90), episode("d", 40)], 0);
    player.drain_events();

    assert_eq!(player.process_device_events(), 3);
    let snapshot = player.snapshot();
    assert_eq!(snapshot.current_episode.unwrap().id, "c");
    assert_eq!(snapshot.progress_secs, 0);
    assert!(player.drain_events().is_empty());
}

#[test]
fn queued_events_do_not_survive_clear() {
    let mut player = player();
    player.play(vec![episode("a", 125), episode("b", 60)], 0);
    let events = player.event_sender();

    events.metadata_loaded();
    events.ended();
    player.clear();
    // Starting over before the queue is drained
    player.play(vec![episode("a", 125), episode("b", 60)], 0);

    assert_eq!(player.process_device_events(), 2);
    assert_eq!(player.session().current_index(), Some(0));
    assert_eq!(player.progress(), Progress::Available(0));
}

#[test]
fn unavailable_source_keeps_session_controllable() {
    init_tracing();
    let mut player = Player::new(
        RecordingDevice::failing_on(&source("b")),
        PlaybackConfig::default(),
    );
    player.play(vec![episode("a", 125), episode("b", 60), episode("c", 30)], 1);

    let snapshot = player.snapshot();
    assert!(!snapshot.progress_available);
    assert_eq!(snapshot.progress_label(), "0:00");
    assert_eq!(snapshot.current_episode.unwrap().id, "b");
    assert!(player
        .drain_events()
        .iter()
        .any(|e| matches!(e, PlayerEvent::SourceUnavailable { .. })));

    // Seeking an unbound source is ignored
    player.handle_seek(20);
    assert_eq!(player.progress(), Progress::Unavailable);

    // Navigation still works and recovers
    player.play_next();
    assert_eq!(player.progress(), Progress::Available(0));
    assert_eq!(player.device().calls.last(), Some(&Call::Resume));
}

#[test]
fn retry_rebinds_current_source() {
    let mut player = player();
    player.play(vec![episode("a", 125)], 0);
    player.handle_device_event(DeviceEvent::MetadataLoaded);
    player.handle_device_event(DeviceEvent::Failed("network error".to_string()));
    assert_eq!(player.progress(), Progress::Unavailable);

    player.retry_source();

    assert_eq!(player.progress(), Progress::Available(0));
    assert_eq!(player.device().binds(), vec![source("a"), source("a")]);
    assert_eq!(player.device().calls.last(), Some(&Call::Resume));
}

#[test]
fn clear_disconnects_and_empties_snapshot() {
    let mut player = player();
    player.play(vec![episode("a", 125)], 0);
    player.toggle_shuffle();
    player.drain_events();

    player.clear();

    let snapshot = player.snapshot();
    assert!(snapshot.current_episode.is_none());
    assert!(!snapshot.is_playing && !snapshot.is_looping && !snapshot.is_shuffling);
    assert!(!snapshot.has_next && !snapshot.has_previous);
    assert_eq!(snapshot.duration_label(), "0:00");
    assert_eq!(player.device().calls.last(), Some(&Call::Disconnect));

    assert_eq!(
        player.drain_events(),
        vec![
            PlayerEvent::EpisodeChanged {
                episode_id: None,
                previous_episode_id: Some("a".to_string()),
            },
            PlayerEvent::StateChanged { is_playing: false },
            PlayerEvent::ModesChanged {
                is_looping: false,
                is_shuffling: false,
            },
        ]
    );

    // Late events from the disconnected source change nothing
    player.handle_device_event(DeviceEvent::Ended);
    player.handle_device_event(DeviceEvent::Played);
    assert!(!player.snapshot().is_playing);
}

#[test]
fn clearing_an_empty_player_reports_nothing() {
    let mut player = player();

    player.clear();
    assert!(player.drain_events().is_empty());
    assert!(player.device().calls.is_empty());

    player.toggle_loop();
    player.drain_events();
    player.clear();
    assert_eq!(
        player.drain_events(),
        vec![PlayerEvent::ModesChanged {
            is_looping: false,
            is_shuffling: false,
        }]
    );
}

#[test]
fn shuffled_endings_never_replay_the_same_episode() {
    let mut player = player();
    let queue: Vec<Episode> = (0..6).map(|i| episode(&format!("ep{}", i), 60)).collect();
    player.play(queue, 0);
    player.toggle_shuffle();

    for _ in 0..50 {
        let before = player.session().current_index();
        player.handle_device_event(DeviceEvent::Ended);
        assert_ne!(player.session().current_index(), before);
    }
}

#[test]
fn same_seed_gives_same_shuffle_order() {
    let queue: Vec<Episode> = (0..8).map(|i| episode(&format!("ep{}", i), 60)).collect();

    let order = |player: &mut Player<RecordingDevice>| {
        player.play(queue.clone(), 0);
        player.toggle_shuffle();
        (0..10)
            .map(|_| {
                player.play_next();
                player.session().current_index()
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(order(&mut player()), order(&mut player()));
}

#[test]
fn boxed_device_works_as_device() {
    init_tracing();
    let device: Box<dyn PlaybackDevice> = Box::new(RecordingDevice::default());
    let mut player = Player::new(device, PlaybackConfig::default());
    player.play_episode(episode("solo", 30));
    assert!(player.snapshot().is_playing);
}
