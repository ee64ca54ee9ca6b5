use super::*;
use std::sync::mpsc;
use std::time::Duration;

fn now_playing() -> NowPlaying {
    NowPlaying {
        title: "Night Drive".to_string(),
        artist: "The Tapes".to_string(),
        album: "Late Shift".to_string(),
        artwork: Some("http://host/art/7.jpg".to_string()),
        length: Some(Duration::from_micros(1_234_567)),
        track_number: 3,
    }
}

fn iface_with_state() -> (PlayerIface, Arc<Mutex<SharedState>>, mpsc::Receiver<MediaAction>) {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<MediaAction>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };
    (iface, state, rx)
}

#[test]
fn publish_now_playing_sets_and_clears_shared_state() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<Changed>();
    let handle = MprisHandle {
        state: state.clone(),
        notify: notify_tx,
    };

    handle.publish_now_playing(Some(&now_playing()));
    assert_eq!(state.lock().unwrap().now, Some(now_playing()));

    handle.publish_now_playing(None);
    assert!(state.lock().unwrap().now.is_none());

    let sent: Vec<Changed> = notify_rx.try_iter().collect();
    assert_eq!(sent, vec![Changed::Metadata, Changed::Metadata]);
}

#[test]
fn playback_status_maps_to_mpris_strings() {
    let (iface, state, _rx) = iface_with_state();

    assert_eq!(iface.playback_status(), "Stopped");

    state.lock().unwrap().playback = PlaybackStatus::Loaded;
    assert_eq!(iface.playback_status(), "Stopped");

    state.lock().unwrap().playback = PlaybackStatus::Playing;
    assert_eq!(iface.playback_status(), "Playing");

    state.lock().unwrap().playback = PlaybackStatus::Paused;
    assert_eq!(iface.playback_status(), "Paused");
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let (iface, state, _rx) = iface_with_state();
    state.lock().unwrap().now = Some(now_playing());

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:album",
        "mpris:artUrl",
        "mpris:length",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn metadata_is_empty_without_track() {
    let (iface, _state, _rx) = iface_with_state();
    assert!(iface.metadata().is_empty());
}

#[test]
fn metadata_omits_missing_artwork() {
    let (iface, state, _rx) = iface_with_state();
    let mut now = now_playing();
    now.artwork = None;
    state.lock().unwrap().now = Some(now);

    assert!(!iface.metadata().contains_key("mpris:artUrl"));
}

#[test]
fn unbound_actions_are_not_forwarded() {
    let (iface, state, rx) = iface_with_state();

    iface.next();
    iface.play();
    assert!(rx.try_recv().is_err());

    state.lock().unwrap().bindings = ActionBindings {
        play: true,
        pause: true,
        next: true,
        previous: false,
    };
    iface.next();
    iface.previous();
    iface.play_pause();

    let got: Vec<MediaAction> = rx.try_iter().collect();
    assert_eq!(got, vec![MediaAction::Next, MediaAction::PlayPause]);
}

#[test]
fn navigation_capabilities_follow_bindings() {
    let (iface, state, _rx) = iface_with_state();
    assert!(!iface.can_go_next());
    assert!(!iface.can_go_previous());

    state.lock().unwrap().bindings = ActionBindings {
        next: true,
        ..ActionBindings::default()
    };
    assert!(iface.can_go_next());
    assert!(!iface.can_go_previous());
}

#[test]
fn play_pause_allowed_when_either_half_is_bound() {
    let only_pause = ActionBindings {
        pause: true,
        ..ActionBindings::default()
    };
    assert!(only_pause.allows(MediaAction::PlayPause));
    assert!(!only_pause.allows(MediaAction::Play));
    assert!(!ActionBindings::default().allows(MediaAction::PlayPause));
}
