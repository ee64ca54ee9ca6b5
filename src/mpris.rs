//! Platform media-session surface.
//!
//! The playback controller publishes now-playing data and the set of actions
//! it currently accepts through [`MediaSession`]. Actions triggered from the
//! platform (media keys, desktop widgets) come back as [`MediaAction`]s on a
//! channel and are dispatched to whatever track is current at that moment.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{debug, warn};
use zbus::object_server::InterfaceRef;
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::config::MediaSessionSettings;
use crate::playback::PlaybackStatus;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaAction {
    Play,
    Pause,
    PlayPause,
    Next,
    Previous,
}

/// Metadata for the track that is loaded right now.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Resolved artwork address.
    pub artwork: Option<String>,
    pub length: Option<Duration>,
    /// One-based position within the album.
    pub track_number: usize,
}

/// Which platform actions are routed to the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionBindings {
    pub play: bool,
    pub pause: bool,
    pub next: bool,
    pub previous: bool,
}

impl ActionBindings {
    pub fn allows(&self, action: MediaAction) -> bool {
        match action {
            MediaAction::Play => self.play,
            MediaAction::Pause => self.pause,
            MediaAction::PlayPause => self.play || self.pause,
            MediaAction::Next => self.next,
            MediaAction::Previous => self.previous,
        }
    }
}

pub trait MediaSession {
    /// Replace the published metadata; `None` clears it.
    fn publish_now_playing(&self, now: Option<&NowPlaying>);

    /// Replace the routed action set.
    fn bind_actions(&self, bindings: ActionBindings);

    fn set_playback(&self, status: PlaybackStatus);
}

/// Media session for hosts without a platform surface.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMediaSession;

impl MediaSession for NoopMediaSession {
    fn publish_now_playing(&self, _now: Option<&NowPlaying>) {}

    fn bind_actions(&self, _bindings: ActionBindings) {}

    fn set_playback(&self, _status: PlaybackStatus) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Changed {
    Metadata,
    Playback,
    Controls,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackStatus,
    now: Option<NowPlaying>,
    bindings: ActionBindings,
}

/// Handle to the MPRIS service thread.
pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<Changed>,
}

impl MediaSession for MprisHandle {
    fn publish_now_playing(&self, now: Option<&NowPlaying>) {
        if let Ok(mut s) = self.state.lock() {
            s.now = now.cloned();
        }
        let _ = self.notify.send(Changed::Metadata);
    }

    fn bind_actions(&self, bindings: ActionBindings) {
        if let Ok(mut s) = self.state.lock() {
            s.bindings = bindings;
        }
        let _ = self.notify.send(Changed::Controls);
    }

    fn set_playback(&self, status: PlaybackStatus) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = status;
        }
        let _ = self.notify.send(Changed::Playback);
    }
}

struct RootIface {
    identity: String,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {}

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> String {
        self.identity.clone()
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<MediaAction>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn bindings(&self) -> ActionBindings {
        self.state.lock().map(|s| s.bindings).unwrap_or_default()
    }

    /// Forward `action` only while it is bound.
    fn forward(&self, action: MediaAction) {
        if self.bindings().allows(action) {
            let _ = self.tx.send(action);
        } else {
            debug!(?action, "ignoring unbound media action");
        }
    }
}

fn owned(value: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(value).ok()
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        self.forward(MediaAction::Next);
    }

    fn previous(&self) {
        self.forward(MediaAction::Previous);
    }

    fn play(&self) {
        self.forward(MediaAction::Play);
    }

    fn pause(&self) {
        self.forward(MediaAction::Pause);
    }

    fn play_pause(&self) {
        self.forward(MediaAction::PlayPause);
    }

    fn stop(&self) {
        self.forward(MediaAction::Pause);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackStatus::Empty | PlaybackStatus::Loaded => "Stopped",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        self.bindings().play
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        self.bindings().pause
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        self.bindings().next
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        self.bindings().previous
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Some(now) = self.state.lock().ok().and_then(|s| s.now.clone()) else {
            return map;
        };

        let track_id = format!("{OBJECT_PATH}/track/{}", now.track_number);
        if let Some(v) = ObjectPath::try_from(track_id)
            .ok()
            .and_then(|p| owned(Value::from(p)))
        {
            map.insert("mpris:trackid".to_string(), v);
        }
        if let Some(v) = owned(Value::from(now.title)) {
            map.insert("xesam:title".to_string(), v);
        }
        if let Some(v) = owned(Value::from(vec![now.artist])) {
            map.insert("xesam:artist".to_string(), v);
        }
        if let Some(v) = owned(Value::from(now.album)) {
            map.insert("xesam:album".to_string(), v);
        }
        if let Some(art) = now.artwork {
            if let Some(v) = owned(Value::from(art)) {
                map.insert("mpris:artUrl".to_string(), v);
            }
        }
        if let Some(len) = now.length {
            let micros = i64::try_from(len.as_micros()).unwrap_or(i64::MAX);
            if let Some(v) = owned(Value::from(micros)) {
                map.insert("mpris:length".to_string(), v);
            }
        }
        map
    }
}

async fn emit_changes(iface: &InterfaceRef<PlayerIface>, changes: &[Changed]) -> zbus::Result<()> {
    let emitter = iface.signal_emitter();
    let player = iface.get().await;
    for change in changes {
        match change {
            Changed::Metadata => player.metadata_changed(emitter).await?,
            Changed::Playback => player.playback_status_changed(emitter).await?,
            Changed::Controls => {
                player.can_go_next_changed(emitter).await?;
                player.can_go_previous_changed(emitter).await?;
                player.can_play_changed(emitter).await?;
                player.can_pause_changed(emitter).await?;
            }
        }
    }
    Ok(())
}

async fn serve(
    settings: MediaSessionSettings,
    tx: Sender<MediaAction>,
    state: Arc<Mutex<SharedState>>,
    notify: Receiver<Changed>,
) -> zbus::Result<()> {
    let connection = Connection::session().await?;
    connection.request_name(settings.bus_name.as_str()).await?;

    let object_server = connection.object_server();
    object_server
        .at(
            OBJECT_PATH,
            RootIface {
                identity: settings.identity.clone(),
            },
        )
        .await?;
    object_server
        .at(OBJECT_PATH, PlayerIface { tx, state })
        .await?;
    let iface = object_server
        .interface::<_, PlayerIface>(OBJECT_PATH)
        .await?;

    loop {
        Timer::after(Duration::from_millis(100)).await;
        let mut changes: Vec<Changed> = Vec::new();
        loop {
            match notify.try_recv() {
                Ok(c) => {
                    if !changes.contains(&c) {
                        changes.push(c);
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                // Session gone: stop serving.
                Err(mpsc::TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if !changes.is_empty() {
            emit_changes(&iface, &changes).await?;
        }
    }
}

/// Register the MPRIS service on a background thread.
///
/// Failures to reach the session bus are logged; the returned handle keeps
/// accepting updates either way.
pub fn spawn_mpris(settings: &MediaSessionSettings, tx: Sender<MediaAction>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<Changed>();

    let state_for_thread = state.clone();
    let settings = settings.clone();
    std::thread::spawn(move || {
        if let Err(e) = block_on(serve(settings, tx, state_for_thread, notify_rx)) {
            warn!(error = %e, "MPRIS service stopped");
        }
    });

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

#[cfg(test)]
mod tests;
