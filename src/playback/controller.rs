use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audio::{AudioBackend, AudioResource, ResourceEvent, ResourceEventKind, ResourceEvents, ResourceId};
use crate::library::{Album, Track};
use crate::mpris::{ActionBindings, MediaAction, MediaSession, NowPlaying};
use crate::resolve::UrlResolver;

use super::state::{PlaybackState, PlaybackStatus};

struct Attached {
    id: ResourceId,
    handle: Box<dyn AudioResource>,
}

/// Owns the loaded album and the one audio resource playing from it.
///
/// Resource callbacks arrive as [`ResourceEvent`]s and are applied in
/// [`PlaybackController::pump`]. Events from a resource that has since been
/// replaced are dropped by id.
pub struct PlaybackController {
    backend: Box<dyn AudioBackend>,
    resolver: Box<dyn UrlResolver>,
    media: Box<dyn MediaSession>,

    events_tx: Sender<ResourceEvent>,
    events_rx: Receiver<ResourceEvent>,
    next_resource: u64,

    album: Option<Album>,
    track_index: Option<usize>,
    resource: Option<Attached>,

    auto_play: bool,
    is_playing: bool,
    started: bool,
    ended: bool,
    current_time: f64,
    duration: f64,
    stall: Option<String>,
}

impl PlaybackController {
    pub fn new(
        backend: Box<dyn AudioBackend>,
        resolver: Box<dyn UrlResolver>,
        media: Box<dyn MediaSession>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            backend,
            resolver,
            media,
            events_tx,
            events_rx,
            next_resource: 0,
            album: None,
            track_index: None,
            resource: None,
            auto_play: false,
            is_playing: false,
            started: false,
            ended: false,
            current_time: 0.0,
            duration: 0.0,
            stall: None,
        }
    }

    /// Replace the loaded album and start it from the first track.
    ///
    /// The previous resource is released before anything new is created.
    /// Playback begins once the new resource reports ready.
    pub fn load_album(&mut self, album: Album) {
        self.teardown();
        self.stall = None;
        self.ended = false;

        info!(album = %album.id, tracks = album.tracks.len(), "loading album");
        self.track_index = album.has_tracks().then_some(0);
        self.album = Some(album);

        if self.track_index.is_some() {
            self.auto_play = true;
            self.attach_current();
        } else {
            self.auto_play = false;
            self.publish_cleared();
        }
    }

    /// Release the resource and forget the album.
    pub fn unload(&mut self) {
        self.teardown();
        self.album = None;
        self.track_index = None;
        self.auto_play = false;
        self.ended = false;
        self.stall = None;
        self.publish_cleared();
    }

    pub fn toggle_play_pause(&mut self) {
        if self.ended {
            // Replay the final track from the start.
            self.ended = false;
            self.auto_play = true;
            self.teardown();
            self.attach_current();
            return;
        }

        let Some(attached) = self.resource.as_mut() else {
            return;
        };

        if self.is_playing {
            self.auto_play = false;
            attached.handle.pause();
        } else {
            self.auto_play = true;
            if let Err(e) = attached.handle.play() {
                self.stalled(e.to_string());
            }
        }
    }

    /// Jump to `position_secs`, clamped to the known duration.
    pub fn seek(&mut self, position_secs: f64) {
        let Some(attached) = self.resource.as_mut() else {
            return;
        };

        let mut target = position_secs.max(0.0);
        if self.duration > 0.0 {
            target = target.min(self.duration);
        }
        let Ok(position) = Duration::try_from_secs_f64(target) else {
            warn!(position = position_secs, "seek target out of range");
            return;
        };

        match attached.handle.seek(position) {
            Ok(()) => self.current_time = target,
            Err(e) => warn!(error = %e, position = target, "seek failed"),
        }
    }

    /// Seek relative to the current position.
    pub fn seek_by(&mut self, delta_secs: f64) {
        self.seek(self.current_time + delta_secs);
    }

    pub fn next_track(&mut self) {
        if let Some(index) = self.track_index.filter(|_| self.has_next_track()) {
            self.change_track(index + 1);
        }
    }

    pub fn previous_track(&mut self) {
        if let Some(index) = self.track_index.filter(|_| self.has_previous_track()) {
            self.change_track(index - 1);
        }
    }

    pub fn has_next_track(&self) -> bool {
        match (self.track_index, &self.album) {
            (Some(index), Some(album)) => index + 1 < album.tracks.len(),
            _ => false,
        }
    }

    pub fn has_previous_track(&self) -> bool {
        self.track_index.is_some_and(|index| index > 0)
    }

    /// Apply every pending resource event. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            if self.apply_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Run a platform media action against the current track.
    pub fn handle_media_action(&mut self, action: MediaAction) {
        if !self.bindings().allows(action) {
            debug!(?action, "media action not bound");
            return;
        }
        match action {
            MediaAction::Play if !self.is_playing => self.toggle_play_pause(),
            MediaAction::Pause if self.is_playing => self.toggle_play_pause(),
            MediaAction::Play | MediaAction::Pause => {}
            MediaAction::PlayPause => self.toggle_play_pause(),
            MediaAction::Next => self.next_track(),
            MediaAction::Previous => self.previous_track(),
        }
    }

    pub fn album(&self) -> Option<&Album> {
        self.album.as_ref()
    }

    pub fn track_index(&self) -> Option<usize> {
        self.track_index
    }

    pub fn current_track(&self) -> Option<&Track> {
        let index = self.track_index?;
        self.album.as_ref()?.track(index)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn auto_play_intent(&self) -> bool {
        self.auto_play
    }

    pub fn current_time_secs(&self) -> f64 {
        self.current_time
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration
    }

    /// Why the current track is not playing, if it failed.
    pub fn stall_reason(&self) -> Option<&str> {
        self.stall.as_deref()
    }

    pub fn has_resource(&self) -> bool {
        self.resource.is_some()
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.track_index.is_none() {
            PlaybackStatus::Empty
        } else if self.is_playing {
            PlaybackStatus::Playing
        } else if self.started || self.ended {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Loaded
        }
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            album: self.album.as_ref().map(|a| a.id.clone()),
            track_index: self.track_index,
            is_playing: self.is_playing,
            current_time_secs: self.current_time,
            duration_secs: self.duration,
            status: self.status(),
        }
    }

    fn apply_event(&mut self, event: ResourceEvent) -> bool {
        let Some(attached) = self.resource.as_mut() else {
            debug!(resource = ?event.resource, "dropping event with no resource attached");
            return false;
        };
        if attached.id != event.resource {
            debug!(resource = ?event.resource, current = ?attached.id, "dropping stale resource event");
            return false;
        }

        match event.kind {
            ResourceEventKind::Ready { duration_secs } => {
                self.duration = duration_secs;
                if self.auto_play {
                    if let Err(e) = attached.handle.play() {
                        self.stalled(e.to_string());
                        return true;
                    }
                }
                self.publish_now_playing();
            }
            ResourceEventKind::TimeUpdate { position_secs } => {
                self.current_time = position_secs;
            }
            ResourceEventKind::Played => {
                self.is_playing = true;
                self.started = true;
                self.media.set_playback(self.status());
            }
            ResourceEventKind::Paused => {
                self.is_playing = false;
                self.media.set_playback(self.status());
            }
            ResourceEventKind::Ended => self.track_ended(),
            ResourceEventKind::Failed(message) => self.stalled(message),
        }
        true
    }

    fn track_ended(&mut self) {
        match self.track_index {
            Some(index) if self.has_next_track() => {
                self.auto_play = true;
                self.change_track(index + 1);
            }
            _ => {
                debug!("end of album");
                self.is_playing = false;
                self.ended = true;
                self.media.set_playback(self.status());
            }
        }
    }

    fn change_track(&mut self, index: usize) {
        self.teardown();
        self.stall = None;
        self.ended = false;
        self.track_index = Some(index);
        self.attach_current();
    }

    /// Create the resource for the current track and announce it.
    fn attach_current(&mut self) {
        let Some(track) = self.current_track() else {
            return;
        };
        let reference = track.playback_url.clone();

        self.publish_now_playing();
        self.media.set_playback(self.status());

        let source = match self.resolver.resolve(&reference) {
            Ok(source) => source,
            Err(e) => {
                self.stalled(e.to_string());
                return;
            }
        };

        self.next_resource += 1;
        let id = ResourceId::new(self.next_resource);
        let events = ResourceEvents::new(id, self.events_tx.clone());
        match self.backend.create(&source, events) {
            Ok(handle) => {
                debug!(resource = ?id, source, "resource attached");
                self.resource = Some(Attached { id, handle });
            }
            Err(e) => self.stalled(e.to_string()),
        }
    }

    /// Release the current resource. Returns once nothing more can be
    /// delivered from it.
    fn teardown(&mut self) {
        if let Some(attached) = self.resource.take() {
            debug!(resource = ?attached.id, "releasing resource");
            attached.handle.release();
        }
        self.is_playing = false;
        self.started = false;
        self.current_time = 0.0;
        self.duration = 0.0;
    }

    fn stalled(&mut self, reason: String) {
        warn!(reason, track = ?self.track_index, "playback stalled");
        self.teardown();
        self.stall = Some(reason);
        self.media.set_playback(self.status());
    }

    fn bindings(&self) -> ActionBindings {
        let loaded = self.track_index.is_some();
        ActionBindings {
            play: loaded,
            pause: loaded,
            next: self.has_next_track(),
            previous: self.has_previous_track(),
        }
    }

    fn now_playing(&self) -> Option<NowPlaying> {
        let album = self.album.as_ref()?;
        let index = self.track_index?;
        let track = album.track(index)?;
        let artwork = album
            .image_url
            .as_deref()
            .and_then(|art| match self.resolver.resolve(art) {
                Ok(url) => Some(url),
                Err(e) => {
                    debug!(error = %e, "artwork not resolvable");
                    None
                }
            });
        Some(NowPlaying {
            title: track.name.clone(),
            artist: album.artist.clone(),
            album: album.name.clone(),
            artwork,
            length: (self.duration > 0.0).then(|| Duration::from_secs_f64(self.duration)),
            track_number: index + 1,
        })
    }

    fn publish_now_playing(&self) {
        self.media.publish_now_playing(self.now_playing().as_ref());
        self.media.bind_actions(self.bindings());
    }

    fn publish_cleared(&self) {
        self.media.publish_now_playing(None);
        self.media.bind_actions(ActionBindings::default());
        self.media.set_playback(PlaybackStatus::Empty);
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.teardown();
    }
}
