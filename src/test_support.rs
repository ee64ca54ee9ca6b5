//! Recording fakes shared by the unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::audio::{AudioBackend, AudioResource, ResourceEventKind, ResourceEvents, ResourceId};
use crate::error::{GatewayError, ResolveError, ResourceError};
use crate::gateway::{CommandGateway, GatewayCommand, RequestId, SearchRequest};
use crate::library::{Album, AlbumId, ResultItem, SearchPage, Track};
use crate::mpris::{ActionBindings, MediaSession, NowPlaying};
use crate::playback::PlaybackStatus;
use crate::resolve::UrlResolver;

pub fn album(id: &str, tracks: usize) -> Album {
    Album {
        id: AlbumId::from(id),
        name: format!("Album {id}"),
        artist: "The Tapes".to_string(),
        tracks: (1..=tracks)
            .map(|n| Track {
                name: format!("Track {n}"),
                playback_url: format!("/music/{id}/{n:02}.flac"),
            })
            .collect(),
        image_url: Some(format!("/art/{id}.jpg")),
    }
}

pub fn item(id: &str, downloaded: bool) -> ResultItem {
    ResultItem {
        id: AlbumId::from(id),
        name: format!("Album {id}"),
        album_artist: Some("The Tapes".to_string()),
        downloaded,
    }
}

pub fn page(ids: &[&str], total: usize, offset: usize) -> SearchPage {
    SearchPage {
        items: ids.iter().map(|id| item(id, false)).collect(),
        total_record_count: total,
        start_index: offset,
    }
}

/// Gateway that records what it was asked to do.
#[derive(Clone, Default)]
pub struct RecordingGateway {
    commands: Arc<Mutex<Vec<GatewayCommand>>>,
    disconnected: Arc<Mutex<bool>>,
}

impl RecordingGateway {
    pub fn commands(&self) -> Vec<GatewayCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<GatewayCommand> {
        self.commands.lock().unwrap().last().cloned()
    }

    pub fn searches(&self) -> Vec<(RequestId, SearchRequest)> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                GatewayCommand::Search { request, query } => Some((request, query)),
                _ => None,
            })
            .collect()
    }

    pub fn set_disconnected(&self, disconnected: bool) {
        *self.disconnected.lock().unwrap() = disconnected;
    }

    fn record(&self, cmd: GatewayCommand) -> Result<(), GatewayError> {
        if *self.disconnected.lock().unwrap() {
            return Err(GatewayError::Disconnected);
        }
        self.commands.lock().unwrap().push(cmd);
        Ok(())
    }
}

impl CommandGateway for RecordingGateway {
    fn search(&self, request: RequestId, query: SearchRequest) -> Result<(), GatewayError> {
        self.record(GatewayCommand::Search { request, query })
    }

    fn album_detail(&self, request: RequestId, album: &AlbumId) -> Result<(), GatewayError> {
        self.record(GatewayCommand::AlbumDetail {
            request,
            album: album.clone(),
        })
    }

    fn start_download(&self, request: RequestId, album: &AlbumId) -> Result<(), GatewayError> {
        self.record(GatewayCommand::StartDownload {
            request,
            album: album.clone(),
        })
    }

    fn delete_download(&self, request: RequestId, album: &AlbumId) -> Result<(), GatewayError> {
        self.record(GatewayCommand::DeleteDownload {
            request,
            album: album.clone(),
        })
    }
}

/// Prefixes references with `mem://`. References containing `missing` fail.
#[derive(Clone, Copy, Default)]
pub struct PrefixResolver;

impl UrlResolver for PrefixResolver {
    fn resolve(&self, reference: &str) -> Result<String, ResolveError> {
        if reference.contains("missing") {
            return Err(ResolveError::UnsupportedScheme("missing".to_string()));
        }
        Ok(format!("mem://{reference}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    Create(ResourceId, String),
    Play(ResourceId),
    Pause(ResourceId),
    Seek(ResourceId, Duration),
    Release(ResourceId),
}

#[derive(Default)]
struct FakeShared {
    calls: Vec<FakeCall>,
    live: Vec<ResourceId>,
    handles: Vec<ResourceEvents>,
}

/// Audio backend whose resources only record calls and echo the matching
/// events.
///
/// Resources report `Ready` straight away unless `manual_ready` is set.
/// A `leaky` backend does not detach on release, which lets tests emit
/// events for a replaced resource.
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub(crate) shared: Arc<Mutex<FakeShared>>,
    pub manual_ready: bool,
    pub leaky: bool,
    pub fail_create: bool,
    pub duration_secs: f64,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            duration_secs: 180.0,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.shared.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.shared.lock().unwrap().calls.clear();
    }

    /// Resources created and not yet released.
    pub fn live(&self) -> Vec<ResourceId> {
        self.shared.lock().unwrap().live.clone()
    }

    /// Event handle of the `n`th resource ever created.
    pub fn events(&self, n: usize) -> ResourceEvents {
        self.shared.lock().unwrap().handles[n].clone()
    }

    pub fn created(&self) -> usize {
        self.shared.lock().unwrap().handles.len()
    }
}

impl AudioBackend for FakeBackend {
    fn create(
        &self,
        source: &str,
        events: ResourceEvents,
    ) -> Result<Box<dyn AudioResource>, ResourceError> {
        if self.fail_create {
            return Err(ResourceError::Decode {
                path: source.to_string(),
                message: "not audio".to_string(),
            });
        }
        {
            let mut shared = self.shared.lock().unwrap();
            shared.calls.push(FakeCall::Create(events.id(), source.to_string()));
            shared.live.push(events.id());
            shared.handles.push(events.clone());
        }
        if !self.manual_ready {
            events.emit(ResourceEventKind::Ready {
                duration_secs: self.duration_secs,
            });
        }
        Ok(Box::new(FakeResource {
            shared: self.shared.clone(),
            events,
            leaky: self.leaky,
        }))
    }
}

struct FakeResource {
    shared: Arc<Mutex<FakeShared>>,
    events: ResourceEvents,
    leaky: bool,
}

impl FakeResource {
    fn log(&self, call: FakeCall) {
        self.shared.lock().unwrap().calls.push(call);
    }
}

impl AudioResource for FakeResource {
    fn play(&mut self) -> Result<(), ResourceError> {
        self.log(FakeCall::Play(self.events.id()));
        self.events.emit(ResourceEventKind::Played);
        Ok(())
    }

    fn pause(&mut self) {
        self.log(FakeCall::Pause(self.events.id()));
        self.events.emit(ResourceEventKind::Paused);
    }

    fn seek(&mut self, position: Duration) -> Result<(), ResourceError> {
        self.log(FakeCall::Seek(self.events.id(), position));
        self.events.emit(ResourceEventKind::TimeUpdate {
            position_secs: position.as_secs_f64(),
        });
        Ok(())
    }

    fn release(self: Box<Self>) {
        if !self.leaky {
            self.events.detach();
        }
        let id = self.events.id();
        let mut shared = self.shared.lock().unwrap();
        shared.calls.push(FakeCall::Release(id));
        shared.live.retain(|live| *live != id);
    }
}

#[derive(Default)]
pub struct MediaLog {
    pub now: Option<NowPlaying>,
    pub publishes: usize,
    pub bindings: ActionBindings,
    pub binds: usize,
    pub playback: PlaybackStatus,
}

/// Media session that keeps the last value of everything published.
#[derive(Clone, Default)]
pub struct RecordingMediaSession {
    log: Arc<Mutex<MediaLog>>,
}

impl RecordingMediaSession {
    pub fn now(&self) -> Option<NowPlaying> {
        self.log.lock().unwrap().now.clone()
    }

    pub fn publishes(&self) -> usize {
        self.log.lock().unwrap().publishes
    }

    pub fn bindings(&self) -> ActionBindings {
        self.log.lock().unwrap().bindings
    }

    pub fn binds(&self) -> usize {
        self.log.lock().unwrap().binds
    }

    pub fn playback(&self) -> PlaybackStatus {
        self.log.lock().unwrap().playback
    }
}

impl MediaSession for RecordingMediaSession {
    fn publish_now_playing(&self, now: Option<&NowPlaying>) {
        let mut log = self.log.lock().unwrap();
        log.now = now.cloned();
        log.publishes += 1;
    }

    fn bind_actions(&self, bindings: ActionBindings) {
        let mut log = self.log.lock().unwrap();
        log.bindings = bindings;
        log.binds += 1;
    }

    fn set_playback(&self, status: PlaybackStatus) {
        self.log.lock().unwrap().playback = status;
    }
}
