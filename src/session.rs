//! The session: search, download tracking and playback wired to one gateway
//! and one event bus.
//!
//! Everything runs on the caller's thread. Gateway replies, bus events,
//! resource events and media actions are queued on channels and applied in
//! [`Session::pump`].

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, info, warn};

use crate::bus::{BackendEvent, EventBus};
use crate::config::Settings;
use crate::downloads::DownloadTracker;
use crate::error::{GatewayError, SessionError};
use crate::gateway::{CommandGateway, GatewayReply, RequestCounter, RequestId};
use crate::library::{Album, AlbumId};
use crate::mpris::MediaAction;
use crate::playback::PlaybackController;
use crate::search::SearchSession;

/// Something the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    FocusNext,
    FocusPrevious,
    NextPage,
    PreviousPage,
    ToggleOnline,
    PushQueryChar(char),
    PopQueryChar,
    SubmitQuery,
    ActivateFocused,
    DeleteFocused,
    Download(AlbumId),
    Delete(AlbumId),
    PlayAlbum(AlbumId),
    TogglePlayPause,
    NextTrack,
    PreviousTrack,
    SeekBy(f64),
}

pub struct Session {
    gateway: Arc<dyn CommandGateway>,
    requests: RequestCounter,
    replies_tx: Sender<GatewayReply>,
    replies_rx: Receiver<GatewayReply>,
    media_actions: Option<Receiver<MediaAction>>,

    downloads: DownloadTracker,
    search: SearchSession,
    playback: PlaybackController,

    pending_album: Option<RequestId>,
    last_error: Option<GatewayError>,
}

impl Session {
    /// Subscribe to download events and build the session without issuing
    /// any command.
    pub fn new(
        settings: &Settings,
        gateway: Arc<dyn CommandGateway>,
        bus: &EventBus,
        playback: PlaybackController,
    ) -> Result<Self, SessionError> {
        let downloads = DownloadTracker::attach(bus)?;
        let requests = RequestCounter::default();
        let search = SearchSession::new(gateway.clone(), requests.clone(), &settings.search);
        let (replies_tx, replies_rx) = mpsc::channel();

        Ok(Self {
            gateway,
            requests,
            replies_tx,
            replies_rx,
            media_actions: None,
            downloads,
            search,
            playback,
            pending_album: None,
            last_error: None,
        })
    }

    /// Build the session and request the first page.
    pub fn start(
        settings: &Settings,
        gateway: Arc<dyn CommandGateway>,
        bus: &EventBus,
        playback: PlaybackController,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(settings, gateway, bus, playback)?;
        session.search.execute_search(0)?;
        info!(online = session.search.is_online(), "session started");
        Ok(session)
    }

    /// Where the backend delivers replies to this session's commands.
    pub fn reply_sender(&self) -> Sender<GatewayReply> {
        self.replies_tx.clone()
    }

    /// Route platform media actions into the playback controller.
    pub fn set_media_actions(&mut self, actions: Receiver<MediaAction>) {
        self.media_actions = Some(actions);
    }

    /// Apply everything queued since the last call. Returns true when
    /// anything was applied.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;

        while let Ok(reply) = self.replies_rx.try_recv() {
            self.handle_reply(reply);
            changed = true;
        }

        for event in self.downloads.pump() {
            self.handle_backend_event(&event);
            changed = true;
        }

        if let Some(actions) = self.media_actions.as_ref() {
            let pending: Vec<MediaAction> = actions.try_iter().collect();
            for action in pending {
                debug!(?action, "media action");
                self.playback.handle_media_action(action);
                changed = true;
            }
        }

        if self.playback.pump() > 0 {
            changed = true;
        }
        changed
    }

    pub fn dispatch(&mut self, action: SessionAction) -> Result<(), SessionError> {
        match action {
            SessionAction::FocusNext => self.search.focus_next(),
            SessionAction::FocusPrevious => self.search.focus_previous(),
            SessionAction::NextPage => self.search.next_page()?,
            SessionAction::PreviousPage => self.search.previous_page()?,
            SessionAction::ToggleOnline => self.toggle_online()?,
            SessionAction::PushQueryChar(c) => self.search.push_query_char(c),
            SessionAction::PopQueryChar => self.search.pop_query_char(),
            SessionAction::SubmitQuery => self.search.submit()?,
            SessionAction::ActivateFocused => self.activate_focused()?,
            SessionAction::DeleteFocused => self.delete_focused()?,
            SessionAction::Download(id) => self.download(id)?,
            SessionAction::Delete(id) => self.delete(id)?,
            SessionAction::PlayAlbum(id) => self.play_album(id)?,
            SessionAction::TogglePlayPause => self.playback.toggle_play_pause(),
            SessionAction::NextTrack => self.playback.next_track(),
            SessionAction::PreviousTrack => self.playback.previous_track(),
            SessionAction::SeekBy(delta) => self.playback.seek_by(delta),
        }
        Ok(())
    }

    /// Start downloading `id` and mark its row downloaded right away.
    pub fn download(&mut self, id: AlbumId) -> Result<(), SessionError> {
        let request = self.requests.next_id();
        self.gateway.start_download(request, &id)?;
        info!(album = %id, %request, "download requested");
        self.search.set_downloaded(&id, true, false);
        self.focus_if_listed(id);
        Ok(())
    }

    /// Delete the local copy of `id`.
    ///
    /// Online the row stays with its flag cleared; offline the row goes away.
    pub fn delete(&mut self, id: AlbumId) -> Result<(), SessionError> {
        let request = self.requests.next_id();
        self.gateway.delete_download(request, &id)?;
        info!(album = %id, %request, "delete requested");
        if self.search.is_online() {
            self.search.set_downloaded(&id, false, false);
            self.focus_if_listed(id);
        } else {
            self.search.set_downloaded(&id, false, true);
            self.search.set_focused_album_id(None);
        }
        Ok(())
    }

    /// Fetch `id` and load it once the detail arrives.
    pub fn play_album(&mut self, id: AlbumId) -> Result<(), SessionError> {
        let request = self.requests.next_id();
        self.gateway.album_detail(request, &id)?;
        debug!(album = %id, %request, "album detail requested");
        self.pending_album = Some(request);
        Ok(())
    }

    /// Online: download or delete the focused row. Offline: play it.
    pub fn activate_focused(&mut self) -> Result<(), SessionError> {
        let Some(item) = self.search.focused_item() else {
            return Ok(());
        };
        let (id, downloaded) = (item.id.clone(), item.downloaded);

        if !self.search.is_online() {
            return self.play_album(id);
        }
        if downloaded {
            self.delete(id)
        } else {
            self.download(id)
        }
    }

    pub fn delete_focused(&mut self) -> Result<(), SessionError> {
        match self.search.focused_id().cloned() {
            Some(id) => self.delete(id),
            None => Ok(()),
        }
    }

    pub fn set_online(&mut self, online: bool) -> Result<(), SessionError> {
        Ok(self.search.set_online(online)?)
    }

    pub fn toggle_online(&mut self) -> Result<(), SessionError> {
        Ok(self.search.toggle_online()?)
    }

    fn handle_reply(&mut self, reply: GatewayReply) {
        match reply {
            GatewayReply::Search { request, result } => {
                self.search.apply_reply(request, result);
            }
            GatewayReply::AlbumDetail { request, result } => {
                self.apply_album_detail(request, result);
            }
            GatewayReply::DownloadStarted {
                request,
                album,
                result,
            } => {
                if let Err(e) = result {
                    warn!(album = %album, %request, error = %e, "download was not started");
                    self.revert_download(&album);
                    self.last_error = Some(e);
                }
            }
            GatewayReply::DownloadDeleted {
                request,
                album,
                result,
            } => {
                if let Err(e) = result {
                    warn!(album = %album, %request, error = %e, "delete failed");
                    self.last_error = Some(e);
                }
            }
        }
    }

    fn apply_album_detail(&mut self, request: RequestId, result: Result<Album, GatewayError>) {
        if self.pending_album != Some(request) {
            debug!(%request, "dropping stale album detail");
            return;
        }
        self.pending_album = None;

        match result {
            Ok(album) => self.playback.load_album(album),
            Err(e) => {
                warn!(%request, error = %e, "album detail failed");
                self.last_error = Some(e);
            }
        }
    }

    fn handle_backend_event(&mut self, event: &BackendEvent) {
        if let BackendEvent::DownloadFailed { album, message } = event {
            warn!(album = %album, %message, "download failed");
            self.revert_download(album);
        }
    }

    /// Focus `id` when its row is on the current page.
    fn focus_if_listed(&mut self, id: AlbumId) {
        if self.search.item(&id).is_some() {
            self.search.set_focused_album_id(Some(id));
        }
    }

    fn revert_download(&mut self, album: &AlbumId) {
        if self.search.is_online() {
            self.search.set_downloaded(album, false, false);
        }
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn downloads(&self) -> &DownloadTracker {
        &self.downloads
    }

    /// Whether the row for `id` should show as downloading.
    pub fn is_album_downloading(&self, id: &AlbumId) -> bool {
        self.downloads.is_album_downloading(id)
    }

    /// Whether an album detail request is outstanding.
    pub fn is_loading_album(&self) -> bool {
        self.pending_album.is_some()
    }

    /// Last failed command, falling back to the last failed search.
    pub fn last_error(&self) -> Option<&GatewayError> {
        self.last_error.as_ref().or(self.search.last_error())
    }
}
