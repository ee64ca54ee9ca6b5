//! Command and reply values exchanged with the backend.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::GatewayError;
use crate::library::{Album, AlbumId, SearchPage};

/// Monotonic tag attached to every command a session issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out increasing request ids. Clones share one sequence.
#[derive(Debug, Clone, Default)]
pub struct RequestCounter {
    last: Arc<AtomicU64>,
}

impl RequestCounter {
    pub fn next_id(&self) -> RequestId {
        RequestId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn last(&self) -> Option<RequestId> {
        let last = self.last.load(Ordering::SeqCst);
        (last > 0).then_some(RequestId(last))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
    pub offset: usize,
    /// Online queries the remote catalog; offline queries the local library.
    pub online: bool,
}

/// A command as seen by the backend side of a [`super::ChannelGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCommand {
    Search {
        request: RequestId,
        query: SearchRequest,
    },
    AlbumDetail {
        request: RequestId,
        album: AlbumId,
    },
    StartDownload {
        request: RequestId,
        album: AlbumId,
    },
    DeleteDownload {
        request: RequestId,
        album: AlbumId,
    },
}

impl GatewayCommand {
    pub fn request(&self) -> RequestId {
        match self {
            Self::Search { request, .. }
            | Self::AlbumDetail { request, .. }
            | Self::StartDownload { request, .. }
            | Self::DeleteDownload { request, .. } => *request,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::AlbumDetail { .. } => "getAlbumDetail",
            Self::StartDownload { .. } => "startDownload",
            Self::DeleteDownload { .. } => "deleteDownload",
        }
    }
}

/// Outcome of a command, delivered asynchronously.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayReply {
    Search {
        request: RequestId,
        result: Result<SearchPage, GatewayError>,
    },
    AlbumDetail {
        request: RequestId,
        result: Result<Album, GatewayError>,
    },
    DownloadStarted {
        request: RequestId,
        album: AlbumId,
        result: Result<(), GatewayError>,
    },
    DownloadDeleted {
        request: RequestId,
        album: AlbumId,
        result: Result<(), GatewayError>,
    },
}

impl GatewayReply {
    pub fn request(&self) -> RequestId {
        match self {
            Self::Search { request, .. }
            | Self::AlbumDetail { request, .. }
            | Self::DownloadStarted { request, .. }
            | Self::DownloadDeleted { request, .. } => *request,
        }
    }
}
