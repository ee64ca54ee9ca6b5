//! Download tracker: the live set of albums the backend is downloading.
//!
//! Membership is driven purely by bus events. Local optimistic logic never
//! touches it, and there is no timeout: an album whose completion event never
//! arrives stays marked.

use std::collections::HashSet;

use tracing::debug;

use crate::bus::{BackendEvent, Delivery, EventBus, EventKind, Subscription};
use crate::error::BusError;
use crate::library::AlbumId;

/// The listeners a tracker holds. Acquired together, released together.
struct Listeners {
    started: Subscription,
    completed: Subscription,
    failed: Subscription,
}

impl Listeners {
    fn acquire(bus: &EventBus) -> Result<Self, BusError> {
        // An early return drops whatever was already acquired.
        let started = bus.subscribe(EventKind::DownloadStarted)?;
        let completed = bus.subscribe(EventKind::DownloadCompleted)?;
        let failed = bus.subscribe(EventKind::DownloadFailed)?;
        Ok(Self {
            started,
            completed,
            failed,
        })
    }
}

pub struct DownloadTracker {
    downloading: HashSet<AlbumId>,
    listeners: Option<Listeners>,
}

impl DownloadTracker {
    /// Subscribe to the download events on `bus`.
    pub fn attach(bus: &EventBus) -> Result<Self, BusError> {
        let listeners = Listeners::acquire(bus)?;
        Ok(Self {
            downloading: HashSet::new(),
            listeners: Some(listeners),
        })
    }

    /// Apply every event received since the last call, in emission order.
    /// Returns the events as applied.
    pub fn pump(&mut self) -> Vec<BackendEvent> {
        let Some(listeners) = self.listeners.as_ref() else {
            return Vec::new();
        };

        let mut deliveries: Vec<Delivery> = listeners
            .started
            .try_deliveries()
            .chain(listeners.completed.try_deliveries())
            .chain(listeners.failed.try_deliveries())
            .collect();
        deliveries.sort_by_key(|d| d.seq);
        let applied: Vec<BackendEvent> = deliveries.into_iter().map(|d| d.event).collect();

        for event in &applied {
            self.apply(event);
        }
        applied
    }

    fn apply(&mut self, event: &BackendEvent) {
        match event {
            BackendEvent::DownloadStarted(id) => {
                debug!(album = %id, "download started");
                self.downloading.insert(id.clone());
            }
            BackendEvent::DownloadCompleted(id) => {
                debug!(album = %id, "download completed");
                self.downloading.remove(id);
            }
            BackendEvent::DownloadFailed { album, message } => {
                debug!(album = %album, %message, "download failed");
                self.downloading.remove(album);
            }
        }
    }

    /// True while any album is mid-download.
    pub fn is_downloading(&self) -> bool {
        !self.downloading.is_empty()
    }

    pub fn is_album_downloading(&self, id: &AlbumId) -> bool {
        self.downloading.contains(id)
    }

    pub fn downloading(&self) -> impl Iterator<Item = &AlbumId> {
        self.downloading.iter()
    }

    pub fn is_attached(&self) -> bool {
        self.listeners.is_some()
    }

    /// Release the listeners now instead of at drop. Membership is kept as
    /// last observed.
    pub fn detach(&mut self) {
        if self.listeners.take().is_some() {
            debug!("download tracker detached");
        }
    }
}
