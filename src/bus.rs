//! In-process event bus for backend push notifications.
//!
//! Delivery is in emission order per subscription. Every emission carries a
//! bus-wide sequence number so a consumer holding several subscriptions can
//! restore the global order.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, Weak};

use tracing::trace;

use crate::error::BusError;
use crate::library::AlbumId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    DownloadStarted,
    DownloadCompleted,
    DownloadFailed,
}

impl EventKind {
    /// Wire name of the event.
    pub fn name(self) -> &'static str {
        match self {
            Self::DownloadStarted => "album-download-started",
            Self::DownloadCompleted => "album-download-completed",
            Self::DownloadFailed => "album-download-failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    DownloadStarted(AlbumId),
    DownloadCompleted(AlbumId),
    DownloadFailed { album: AlbumId, message: String },
}

impl BackendEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DownloadStarted(_) => EventKind::DownloadStarted,
            Self::DownloadCompleted(_) => EventKind::DownloadCompleted,
            Self::DownloadFailed { .. } => EventKind::DownloadFailed,
        }
    }

    pub fn album(&self) -> &AlbumId {
        match self {
            Self::DownloadStarted(id) | Self::DownloadCompleted(id) => id,
            Self::DownloadFailed { album, .. } => album,
        }
    }
}

/// An event as delivered to a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Position of the emission on the bus, starting at 1.
    pub seq: u64,
    pub event: BackendEvent,
}

struct Listener {
    kind: EventKind,
    tx: Sender<Delivery>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    emitted: u64,
    listeners: HashMap<u64, Listener>,
    closed: bool,
}

/// Cloneable handle to a shared listener registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `kind`. The listener lives as long as the
    /// returned [`Subscription`].
    pub fn subscribe(&self, kind: EventKind) -> Result<Subscription, BusError> {
        let (tx, rx) = mpsc::channel();
        let mut reg = self.registry.lock().map_err(|_| BusError::Closed)?;
        if reg.closed {
            return Err(BusError::Closed);
        }
        reg.next_id += 1;
        let id = reg.next_id;
        reg.listeners.insert(id, Listener { kind, tx });
        trace!(event = kind.name(), id, "listener registered");

        Ok(Subscription {
            id,
            kind,
            rx,
            registry: Arc::downgrade(&self.registry),
        })
    }

    /// Deliver `event` to every listener of its kind. Returns how many
    /// listeners received it.
    pub fn emit(&self, event: BackendEvent) -> usize {
        let Ok(mut reg) = self.registry.lock() else {
            return 0;
        };
        reg.emitted += 1;
        let seq = reg.emitted;
        let kind = event.kind();
        let mut delivered = 0;
        let mut dead = Vec::new();
        for (id, listener) in reg.listeners.iter().filter(|(_, l)| l.kind == kind) {
            let delivery = Delivery {
                seq,
                event: event.clone(),
            };
            if listener.tx.send(delivery).is_ok() {
                delivered += 1;
            } else {
                dead.push(*id);
            }
        }
        for id in dead {
            reg.listeners.remove(&id);
        }
        delivered
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.registry
            .lock()
            .map(|reg| reg.listeners.values().filter(|l| l.kind == kind).count())
            .unwrap_or(0)
    }

    /// Refuse new subscriptions and drop every listener.
    pub fn close(&self) {
        if let Ok(mut reg) = self.registry.lock() {
            reg.closed = true;
            reg.listeners.clear();
        }
    }
}

/// A live listener. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    kind: EventKind,
    rx: Receiver<Delivery>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Drain everything delivered so far without blocking.
    pub fn try_iter(&self) -> impl Iterator<Item = BackendEvent> + '_ {
        self.rx.try_iter().map(|d| d.event)
    }

    /// Like [`Subscription::try_iter`], keeping the bus sequence numbers.
    pub fn try_deliveries(&self) -> impl Iterator<Item = Delivery> + '_ {
        self.rx.try_iter()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut reg) = registry.lock() {
                reg.listeners.remove(&self.id);
                trace!(event = self.kind.name(), id = self.id, "listener released");
            }
        }
    }
}
