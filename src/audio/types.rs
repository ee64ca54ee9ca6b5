//! Audio resource handles, events and the backend traits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ResourceError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(u64);

impl ResourceId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEventKind {
    /// The source is decoded and can start playing.
    Ready { duration_secs: f64 },
    /// Periodic position report while playing, and after a seek.
    TimeUpdate { position_secs: f64 },
    Played,
    Paused,
    /// The source ran out.
    Ended,
    /// Loading or playback failed; the resource will not recover.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEvent {
    pub resource: ResourceId,
    pub kind: ResourceEventKind,
}

/// Event handle given to a resource when it is created.
///
/// Once [`ResourceEvents::detach`] has been called on any clone, nothing more
/// is delivered from any clone.
#[derive(Debug, Clone)]
pub struct ResourceEvents {
    id: ResourceId,
    tx: Sender<ResourceEvent>,
    detached: Arc<AtomicBool>,
}

impl ResourceEvents {
    pub fn new(id: ResourceId, tx: Sender<ResourceEvent>) -> Self {
        Self {
            id,
            tx,
            detached: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Returns false when the event was not delivered.
    pub fn emit(&self, kind: ResourceEventKind) -> bool {
        if self.is_detached() {
            return false;
        }
        self.tx
            .send(ResourceEvent {
                resource: self.id,
                kind,
            })
            .is_ok()
    }

    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

/// A loaded (or loading) track owned exclusively by the playback controller.
pub trait AudioResource {
    /// Start or resume. Success is confirmed by a `Played` event.
    fn play(&mut self) -> Result<(), ResourceError>;

    /// Pause. Confirmed by a `Paused` event.
    fn pause(&mut self);

    fn seek(&mut self, position: Duration) -> Result<(), ResourceError>;

    /// Stop, detach the event handle and free everything. No event from this
    /// resource is delivered after this returns.
    fn release(self: Box<Self>);
}

/// Creates audio resources for resolved addresses.
pub trait AudioBackend {
    fn create(
        &self,
        source: &str,
        events: ResourceEvents,
    ) -> Result<Box<dyn AudioResource>, ResourceError>;
}
