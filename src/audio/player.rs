use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::debug;

use crate::config::AudioSettings;
use crate::error::{ResolveError, ResourceError};
use crate::resolve::{file_url_to_path, scheme_of};

use super::thread::spawn_resource_worker;
use super::types::{AudioBackend, AudioResource, ResourceEventKind, ResourceEvents};

/// Plays local files through the default output device.
pub struct RodioBackend {
    stream: OutputStream,
    poll_interval: Duration,
}

impl RodioBackend {
    pub fn open_default(settings: &AudioSettings) -> Result<Self, ResourceError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| ResourceError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy next to a terminal renderer.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            poll_interval: Duration::from_millis(settings.poll_interval_ms.max(1)),
        })
    }
}

/// Local path for `source`: a `file://` URL or a bare path.
pub(super) fn local_path(source: &str) -> Result<PathBuf, ResolveError> {
    let source = source.trim();
    if source.is_empty() {
        return Err(ResolveError::Empty);
    }
    match scheme_of(source)? {
        None => Ok(PathBuf::from(source)),
        Some(scheme) if scheme == "file" => {
            file_url_to_path(source).ok_or_else(|| ResolveError::Malformed {
                reference: source.to_string(),
                reason: "not a local file".to_string(),
            })
        }
        Some(scheme) => Err(ResolveError::UnsupportedScheme(scheme)),
    }
}

impl AudioBackend for RodioBackend {
    fn create(
        &self,
        source: &str,
        events: ResourceEvents,
    ) -> Result<Box<dyn AudioResource>, ResourceError> {
        let path = local_path(source)?;

        let sink = Arc::new(Sink::connect_new(self.stream.mixer()));
        sink.pause();

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let appended = Arc::new(AtomicBool::new(false));
        let worker = spawn_resource_worker(
            path,
            sink.clone(),
            appended.clone(),
            events.clone(),
            stop_rx,
            self.poll_interval,
        );
        debug!(resource = ?events.id(), source, "audio resource created");

        Ok(Box::new(RodioResource {
            sink,
            appended,
            events,
            stop: Some(stop_tx),
            worker: Some(worker),
        }))
    }
}

struct RodioResource {
    sink: Arc<Sink>,
    /// Set by the worker once the decoded source is in the sink.
    appended: Arc<AtomicBool>,
    events: ResourceEvents,
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl RodioResource {
    fn shutdown(&mut self) {
        self.events.detach();
        self.sink.stop();
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl AudioResource for RodioResource {
    fn play(&mut self) -> Result<(), ResourceError> {
        self.sink.play();
        // Before the source is appended the worker reports `Played` itself.
        if self.appended.load(Ordering::SeqCst) {
            self.events.emit(ResourceEventKind::Played);
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
        self.events.emit(ResourceEventKind::Paused);
    }

    fn seek(&mut self, position: Duration) -> Result<(), ResourceError> {
        self.sink
            .try_seek(position)
            .map_err(|e| ResourceError::Seek(e.to_string()))?;
        self.events.emit(ResourceEventKind::TimeUpdate {
            position_secs: position.as_secs_f64(),
        });
        Ok(())
    }

    fn release(mut self: Box<Self>) {
        self.shutdown();
        debug!(resource = ?self.events.id(), "audio resource released");
    }
}

impl Drop for RodioResource {
    fn drop(&mut self) {
        self.shutdown();
    }
}

