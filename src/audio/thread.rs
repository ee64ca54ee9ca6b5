use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::Sink;
use tracing::{debug, warn};

use super::sink::open_source;
use super::types::{ResourceEventKind, ResourceEvents};

/// Spawn the worker behind one rodio resource.
///
/// The worker decodes the file into `sink`, raises `appended`, reports
/// `Ready` (and `Played` if playback was requested meanwhile), then polls the
/// sink every `poll` to report position and detect the end of the track. It
/// exits on a stop signal, when the stop sender is dropped, or after `Ended`.
pub(super) fn spawn_resource_worker(
    path: PathBuf,
    sink: Arc<Sink>,
    appended: Arc<AtomicBool>,
    events: ResourceEvents,
    stop: Receiver<()>,
    poll: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let (source, duration) = match open_source(&path) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load track");
                events.emit(ResourceEventKind::Failed(e.to_string()));
                return;
            }
        };

        sink.append(source);
        appended.store(true, Ordering::SeqCst);
        events.emit(ResourceEventKind::Ready {
            duration_secs: duration.map_or(0.0, |d| d.as_secs_f64()),
        });
        if !sink.is_paused() {
            events.emit(ResourceEventKind::Played);
        }
        debug!(path = %path.display(), ?duration, "track ready");

        loop {
            match stop.recv_timeout(poll) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    if sink.empty() {
                        events.emit(ResourceEventKind::Ended);
                        break;
                    }
                    if !sink.is_paused() {
                        events.emit(ResourceEventKind::TimeUpdate {
                            position_secs: sink.get_pos().as_secs_f64(),
                        });
                    }
                }
            }
        }
    })
}
