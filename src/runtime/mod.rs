//! Host wiring: settings and logging bootstrap, session launch and the
//! terminal input loop.

use std::sync::Arc;
use std::sync::mpsc;

use tracing::{info, warn};

use crate::audio::RodioBackend;
use crate::bus::EventBus;
use crate::config::Settings;
use crate::gateway::CommandGateway;
use crate::logging;
use crate::mpris::{MediaAction, MediaSession, NoopMediaSession, spawn_mpris};
use crate::playback::PlaybackController;
use crate::resolve::FileUrlResolver;
use crate::session::Session;

mod event_loop;
mod keymap;
mod settings;

pub use event_loop::{EventLoopState, Frontend, apply_command, handle_key_event, run};
pub use keymap::{Command, InputMode, translate_key};
pub use settings::load_settings;

/// Load settings and install the log subscriber.
pub fn init() -> Settings {
    let (settings, problem) = load_settings();
    if let Err(e) = logging::init(&settings.logging) {
        eprintln!("tapedeck: logging disabled: {e}");
    }
    if let Some(problem) = problem {
        warn!("{problem}, using defaults");
    }
    settings
}

/// Open the audio output, register the media session and start a session
/// against `gateway` and `bus`.
///
/// The backend answers on [`Session::reply_sender`].
pub fn launch(
    settings: &Settings,
    gateway: Arc<dyn CommandGateway>,
    bus: &EventBus,
) -> Result<Session, Box<dyn std::error::Error>> {
    let backend = RodioBackend::open_default(&settings.audio)?;
    let resolver = FileUrlResolver::from_settings(&settings.library);

    let (media, actions): (Box<dyn MediaSession>, _) = if settings.media_session.enabled {
        let (tx, rx) = mpsc::channel::<MediaAction>();
        (Box::new(spawn_mpris(&settings.media_session, tx)), Some(rx))
    } else {
        (Box::new(NoopMediaSession), None)
    };

    let playback = PlaybackController::new(Box::new(backend), Box::new(resolver), media);
    let mut session = Session::start(settings, gateway, bus, playback)?;
    if let Some(actions) = actions {
        session.set_media_actions(actions);
    }

    info!(
        media_session = settings.media_session.enabled,
        page_size = settings.search.page_size,
        "session launched"
    );
    Ok(session)
}
