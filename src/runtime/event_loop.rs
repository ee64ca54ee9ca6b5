use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{debug, warn};

use crate::config;
use crate::session::{Session, SessionAction};

use super::keymap::{Command, InputMode, translate_key};

/// Renders the session. Called after anything changed.
pub trait Frontend {
    fn draw(&mut self, session: &Session, mode: InputMode) -> std::io::Result<()>;
}

/// State tracked by the host loop across iterations.
#[derive(Debug)]
pub struct EventLoopState {
    pub mode: InputMode,
    /// Redraw before the next poll.
    pub dirty: bool,
}

impl Default for EventLoopState {
    fn default() -> Self {
        Self {
            mode: InputMode::Browse,
            dirty: true,
        }
    }
}

/// Keeps the terminal in raw mode while alive.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> std::io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Host loop: apply queued session input, redraw, then wait for a key.
/// Returns `Ok(())` when quit is requested.
pub fn run(
    session: &mut Session,
    settings: &config::Settings,
    frontend: &mut dyn Frontend,
) -> Result<(), Box<dyn std::error::Error>> {
    let _raw = RawModeGuard::enable()?;
    let mut state = EventLoopState::default();
    let poll = Duration::from_millis(settings.controls.input_poll_ms.max(1));

    loop {
        if session.pump() {
            state.dirty = true;
        }
        if state.dirty {
            frontend.draw(session, state.mode)?;
            state.dirty = false;
        }

        if !event::poll(poll)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if handle_key_event(key, settings, session, &mut state) {
                    break;
                }
            }
            Event::Resize(..) => state.dirty = true,
            _ => {}
        }
    }

    debug!("host loop finished");
    Ok(())
}

/// Returns true when the loop should stop.
pub fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    session: &mut Session,
    state: &mut EventLoopState,
) -> bool {
    let Some(command) = translate_key(state.mode, key, settings.controls.scrub_seconds) else {
        return false;
    };
    apply_command(command, session, state)
}

/// Returns true when the loop should stop.
pub fn apply_command(command: Command, session: &mut Session, state: &mut EventLoopState) -> bool {
    state.dirty = true;
    let action = match command {
        Command::Quit => return true,
        Command::EnterQuery => {
            state.mode = InputMode::Query;
            return false;
        }
        Command::LeaveQuery => {
            state.mode = InputMode::Browse;
            return false;
        }
        Command::Submit => {
            state.mode = InputMode::Browse;
            SessionAction::SubmitQuery
        }
        Command::Dispatch(action) => action,
    };

    // Failures are kept on the session for the frontend to show.
    if let Err(e) = session.dispatch(action) {
        warn!(error = %e, "action failed");
    }
    false
}
