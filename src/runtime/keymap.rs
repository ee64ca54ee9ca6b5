use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::SessionAction;

/// Which keymap applies.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Browse,
    /// Keys edit the search query.
    Query,
}

/// What a key press asks the host loop to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(SessionAction),
    EnterQuery,
    LeaveQuery,
    /// Run the edited query and return to browsing.
    Submit,
    Quit,
}

/// Map a key press to a command. `scrub_seconds` is the `H`/`L` step.
pub fn translate_key(mode: InputMode, key: KeyEvent, scrub_seconds: u64) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('o') {
        return Some(Command::Dispatch(SessionAction::ToggleOnline));
    }

    match mode {
        InputMode::Query => match key.code {
            KeyCode::Esc => Some(Command::LeaveQuery),
            KeyCode::Enter => Some(Command::Submit),
            KeyCode::Backspace => Some(Command::Dispatch(SessionAction::PopQueryChar)),
            KeyCode::Char(c) if !ctrl && !c.is_control() => {
                Some(Command::Dispatch(SessionAction::PushQueryChar(c)))
            }
            _ => None,
        },
        InputMode::Browse => {
            if ctrl {
                return None;
            }
            let scrub = scrub_seconds as f64;
            let action = match key.code {
                KeyCode::Char('q') => return Some(Command::Quit),
                KeyCode::Char('/') => return Some(Command::EnterQuery),
                KeyCode::Char('j') => SessionAction::FocusNext,
                KeyCode::Char('k') => SessionAction::FocusPrevious,
                KeyCode::Char('h') => SessionAction::PreviousPage,
                KeyCode::Char('l') => SessionAction::NextPage,
                KeyCode::Enter => SessionAction::ActivateFocused,
                KeyCode::Char('d') => SessionAction::DeleteFocused,
                KeyCode::Char('p') | KeyCode::Char(' ') => SessionAction::TogglePlayPause,
                KeyCode::Char('[') => SessionAction::PreviousTrack,
                KeyCode::Char(']') => SessionAction::NextTrack,
                KeyCode::Char('H') => SessionAction::SeekBy(-scrub),
                KeyCode::Char('L') => SessionAction::SeekBy(scrub),
                _ => return None,
            };
            Some(Command::Dispatch(action))
        }
    }
}
