use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::space_travel::Direction;

/// Actions that can result from processing a key event.
/// The hub turns these into editor commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The key was consumed but nothing happens.
    None,
    EnterNormalMode,
    EnterInsertMode,
    /// Move the cursor, or bisect the travel box while travelling.
    Move(Direction),
    ToggleSpaceTravel,
    /// Open the `:` command line.
    EnterCommandMode,
    Help,
    NextView,
    PrevView,
    InsertChar(char),
    InsertNewline,
    Backspace,
    Delete,
}

/// Pending key state for two-key sequences like `gt` and `gT`.
#[derive(Debug, Default, Clone)]
pub struct KeyState {
    /// Pending first key of a two-key sequence.
    pub pending_key: Option<char>,
}

impl KeyState {
    pub fn reset(&mut self) {
        self.pending_key = None;
    }
}

fn arrow(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up => Some(Direction::Up),
        KeyCode::Down => Some(Direction::Down),
        KeyCode::Left => Some(Direction::Left),
        KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}

/// Process a key event in Normal mode, accounting for multi-key sequences.
pub fn process_normal_key(key: KeyEvent, state: &mut KeyState) -> Action {
    if let Some(pending) = state.pending_key.take() {
        return match (pending, key.code) {
            ('g', KeyCode::Char('t')) => Action::NextView,
            ('g', KeyCode::Char('T')) => Action::PrevView,
            _ => Action::None, // Invalid sequence, ignore
        };
    }

    if let Some(direction) = arrow(key.code) {
        return Action::Move(direction);
    }

    match key.code {
        KeyCode::Char('h') => Action::Move(Direction::Left),
        KeyCode::Char('j') => Action::Move(Direction::Down),
        KeyCode::Char('k') => Action::Move(Direction::Up),
        KeyCode::Char('l') => Action::Move(Direction::Right),
        KeyCode::Char(' ') => Action::ToggleSpaceTravel,
        KeyCode::Char('i') => Action::EnterInsertMode,
        KeyCode::Esc => Action::EnterNormalMode,
        KeyCode::Char(':') => Action::EnterCommandMode,
        KeyCode::Char('?') => Action::Help,
        KeyCode::Char('g') => {
            state.pending_key = Some('g');
            Action::None
        }
        _ => Action::None,
    }
}

/// Process a key event in Insert mode.
pub fn process_insert_key(key: KeyEvent) -> Action {
    if let Some(direction) = arrow(key.code) {
        return Action::Move(direction);
    }

    match key.code {
        KeyCode::Esc => Action::EnterNormalMode,
        KeyCode::Enter => Action::InsertNewline,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Char(c)
            if key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT =>
        {
            Action::InsertChar(c)
        }
        _ => Action::None,
    }
}
