use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseEvent};

use super::keybindings::{Action, KeyBindings};
use crate::app::state::{AppState, ModalState};

pub enum InputResult {
    Continue,
    Quit,
    Action(Action),
    Char(char),
    Backspace,
    /// Resolved against the screen layout by the app
    Mouse(MouseEvent),
    Resize(u16, u16),
}

pub fn handle_input(event: Event, state: &AppState, bindings: &KeyBindings) -> InputResult {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key(key_event, state, bindings)
        }
        Event::Mouse(mouse) => InputResult::Mouse(mouse),
        Event::Resize(w, h) => InputResult::Resize(w, h),
        _ => InputResult::Continue,
    }
}

fn handle_key(key: KeyEvent, state: &AppState, bindings: &KeyBindings) -> InputResult {
    match &state.modal {
        ModalState::Help { .. } => return handle_help_input(key, bindings),
        ModalState::DepartmentPicker { .. } => return handle_picker_input(key, bindings),
        ModalState::ConfirmBulkDelete { .. } => return handle_confirm_input(key),
        ModalState::Search => return handle_text_input(key),
        ModalState::None => {}
    }

    if state.panel.is_renaming() {
        return handle_text_input(key);
    }

    if let Some(action) = bindings.get(&key) {
        if action == Action::Quit {
            return InputResult::Quit;
        }
        return InputResult::Action(action);
    }

    InputResult::Continue
}

fn handle_help_input(key: KeyEvent, bindings: &KeyBindings) -> InputResult {
    if let Some(action) = bindings.get(&key) {
        match action {
            Action::Help | Action::Up | Action::Down => return InputResult::Action(action),
            _ => {}
        }
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('?') => InputResult::Action(Action::Help),
        KeyCode::Up | KeyCode::Char('k') => InputResult::Action(Action::Up),
        KeyCode::Down | KeyCode::Char('j') => InputResult::Action(Action::Down),
        _ => InputResult::Continue,
    }
}

fn handle_picker_input(key: KeyEvent, bindings: &KeyBindings) -> InputResult {
    if let Some(action) = bindings.get(&key) {
        match action {
            Action::Up | Action::Down | Action::Open | Action::Back => {
                return InputResult::Action(action);
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Up => InputResult::Action(Action::Up),
        KeyCode::Down => InputResult::Action(Action::Down),
        KeyCode::Enter => InputResult::Action(Action::Open),
        KeyCode::Esc => InputResult::Action(Action::Back),
        _ => InputResult::Continue,
    }
}

fn handle_confirm_input(key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            InputResult::Action(Action::Open)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => InputResult::Action(Action::Back),
        _ => InputResult::Continue,
    }
}

/// Search box and rename field: Enter keeps the text, Esc discards it.
fn handle_text_input(key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Char(c) => InputResult::Char(c),
        KeyCode::Backspace => InputResult::Backspace,
        KeyCode::Enter => InputResult::Action(Action::Open),
        KeyCode::Esc => InputResult::Action(Action::Back),
        KeyCode::Down => InputResult::Action(Action::Down),
        KeyCode::Up => InputResult::Action(Action::Up),
        _ => InputResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KeybindingMode, PanelConfig};
    use crate::panel::Panel;
    use crossterm::event::KeyModifiers;

    fn state() -> AppState {
        AppState::new(Panel::new(&PanelConfig::default(), true), "%b %d".into())
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_action() {
        let bindings = KeyBindings::new(&KeybindingMode::Vim);
        let result = handle_key(key('q'), &state(), &bindings);
        assert!(matches!(result, InputResult::Quit));
    }

    #[test]
    fn test_search_mode_captures_letters() {
        let bindings = KeyBindings::new(&KeybindingMode::Vim);
        let mut state = state();
        state.modal = ModalState::Search;
        assert!(matches!(
            handle_key(key('q'), &state, &bindings),
            InputResult::Char('q')
        ));
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert!(matches!(
            handle_key(esc, &state, &bindings),
            InputResult::Action(Action::Back)
        ));
    }

    #[test]
    fn test_confirm_accepts_y() {
        let bindings = KeyBindings::new(&KeybindingMode::Vim);
        let mut state = state();
        state.modal = ModalState::ConfirmBulkDelete { count: 2 };
        assert!(matches!(
            handle_key(key('y'), &state, &bindings),
            InputResult::Action(Action::Open)
        ));
        assert!(matches!(
            handle_key(key('d'), &state, &bindings),
            InputResult::Continue
        ));
    }

    #[test]
    fn test_key_release_is_ignored() {
        let bindings = KeyBindings::new(&KeybindingMode::Vim);
        let mut release = key('j');
        release.kind = KeyEventKind::Release;
        assert!(matches!(
            handle_input(Event::Key(release), &state(), &bindings),
            InputResult::Continue
        ));
    }
}
