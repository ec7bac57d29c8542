use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::config::KeybindingMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Navigation
    Up,
    Down,
    Open,
    Back,
    Quit,

    // Panel
    TogglePin,
    ToggleDrawer,
    ToggleGroup,
    CycleFilter,
    Search,
    Refresh,

    // Conversations
    NewConversation,
    Delete,
    Rename,
    MoveToDepartment,

    // Selection
    ToggleSelect,
    ClearSelection,
    BulkDelete,

    // Help
    Help,
}

pub struct KeyBindings {
    bindings: HashMap<KeyEvent, Action>,
}

/// A displayable keybinding entry
#[derive(Debug, Clone)]
pub struct KeybindingEntry {
    pub key: String,
    pub description: String,
    pub category: &'static str,
}

impl KeyBindings {
    pub fn new(mode: &KeybindingMode) -> Self {
        let bindings = match mode {
            KeybindingMode::Vim => Self::vim_bindings(),
            KeybindingMode::Arrows => Self::arrow_bindings(),
        };
        Self { bindings }
    }

    pub fn get(&self, event: &KeyEvent) -> Option<Action> {
        self.bindings.get(event).copied()
    }

    /// Get all keybindings as displayable entries grouped by category
    pub fn all_bindings(&self) -> Vec<KeybindingEntry> {
        let mut entries: Vec<_> = self
            .bindings
            .iter()
            .map(|(event, action)| KeybindingEntry {
                key: format_key_event(event),
                description: action_description(action).to_string(),
                category: action_category(action),
            })
            .collect();

        entries.sort_by(|a, b| {
            category_order(a.category)
                .cmp(&category_order(b.category))
                .then_with(|| a.description.cmp(&b.description))
                .then_with(|| a.key.cmp(&b.key))
        });
        entries
    }

    fn vim_bindings() -> HashMap<KeyEvent, Action> {
        let mut map = HashMap::new();

        map.insert(key('j'), Action::Down);
        map.insert(key('k'), Action::Up);
        map.insert(key_code(KeyCode::Enter), Action::Open);
        map.insert(key_code(KeyCode::Esc), Action::Back);
        map.insert(key('q'), Action::Quit);

        map.insert(key('p'), Action::TogglePin);
        map.insert(key('b'), Action::ToggleDrawer);
        map.insert(key_code(KeyCode::Tab), Action::ToggleGroup);
        map.insert(key('f'), Action::CycleFilter);
        map.insert(key('/'), Action::Search);
        map.insert(ctrl_key('r'), Action::Refresh);

        map.insert(key('c'), Action::NewConversation);
        map.insert(key('d'), Action::Delete);
        map.insert(key('r'), Action::Rename);
        map.insert(key('m'), Action::MoveToDepartment);

        map.insert(key(' '), Action::ToggleSelect);
        map.insert(key('x'), Action::ToggleSelect);
        map.insert(shift_key('X'), Action::ClearSelection);
        map.insert(shift_key('D'), Action::BulkDelete);

        map.insert(key('?'), Action::Help);

        map
    }

    fn arrow_bindings() -> HashMap<KeyEvent, Action> {
        let mut map = HashMap::new();

        map.insert(key_code(KeyCode::Down), Action::Down);
        map.insert(key_code(KeyCode::Up), Action::Up);
        map.insert(key_code(KeyCode::Enter), Action::Open);
        map.insert(key_code(KeyCode::Esc), Action::Back);
        map.insert(ctrl_key('q'), Action::Quit);

        map.insert(key_code(KeyCode::F(2)), Action::TogglePin);
        map.insert(ctrl_key('b'), Action::ToggleDrawer);
        map.insert(key_code(KeyCode::Tab), Action::ToggleGroup);
        map.insert(key_code(KeyCode::F(4)), Action::CycleFilter);
        map.insert(key_code(KeyCode::F(3)), Action::Search);
        map.insert(key('/'), Action::Search);
        map.insert(key_code(KeyCode::F(5)), Action::Refresh);

        map.insert(ctrl_key('n'), Action::NewConversation);
        map.insert(key_code(KeyCode::Delete), Action::Delete);
        map.insert(key_code(KeyCode::F(6)), Action::Rename);
        map.insert(key_code(KeyCode::F(7)), Action::MoveToDepartment);

        map.insert(key(' '), Action::ToggleSelect);
        map.insert(ctrl_key('x'), Action::ClearSelection);
        map.insert(shift_key_code(KeyCode::Delete), Action::BulkDelete);

        map.insert(key_code(KeyCode::F(1)), Action::Help);

        map
    }
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn shift_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
}

fn ctrl_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn shift_key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::SHIFT)
}

/// Format a KeyEvent for display
fn format_key_event(event: &KeyEvent) -> String {
    let mut parts = Vec::new();

    if event.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl+");
    }
    if event.modifiers.contains(KeyModifiers::SHIFT) && !matches!(event.code, KeyCode::Char(_)) {
        parts.push("Shift+");
    }

    let key_str = match event.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => format!("{:?}", event.code),
    };

    format!("{}{}", parts.join(""), key_str)
}

fn action_description(action: &Action) -> &'static str {
    match action {
        Action::Up => "Move up",
        Action::Down => "Move down",
        Action::Open => "Open conversation",
        Action::Back => "Cancel / close",
        Action::Quit => "Quit",
        Action::TogglePin => "Pin / unpin panel",
        Action::ToggleDrawer => "Open / close drawer",
        Action::ToggleGroup => "Collapse / expand group",
        Action::CycleFilter => "Cycle filter",
        Action::Search => "Search conversations",
        Action::Refresh => "Refresh",
        Action::NewConversation => "New conversation",
        Action::Delete => "Delete conversation",
        Action::Rename => "Rename conversation",
        Action::MoveToDepartment => "Move to department",
        Action::ToggleSelect => "Toggle selection",
        Action::ClearSelection => "Clear selection",
        Action::BulkDelete => "Delete selected",
        Action::Help => "Toggle help",
    }
}

fn action_category(action: &Action) -> &'static str {
    match action {
        Action::Up | Action::Down | Action::Open | Action::Back | Action::Quit => "Navigation",

        Action::TogglePin
        | Action::ToggleDrawer
        | Action::ToggleGroup
        | Action::CycleFilter
        | Action::Search
        | Action::Refresh => "Panel",

        Action::NewConversation
        | Action::Delete
        | Action::Rename
        | Action::MoveToDepartment => "Conversations",

        Action::ToggleSelect | Action::ClearSelection | Action::BulkDelete => "Selection",

        Action::Help => "Help",
    }
}

fn category_order(category: &str) -> u8 {
    match category {
        "Navigation" => 0,
        "Panel" => 1,
        "Conversations" => 2,
        "Selection" => 3,
        "Help" => 4,
        _ => 99,
    }
}
