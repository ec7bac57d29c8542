//! Application state types
//!
//! Everything the render thread needs lives in [`AppState`], which is
//! cloned and shipped to it whenever the loop marks itself dirty.

use crate::input::KeybindingEntry;
use crate::panel::Panel;

/// Modal overlay state - only one can be active at a time
#[derive(Debug, Clone, Default)]
pub enum ModalState {
    #[default]
    None,
    /// Typing into the panel's search box
    Search,
    /// Choosing a department to move the focused conversation into
    DepartmentPicker {
        /// (group key, display name)
        targets: Vec<(String, String)>,
        selected: usize,
    },
    ConfirmBulkDelete {
        count: usize,
    },
    Help {
        keybindings: Vec<KeybindingEntry>,
        scroll: usize,
    },
}

impl ModalState {
    pub fn is_search(&self) -> bool {
        matches!(self, Self::Search)
    }

    pub fn is_help(&self) -> bool {
        matches!(self, Self::Help { .. })
    }

    /// True for modals drawn over the screen as a popup
    pub fn is_overlay(&self) -> bool {
        matches!(
            self,
            Self::DepartmentPicker { .. } | Self::ConfirmBulkDelete { .. } | Self::Help { .. }
        )
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub panel: Panel,
    pub modal: ModalState,
    /// Terminal size in columns and rows
    pub viewport: (u16, u16),
    pub date_format: String,
}

impl AppState {
    pub fn new(panel: Panel, date_format: String) -> Self {
        Self {
            panel,
            modal: ModalState::None,
            viewport: (0, 0),
            date_format,
        }
    }

    pub fn help_scroll_down(&mut self) {
        if let ModalState::Help { keybindings, scroll } = &mut self.modal
            && *scroll + 1 < keybindings.len()
        {
            *scroll += 1;
        }
    }

    pub fn help_scroll_up(&mut self) {
        if let ModalState::Help { scroll, .. } = &mut self.modal {
            *scroll = scroll.saturating_sub(1);
        }
    }

    pub fn picker_down(&mut self) {
        if let ModalState::DepartmentPicker { targets, selected } = &mut self.modal
            && *selected + 1 < targets.len()
        {
            *selected += 1;
        }
    }

    pub fn picker_up(&mut self) {
        if let ModalState::DepartmentPicker { selected, .. } = &mut self.modal {
            *selected = selected.saturating_sub(1);
        }
    }

    /// Group key under the picker cursor
    pub fn picker_choice(&self) -> Option<&str> {
        match &self.modal {
            ModalState::DepartmentPicker { targets, selected } => {
                targets.get(*selected).map(|(key, _)| key.as_str())
            }
            _ => None,
        }
    }
}
