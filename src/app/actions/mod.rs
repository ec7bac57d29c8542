//! Action handlers for user input
//!
//! - `input`: text entry for the search box and rename field
//! - `pointer`: mouse hover, click and drag

mod input;
mod pointer;

use crate::input::Action;

use super::App;
use super::state::ModalState;

impl App {
    pub(crate) fn handle_action(&mut self, action: Action) {
        match action {
            Action::Up => self.move_up(),
            Action::Down => self.move_down(),
            Action::Open => self.open(),
            Action::Back => self.go_back(),
            Action::Quit => {} // Handled in event loop

            Action::TogglePin => self.state.panel.toggle_pin(),
            Action::ToggleDrawer => {
                if self.state.panel.is_mobile_layout() {
                    self.state.panel.toggle_drawer();
                }
            }
            Action::ToggleGroup => self.state.panel.toggle_focused_group(),
            Action::CycleFilter => self.state.panel.cycle_filter(),
            Action::Search => {
                if self.state.panel.view().shows_content() {
                    self.state.modal = ModalState::Search;
                }
            }
            Action::Refresh => self.state.panel.refresh(),

            Action::NewConversation => self.state.panel.create_conversation(),
            Action::Delete => self.state.panel.delete_focused(),
            Action::Rename => self.state.panel.start_rename(),
            Action::MoveToDepartment => self.open_department_picker(),

            Action::ToggleSelect => self.state.panel.toggle_focused_selection(),
            Action::ClearSelection => self.state.panel.clear_selection(),
            Action::BulkDelete => {
                let selection = self.state.panel.selection();
                if !selection.is_empty() && !selection.is_deleting() {
                    self.state.modal = ModalState::ConfirmBulkDelete {
                        count: selection.len(),
                    };
                }
            }

            Action::Help => self.toggle_help(),
        }
    }

    fn move_up(&mut self) {
        match self.state.modal {
            ModalState::Help { .. } => self.state.help_scroll_up(),
            ModalState::DepartmentPicker { .. } => self.state.picker_up(),
            _ => self.state.panel.move_up(),
        }
    }

    fn move_down(&mut self) {
        match self.state.modal {
            ModalState::Help { .. } => self.state.help_scroll_down(),
            ModalState::DepartmentPicker { .. } => self.state.picker_down(),
            _ => self.state.panel.move_down(),
        }
    }

    /// Enter: confirm whatever is in front of the user.
    fn open(&mut self) {
        match &self.state.modal {
            ModalState::DepartmentPicker { .. } => {
                if let Some(key) = self.state.picker_choice().map(str::to_string) {
                    self.state.panel.move_focused_to(&key);
                }
                self.state.modal = ModalState::None;
            }
            ModalState::ConfirmBulkDelete { .. } => {
                self.state.panel.bulk_delete();
                self.state.modal = ModalState::None;
            }
            // Keep the query, leave the search box
            ModalState::Search => self.state.modal = ModalState::None,
            ModalState::Help { .. } => {}
            ModalState::None => {
                if self.state.panel.is_renaming() {
                    self.state.panel.commit_rename();
                } else {
                    self.state.panel.select_current();
                }
            }
        }
    }

    /// Esc: back out of the innermost mode.
    fn go_back(&mut self) {
        if self.state.modal.is_search() {
            self.state.panel.clear_search();
            self.state.modal = ModalState::None;
        } else if self.state.modal.is_active() {
            self.state.modal = ModalState::None;
        } else if self.state.panel.is_renaming() {
            self.state.panel.cancel_rename();
        } else if self.state.panel.drag().active().is_some() {
            self.state.panel.cancel_drag();
            self.press = None;
        } else if !self.state.panel.selection().is_empty() {
            self.state.panel.clear_selection();
        } else if self.state.panel.is_mobile_layout() && self.state.panel.view().shows_content() {
            self.state.panel.set_mobile_open(false);
        }
    }

    fn open_department_picker(&mut self) {
        if !self.state.panel.view().shows_content() {
            return;
        }
        let targets = self.state.panel.move_targets();
        if targets.is_empty() {
            return;
        }
        self.state.modal = ModalState::DepartmentPicker {
            targets,
            selected: 0,
        };
    }

    fn toggle_help(&mut self) {
        if self.state.modal.is_help() {
            self.state.modal = ModalState::None;
        } else {
            self.state.modal = ModalState::Help {
                keybindings: self.bindings.all_bindings(),
                scroll: 0,
            };
        }
    }
}
