//! Text input handling (chars, backspace)

use std::time::Instant;

use super::super::App;

impl App {
    pub(crate) fn handle_char(&mut self, c: char) {
        if self.state.modal.is_search() {
            self.state.panel.search_input(c, Instant::now());
        } else if self.state.panel.is_renaming() {
            self.state.panel.rename_input(c);
        }
    }

    pub(crate) fn handle_backspace(&mut self) {
        if self.state.modal.is_search() {
            self.state.panel.search_backspace(Instant::now());
        } else if self.state.panel.is_renaming() {
            self.state.panel.rename_backspace();
        }
    }
}
