use ratatui::{Frame, widgets::Block};

use super::conversation::render_conversation;
use super::layout::screen_layout;
use super::panel::render_panel;
use super::popups::{render_confirm_bulk_delete, render_department_picker, render_help};
use super::rail::render_rail;
use super::theme::Theme;
use crate::app::state::{AppState, ModalState};

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Theme::main_bg()), area);

    let layout = screen_layout(area, state.panel.view());

    render_conversation(frame, layout.main, state);
    if let Some(rail) = layout.rail {
        render_rail(frame, rail, state);
    }
    render_panel(frame, &layout, state);

    match &state.modal {
        ModalState::Help {
            keybindings,
            scroll,
        } => render_help(frame, area, keybindings, *scroll),
        ModalState::DepartmentPicker { targets, selected } => {
            render_department_picker(frame, area, targets, *selected)
        }
        ModalState::ConfirmBulkDelete { count } => {
            render_confirm_bulk_delete(frame, area, *count)
        }
        ModalState::Search | ModalState::None => {}
    }
}
