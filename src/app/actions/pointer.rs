//! Mouse handling: rail hover, row clicks and drag to department

use std::time::Instant;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};

use crate::panel::{ListView, PointerTarget, RowView};
use crate::ui::{Hit, hit_test, overlay_area, screen_layout};

use super::super::state::ModalState;
use super::super::{App, PointerPress};

impl App {
    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) {
        let now = Instant::now();
        let (width, height) = self.state.viewport;
        let area = Rect::new(0, 0, width, height);

        // Popups swallow the pointer; a click outside one dismisses it
        if self.state.modal.is_overlay() {
            if let MouseEventKind::Down(_) = mouse.kind {
                let inside = overlay_area(area).contains(Position::new(mouse.column, mouse.row));
                if inside {
                    self.state.panel.pointer_down(PointerTarget::Overlay);
                } else {
                    self.state.modal = ModalState::None;
                }
            }
            return;
        }

        let layout = screen_layout(area, self.state.panel.view());
        let view = self.state.panel.list_view();
        let hit = hit_test(&layout, view.offset, mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Moved => self.pointer_moved(hit, now),
            MouseEventKind::Down(MouseButton::Left) => self.pointer_pressed(hit, &view),
            MouseEventKind::Drag(MouseButton::Left) => {
                self.pointer_moved(hit, now);
                self.pointer_dragged(hit, &view);
            }
            MouseEventKind::Up(MouseButton::Left) => self.pointer_released(),
            MouseEventKind::ScrollDown if matches!(hit, Hit::Row { .. }) => {
                self.state.panel.move_down()
            }
            MouseEventKind::ScrollUp if matches!(hit, Hit::Row { .. }) => {
                self.state.panel.move_up()
            }
            _ => {}
        }
    }

    fn pointer_moved(&mut self, hit: Hit, now: Instant) {
        match hit {
            Hit::Rail => self.state.panel.pointer_entered_rail(now),
            Hit::Row { .. } | Hit::Panel => self.state.panel.pointer_entered_content(),
            Hit::Main => self.state.panel.pointer_left(now),
        }
    }

    fn pointer_pressed(&mut self, hit: Hit, view: &ListView) {
        let target = match hit {
            Hit::Main => PointerTarget::Outside,
            _ => PointerTarget::Panel,
        };
        self.state.panel.pointer_down(target);

        match hit {
            Hit::Rail => {
                if self.state.panel.is_mobile_layout() {
                    self.state.panel.toggle_drawer();
                } else {
                    self.state.panel.toggle_pin();
                }
            }
            Hit::Row { row, checkbox } => match view.row(row) {
                Some(RowView::Header {
                    key, collapsible, ..
                }) => {
                    if *collapsible {
                        self.state.panel.toggle_group(key);
                    }
                }
                Some(RowView::Conversation { id, position, .. }) => {
                    if checkbox {
                        self.state.panel.toggle_selection(id);
                    } else {
                        self.press = Some(PointerPress {
                            id: id.clone(),
                            position: *position,
                            row,
                            dragging: false,
                        });
                    }
                }
                None => {}
            },
            Hit::Panel | Hit::Main => {}
        }
    }

    fn pointer_dragged(&mut self, hit: Hit, view: &ListView) {
        let Some(press) = self.press.as_mut() else {
            return;
        };
        let over_row = match hit {
            Hit::Row { row, .. } => Some(row),
            _ => None,
        };

        if !press.dragging {
            // Still on the pressed row: could yet be a click
            if over_row == Some(press.row) {
                return;
            }
            press.dragging = true;
            self.state.panel.drag_start(&press.id);
        }

        let target = over_row.and_then(|row| view.row(row)).map(|row| match row {
            RowView::Header { key, .. } => key.as_str(),
            RowView::Conversation { group_key, .. } => group_key.as_str(),
        });
        match target {
            Some(key) => self.state.panel.drag_over(key),
            None => self.state.panel.drag_leave(),
        }
    }

    fn pointer_released(&mut self) {
        let Some(press) = self.press.take() else {
            return;
        };

        if press.dragging {
            match self.state.panel.drag().drop_target().map(str::to_string) {
                Some(key) => self.state.panel.drop_on(&key),
                None => self.state.panel.cancel_drag(),
            }
        } else {
            self.state.panel.focus_position(press.position);
            self.state.panel.select(press.id);
        }
    }
}
