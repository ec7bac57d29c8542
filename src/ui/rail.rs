//! Collapsed icon rail along the left edge.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme::Theme;
use crate::app::state::AppState;
use crate::panel::VisualState;

pub fn render_rail(frame: &mut Frame, area: Rect, state: &AppState) {
    let panel = &state.panel;
    let active = panel.visual_state() != VisualState::Collapsed;

    let icon_style = if active {
        Theme::rail_icon_active()
    } else {
        Theme::rail()
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(" ≡ ", icon_style)),
        Line::from(""),
        Line::from(Span::styled(
            format!("{:^3}", panel.conversations().len().min(999)),
            Theme::rail(),
        )),
    ];

    if !panel.selection().is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("✓{}", panel.selection().len().min(99)),
            Theme::rail_icon_active(),
        )));
    }
    if !panel.query().is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" / ", Theme::rail_icon_active())));
    }
    if panel.has_unacknowledged_error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" ! ", Theme::toast_error())));
    }
    if panel.is_loading() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {} ", super::widgets::spinner_char()),
            Theme::rail(),
        )));
    }

    frame.render_widget(Paragraph::new(lines).style(Theme::rail()), area);
}
