//! Overlays drawn above the panel and conversation view.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use super::components::centered_rect_constrained;
use super::theme::{Theme, borders, with_selection_bg};
use crate::input::KeybindingEntry;

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(borders::popup())
        .border_style(Theme::border_focused())
        .style(Theme::main_bg())
}

/// Area covered by the overlay popups, used for pointer hit testing.
pub fn overlay_area(area: Rect) -> Rect {
    centered_rect_constrained(area, 30, 60, 6, 24)
}

pub fn render_help(frame: &mut Frame, area: Rect, keybindings: &[KeybindingEntry], scroll: usize) {
    let popup = overlay_area(area);
    frame.render_widget(Clear, popup);

    let block = popup_block("Keys");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines = Vec::new();
    let mut category = "";
    for entry in keybindings {
        if entry.category != category {
            category = entry.category;
            lines.push(Line::from(Span::styled(category, Theme::group_header())));
        }
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<14}", entry.key), Theme::help_key()),
            Span::styled(entry.description.clone(), Theme::text()),
        ]));
    }

    let scroll = scroll.min(u16::MAX as usize) as u16;
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
}

pub fn render_department_picker(
    frame: &mut Frame,
    area: Rect,
    targets: &[(String, String)],
    selected: usize,
) {
    let popup = overlay_area(area);
    frame.render_widget(Clear, popup);

    let block = popup_block("Move to");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let items: Vec<ListItem> = targets
        .iter()
        .enumerate()
        .map(|(i, (_, name))| {
            let style = with_selection_bg(Theme::text(), i == selected);
            ListItem::new(Line::from(Span::styled(format!(" {}", name), style)))
        })
        .collect();

    // Keep the cursor visible in short terminals
    let height = inner.height as usize;
    let skip = (selected + 1).saturating_sub(height);
    let visible: Vec<ListItem> = items.into_iter().skip(skip).collect();
    frame.render_widget(List::new(visible), inner);
}

pub fn render_confirm_bulk_delete(frame: &mut Frame, area: Rect, count: usize) {
    let popup = centered_rect_constrained(area, 30, 44, 5, 5);
    frame.render_widget(Clear, popup);

    let noun = if count == 1 {
        "conversation"
    } else {
        "conversations"
    };
    let lines = vec![
        Line::from(Span::styled(
            format!("Delete {} {}?", count, noun),
            Theme::title(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y ", Theme::help_key()),
            Span::styled("delete  ", Theme::help_desc()),
            Span::styled(" n ", Theme::help_key()),
            Span::styled("cancel", Theme::help_desc()),
        ]),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(ratatui::layout::Alignment::Center)
        .block(popup_block("Confirm"));
    frame.render_widget(paragraph, popup);
}
