//! Expanded conversation panel: search, filter, grouped or windowed list.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use super::layout::ScreenLayout;
use super::theme::{Theme, borders, with_selection_bg};
use super::widgets::{fit_width, format_date, help_bar, spinner_char, truncate_string};
use crate::app::state::AppState;
use crate::panel::{ListView, NotificationKind, PanelView, RenderStrategy, RowView};

pub fn render_panel(frame: &mut Frame, layout: &ScreenLayout, state: &AppState) {
    let (Some(area), Some(header), Some(list), Some(footer)) =
        (layout.panel, layout.header, layout.list, layout.footer)
    else {
        return;
    };
    let panel = &state.panel;

    // The drawer floats over the conversation view
    if panel.view() == PanelView::Drawer {
        frame.render_widget(Clear, area);
    }

    let mut block = Block::default()
        .title(Span::styled(" Conversations ", Theme::title()))
        .borders(Borders::ALL)
        .border_type(borders::panel())
        .border_style(if panel.is_pinned() {
            Theme::border_focused()
        } else {
            Theme::border()
        })
        .style(Theme::main_bg());
    if panel.is_pinned() {
        block = block
            .title_top(Line::from(Span::styled(" pinned ", Theme::text_muted())).right_aligned());
    }
    frame.render_widget(block, area);

    render_header(frame, header, state);

    let view = panel.list_view();
    render_list(frame, list, state, &view);

    render_footer(frame, footer, state);
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let panel = &state.panel;
    let width = area.width as usize;
    let mut lines = Vec::with_capacity(4);

    // Search box
    let searching = state.modal.is_search();
    let mut search = vec![Span::styled(" / ", Theme::text_accent())];
    if panel.query().is_empty() && !searching {
        search.push(Span::styled("Search conversations", Theme::text_muted()));
    } else {
        let budget = width.saturating_sub(6);
        let query = tail_to_width(panel.query(), budget);
        search.push(Span::styled(query, Theme::text()));
        if searching {
            search.push(Span::styled("_", Theme::input_highlight()));
        }
    }
    if panel.is_searching() {
        search.push(Span::styled(format!(" {}", spinner_char()), Theme::text_muted()));
    }
    lines.push(Line::from(search));

    // Filter or selection summary
    let selection = panel.selection();
    let summary = if selection.is_deleting() {
        Line::from(Span::styled(
            format!(" Deleting {} {}", selection.len(), spinner_char()),
            Theme::checkbox(),
        ))
    } else if !selection.is_empty() {
        Line::from(vec![
            Span::styled(format!(" {} selected", selection.len()), Theme::checkbox()),
            Span::styled("  D delete  X clear", Theme::text_muted()),
        ])
    } else {
        Line::from(vec![
            Span::styled(" Filter: ", Theme::text_muted()),
            Span::styled(panel.filter_label(), Theme::text_secondary()),
            Span::styled(format!("  ({})", panel.result_count()), Theme::text_muted()),
        ])
    };
    lines.push(summary);

    // Drag status or list mode
    let status = match panel.drag().active() {
        Some(drag) => {
            let title = panel
                .conversation(&drag.conversation_id)
                .map(|c| c.title.as_str())
                .unwrap_or("conversation");
            let target = panel.drag().drop_target().unwrap_or("…");
            Line::from(Span::styled(
                truncate_string(&format!(" Moving '{}' → {}", title, target), width),
                Theme::drop_target(),
            ))
        }
        None => {
            let mode = match panel.strategy() {
                RenderStrategy::Grouped => "grouped",
                RenderStrategy::Virtualized => "windowed",
            };
            Line::from(Span::styled(format!(" {}", mode), Theme::text_muted()))
        }
    };
    lines.push(status);
    lines.push(Line::from(Span::styled("─".repeat(width), Theme::border())));

    frame.render_widget(Paragraph::new(lines), area);
}

/// Keep the end of `s` visible in `width` columns.
fn tail_to_width(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut start = chars.len();
    let mut used = 0;
    while start > 0 {
        let w = unicode_width::UnicodeWidthChar::width(chars[start - 1]).unwrap_or(0);
        if used + w > width.saturating_sub(1) {
            break;
        }
        used += w;
        start -= 1;
    }
    format!("…{}", chars[start..].iter().collect::<String>())
}

fn render_list(frame: &mut Frame, area: Rect, state: &AppState, view: &ListView) {
    let panel = &state.panel;

    if view.unmeasured {
        let msg = Paragraph::new(" Measuring…").style(Theme::text_muted());
        frame.render_widget(msg, area);
        return;
    }

    if panel.result_count() == 0 {
        let msg = if panel.is_loading() {
            format!(" {} Loading conversations", spinner_char())
        } else if !panel.query().trim().is_empty() {
            format!(" No matches for '{}'", panel.query().trim())
        } else {
            " No conversations".to_string()
        };
        frame.render_widget(Paragraph::new(msg).style(Theme::text_muted()), area);
        return;
    }

    let width = area.width as usize;
    let lines: Vec<Line> = (0..area.height as usize)
        .map(|i| match view.row(view.offset + i) {
            Some(row) => render_row(row, width, &state.date_format),
            None => Line::from(""),
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).style(Theme::main_bg()), area);
}

fn render_row(row: &RowView, width: usize, date_format: &str) -> Line<'static> {
    match row {
        RowView::Header {
            name,
            count,
            expanded,
            collapsible,
            drop_target,
            ..
        } => {
            let arrow = match (collapsible, expanded) {
                (false, _) => " ",
                (true, true) => "▾",
                (true, false) => "▸",
            };
            let style = if *drop_target {
                Theme::drop_target()
            } else {
                Theme::group_header()
            };
            let text = format!("{} {} ({})", arrow, name, count);
            Line::from(Span::styled(fit_width(&text, width), style))
        }
        RowView::Conversation {
            title,
            updated_at,
            message_count,
            focused,
            selected,
            current,
            dragging,
            editing,
            rename_pending,
            ..
        } => {
            let bg = |style: Style| with_selection_bg(style, *focused);
            let checkbox = if *selected { "[x] " } else { "[ ] " };
            let marker = if *current { "● " } else { "  " };

            let date = format_date(*updated_at, date_format);
            let meta = if *message_count > 0 {
                format!(" {} {}", message_count, date)
            } else {
                format!(" {}", date)
            };
            let title_width = width
                .saturating_sub(checkbox.width() + marker.width())
                .saturating_sub(meta.width());

            let mut spans = vec![
                Span::styled(checkbox, bg(Theme::checkbox())),
                Span::styled(marker, bg(Theme::current_marker())),
            ];

            if let Some(buffer) = editing {
                let text = tail_to_width(buffer, title_width.saturating_sub(1));
                let pad = title_width.saturating_sub(text.width() + 1);
                spans.push(Span::styled(text, bg(Theme::input_highlight())));
                spans.push(Span::styled("_", bg(Theme::input_highlight())));
                spans.push(Span::styled(" ".repeat(pad), bg(Theme::text())));
            } else {
                let shown = if *rename_pending {
                    format!("{} …", title)
                } else {
                    title.clone()
                };
                let style = if *dragging {
                    Theme::dragging()
                } else if *current {
                    Theme::title()
                } else {
                    Theme::text()
                };
                spans.push(Span::styled(fit_width(&shown, title_width), bg(style)));
            }
            spans.push(Span::styled(meta, bg(Theme::text_muted())));
            Line::from(spans)
        }
    }
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let panel = &state.panel;
    let status_area = Rect::new(area.x, area.y, area.width, 1.min(area.height));

    let status = match panel.notification() {
        Some(n) => {
            let style = match n.kind {
                NotificationKind::Success => Theme::toast_success(),
                NotificationKind::Error => Theme::toast_error(),
                NotificationKind::Info => Theme::toast_info(),
            };
            Paragraph::new(fit_width(&format!(" {}", n.message), area.width as usize)).style(style)
        }
        None if panel.has_unacknowledged_error() => {
            Paragraph::new(" Last action failed").style(Theme::toast_error())
        }
        None if panel.is_loading() => {
            Paragraph::new(format!(" {} Refreshing", spinner_char())).style(Theme::text_muted())
        }
        None if panel.has_more() => {
            Paragraph::new(" More conversations on the server").style(Theme::text_muted())
        }
        None => Paragraph::new(""),
    };
    frame.render_widget(status, status_area);

    if area.height > 1 {
        let hints_area = Rect::new(area.x, area.y + 1, area.width, 1);
        let hints: &[(&str, &str)] = if state.modal.is_search() {
            &[("Enter", "done"), ("Esc", "clear")]
        } else if panel.is_renaming() {
            &[("Enter", "save"), ("Esc", "cancel")]
        } else {
            &[("?", "help"), ("/", "search"), ("p", "pin"), ("m", "move")]
        };
        help_bar(frame, hints_area, hints);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_keeps_end_of_query() {
        assert_eq!(tail_to_width("short", 10), "short");
        assert_eq!(tail_to_width("a long search query", 6), "…query");
    }
}
