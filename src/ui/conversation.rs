//! Main area: details of the current conversation.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::theme::Theme;
use super::widgets::{format_date, sanitize_text};
use crate::app::state::AppState;
use crate::conversation::{Conversation, department_display_name};

pub fn render_conversation(frame: &mut Frame, area: Rect, state: &AppState) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let Some(conversation) = state.panel.current() else {
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No conversation selected", Theme::text_muted())),
            Line::from(Span::styled(
                "Hover the rail or press p to open the panel",
                Theme::text_muted(),
            )),
        ])
        .alignment(ratatui::layout::Alignment::Center)
        .style(Theme::main_bg());
        frame.render_widget(hint, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Headers
            Constraint::Min(0),    // Summary
        ])
        .split(area);

    render_headers(frame, chunks[0], state, conversation);

    let summary = conversation
        .summary
        .as_deref()
        .map(sanitize_text)
        .unwrap_or_else(|| "No messages yet.".to_string());
    let body = Paragraph::new(summary)
        .style(Theme::text_secondary())
        .wrap(Wrap { trim: false })
        .block(Block::default().style(Theme::main_bg()));
    frame.render_widget(body, chunks[1].inner(ratatui::layout::Margin::new(1, 1)));
}

fn render_headers(frame: &mut Frame, area: Rect, state: &AppState, conversation: &Conversation) {
    let department =
        department_display_name(conversation.group_key(), state.panel.departments());
    let mut status = format!(
        "{} · {} messages · updated {}",
        department,
        conversation.message_count,
        format_date(conversation.updated_at, &state.date_format)
    );
    if conversation.archived {
        status.push_str(" · archived");
    }

    let lines = vec![
        Line::from(Span::styled(
            sanitize_text(&conversation.title),
            Theme::title(),
        )),
        Line::from(Span::styled(status, Theme::text_muted())),
        Line::from(Span::styled(
            format!(
                "started {}",
                format_date(conversation.created_at, &state.date_format)
            ),
            Theme::text_muted(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Theme::border())
        .style(Theme::main_bg());
    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area.inner(ratatui::layout::Margin::new(1, 0)));
}
