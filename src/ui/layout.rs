//! Screen geometry shared by the renderer and pointer hit testing.

use ratatui::layout::{Margin, Position, Rect};

use crate::constants::{
    CHECKBOX_WIDTH, PANEL_FOOTER_HEIGHT, PANEL_HEADER_HEIGHT, PANEL_WIDTH, RAIL_WIDTH,
};
use crate::panel::PanelView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub rail: Option<Rect>,
    /// Bordered content panel
    pub panel: Option<Rect>,
    pub header: Option<Rect>,
    pub list: Option<Rect>,
    pub footer: Option<Rect>,
    /// Conversation view; the mobile drawer is drawn on top of it
    pub main: Rect,
}

/// What a pointer position lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Rail,
    /// List row at absolute index `row`
    Row {
        row: usize,
        checkbox: bool,
    },
    /// Content panel outside the list (header, footer, borders)
    Panel,
    Main,
}

pub fn screen_layout(area: Rect, view: PanelView) -> ScreenLayout {
    let rail = view
        .shows_icon_rail()
        .then(|| Rect::new(area.x, area.y, RAIL_WIDTH.min(area.width), area.height));
    let rail_width = rail.map_or(0, |r| r.width);
    let remaining = area.width - rail_width;

    let panel = view.shows_content().then(|| {
        Rect::new(
            area.x + rail_width,
            area.y,
            PANEL_WIDTH.min(remaining),
            area.height,
        )
    });

    let main = match (view, panel) {
        (PanelView::Drawer, _) | (_, None) => {
            Rect::new(area.x + rail_width, area.y, remaining, area.height)
        }
        (_, Some(p)) => Rect::new(p.right(), area.y, area.right() - p.right(), area.height),
    };

    let (header, list, footer) = match panel {
        Some(p) => {
            let (h, l, f) = split_panel(p);
            (Some(h), Some(l), Some(f))
        }
        None => (None, None, None),
    };

    ScreenLayout {
        rail,
        panel,
        header,
        list,
        footer,
        main,
    }
}

fn split_panel(panel: Rect) -> (Rect, Rect, Rect) {
    let inner = panel.inner(Margin::new(1, 1));
    let header_h = PANEL_HEADER_HEIGHT.min(inner.height);
    let footer_h = PANEL_FOOTER_HEIGHT.min(inner.height - header_h);
    let list_h = inner.height - header_h - footer_h;

    let header = Rect::new(inner.x, inner.y, inner.width, header_h);
    let list = Rect::new(inner.x, inner.y + header_h, inner.width, list_h);
    let footer = Rect::new(inner.x, list.bottom(), inner.width, footer_h);
    (header, list, footer)
}

/// Rows available to the list for a terminal `height` rows tall.
pub fn list_height(height: u16) -> u16 {
    height.saturating_sub(2 + PANEL_HEADER_HEIGHT + PANEL_FOOTER_HEIGHT)
}

/// Resolve a pointer position. `offset` is the list's first visible row.
pub fn hit_test(layout: &ScreenLayout, offset: usize, column: u16, row: u16) -> Hit {
    let pos = Position::new(column, row);

    // The drawer overlays the main area, so the panel is tested first
    if let Some(list) = layout.list
        && list.contains(pos)
    {
        return Hit::Row {
            row: offset + (row - list.y) as usize,
            checkbox: column < list.x + CHECKBOX_WIDTH,
        };
    }
    if layout.panel.is_some_and(|p| p.contains(pos)) {
        return Hit::Panel;
    }
    if layout.rail.is_some_and(|r| r.contains(pos)) {
        return Hit::Rail;
    }
    Hit::Main
}
