//! Centralized theming for the chatrail TUI
//!
//! Single source of truth for every color and style the panel uses.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;
use std::sync::RwLock;

use crate::config::ThemeVariant;

static THEME_VARIANT: RwLock<ThemeVariant> = RwLock::new(ThemeVariant::Dark);

/// Initialize the theme variant (call once at startup)
pub fn init_theme(variant: ThemeVariant) {
    if let Ok(mut guard) = THEME_VARIANT.write() {
        *guard = variant;
    }
}

pub fn current_theme() -> ThemeVariant {
    THEME_VARIANT.read().map(|g| *g).unwrap_or_default()
}

/// Catppuccin Mocha palette used by the dark theme
mod catppuccin {
    use super::Color;

    pub const BASE: Color = Color::Rgb(30, 30, 46); // #1e1e2e
    pub const MANTLE: Color = Color::Rgb(24, 24, 37); // #181825
    pub const SURFACE0: Color = Color::Rgb(49, 50, 68); // #313244
    pub const SURFACE1: Color = Color::Rgb(69, 71, 90); // #45475a
    pub const TEXT: Color = Color::Rgb(205, 214, 244); // #cdd6f4
    pub const SUBTEXT1: Color = Color::Rgb(186, 194, 222); // #bac2de
    pub const OVERLAY0: Color = Color::Rgb(108, 112, 134); // #6c7086
    pub const LAVENDER: Color = Color::Rgb(180, 190, 254); // #b4befe
    pub const BLUE: Color = Color::Rgb(137, 180, 250); // #89b4fa
    pub const GREEN: Color = Color::Rgb(166, 227, 161); // #a6e3a1
    pub const YELLOW: Color = Color::Rgb(249, 226, 175); // #f9e2af
    pub const PEACH: Color = Color::Rgb(250, 179, 135); // #fab387
    pub const RED: Color = Color::Rgb(243, 139, 168); // #f38ba8
    pub const MAUVE: Color = Color::Rgb(203, 166, 247); // #cba6f7
}

pub mod borders {
    use super::*;

    pub fn popup() -> BorderType {
        match current_theme() {
            ThemeVariant::Dark => BorderType::Rounded,
            ThemeVariant::HighContrast => BorderType::Double,
        }
    }

    /// Border type for the content panel (always plain)
    pub fn panel() -> BorderType {
        BorderType::Plain
    }
}

/// Color palette - colors that vary by theme
pub mod colors {
    use super::*;

    pub fn bg_main() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::BASE,
            ThemeVariant::HighContrast => Color::Reset,
        }
    }

    pub fn bg_rail() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::MANTLE,
            ThemeVariant::HighContrast => Color::Black,
        }
    }

    pub fn bg_selection() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::SURFACE1,
            ThemeVariant::HighContrast => Color::Blue,
        }
    }

    pub fn bg_drop_target() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::SURFACE0,
            ThemeVariant::HighContrast => Color::Magenta,
        }
    }

    pub fn bg_error() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::RED,
            ThemeVariant::HighContrast => Color::Red,
        }
    }

    pub fn bg_success() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::GREEN,
            ThemeVariant::HighContrast => Color::Green,
        }
    }

    pub fn fg_primary() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::TEXT,
            ThemeVariant::HighContrast => Color::White,
        }
    }

    pub fn fg_secondary() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::SUBTEXT1,
            ThemeVariant::HighContrast => Color::White,
        }
    }

    pub fn fg_muted() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::OVERLAY0,
            ThemeVariant::HighContrast => Color::Gray,
        }
    }

    pub fn fg_accent() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::BLUE,
            ThemeVariant::HighContrast => Color::Cyan,
        }
    }

    pub fn fg_warning() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::YELLOW,
            ThemeVariant::HighContrast => Color::Yellow,
        }
    }

    pub fn fg_dark() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::BASE,
            ThemeVariant::HighContrast => Color::Black,
        }
    }

    pub fn group_header() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::PEACH,
            ThemeVariant::HighContrast => Color::Yellow,
        }
    }

    pub fn checkbox() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::MAUVE,
            ThemeVariant::HighContrast => Color::Magenta,
        }
    }

    pub fn border() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::SURFACE1,
            ThemeVariant::HighContrast => Color::Gray,
        }
    }

    pub fn border_focused() -> Color {
        match current_theme() {
            ThemeVariant::Dark => catppuccin::LAVENDER,
            ThemeVariant::HighContrast => Color::White,
        }
    }
}

pub struct Theme;

impl Theme {
    // === Text Styles ===

    pub fn text() -> Style {
        Style::default()
            .fg(colors::fg_primary())
            .bg(colors::bg_main())
    }

    pub fn text_secondary() -> Style {
        Style::default()
            .fg(colors::fg_secondary())
            .bg(colors::bg_main())
    }

    pub fn text_muted() -> Style {
        Style::default()
            .fg(colors::fg_muted())
            .bg(colors::bg_main())
    }

    pub fn text_accent() -> Style {
        Style::default()
            .fg(colors::fg_accent())
            .bg(colors::bg_main())
            .add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Self::text().add_modifier(Modifier::BOLD)
    }

    // === Panel ===

    pub fn rail() -> Style {
        Style::default()
            .bg(colors::bg_rail())
            .fg(colors::fg_secondary())
    }

    pub fn rail_icon_active() -> Style {
        Self::rail().fg(colors::fg_accent()).add_modifier(Modifier::BOLD)
    }

    pub fn group_header() -> Style {
        Style::default()
            .fg(colors::group_header())
            .bg(colors::bg_main())
            .add_modifier(Modifier::BOLD)
    }

    pub fn drop_target() -> Style {
        Style::default()
            .fg(colors::fg_warning())
            .bg(colors::bg_drop_target())
            .add_modifier(Modifier::BOLD)
    }

    pub fn dragging() -> Style {
        Self::text_muted().add_modifier(Modifier::ITALIC)
    }

    pub fn checkbox() -> Style {
        Style::default()
            .fg(colors::checkbox())
            .bg(colors::bg_main())
    }

    pub fn current_marker() -> Style {
        Style::default()
            .fg(colors::fg_accent())
            .bg(colors::bg_main())
    }

    pub fn input_highlight() -> Style {
        Style::default()
            .fg(colors::fg_warning())
            .bg(colors::bg_main())
    }

    // === Notifications ===

    pub fn toast_success() -> Style {
        Style::default()
            .bg(colors::bg_success())
            .fg(colors::fg_dark())
    }

    pub fn toast_error() -> Style {
        Style::default()
            .bg(colors::bg_error())
            .fg(colors::fg_dark())
            .add_modifier(Modifier::BOLD)
    }

    pub fn toast_info() -> Style {
        Style::default()
            .bg(colors::bg_rail())
            .fg(colors::fg_secondary())
    }

    // === Help Bar ===

    pub fn help_key() -> Style {
        Style::default()
            .bg(colors::bg_main())
            .fg(colors::fg_warning())
    }

    pub fn help_desc() -> Style {
        Style::default()
            .bg(colors::bg_main())
            .fg(colors::fg_muted())
    }

    // === Borders ===

    pub fn border() -> Style {
        Style::default().fg(colors::border()).bg(colors::bg_main())
    }

    pub fn border_focused() -> Style {
        Style::default()
            .fg(colors::border_focused())
            .bg(colors::bg_main())
    }

    pub fn main_bg() -> Style {
        Style::default().bg(colors::bg_main())
    }
}

/// Merge a style with selection or main background so the highlight
/// covers the entire row.
pub fn with_selection_bg(style: Style, selected: bool) -> Style {
    if selected {
        style.bg(colors::bg_selection())
    } else {
        style.bg(colors::bg_main())
    }
}
