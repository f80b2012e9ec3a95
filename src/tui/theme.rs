//! Centralized theme module for TUI colors and styles

use ratatui::prelude::*;

/// Background luma above which the light palette is used
const LIGHT_LUMA_THRESHOLD: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Position delta colors
    pub gain: Color,
    pub loss: Color,
    pub level: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub pick_color: Color,

    // Styles
    pub header_style: Style,
    pub row_selected: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,
    pub best_color: Color,

    // Tab colors
    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    // Pane borders
    pub focus_border: Color,
    pub divider_color: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,
    pub warning: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
    pub popup_bg: Color,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            gain: Color::Green,
            loss: Color::Red,
            level: Color::DarkGray,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            pick_color: Color::Magenta,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            best_color: Color::Yellow,
            tab_active_style: Style::new().fg(Color::Cyan).bold(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            focus_border: Color::Cyan,
            divider_color: Color::Indexed(238),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            warning: Color::Yellow,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            popup_bg: Color::Indexed(234),
        }
    }

    pub fn light() -> Self {
        Self {
            gain: Color::Indexed(28),
            loss: Color::Indexed(160),
            level: Color::Indexed(244),
            row_alt_bg: Color::Indexed(254),
            index_color: Color::Indexed(244),
            pick_color: Color::Indexed(127),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Indexed(240),
            title_color: Color::Blue,
            best_color: Color::Indexed(130),
            tab_active_style: Style::new().fg(Color::Blue).bold(),
            tab_inactive_style: Style::new().fg(Color::Indexed(246)),
            focus_border: Color::Blue,
            divider_color: Color::Indexed(250),
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Blue,
            flash_success: Color::Indexed(28),
            flash_error: Color::Indexed(160),
            warning: Color::Indexed(130),
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
            popup_bg: Color::Indexed(255),
        }
    }

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    /// Color for a position delta: gains, losses and unchanged positions
    pub fn delta_color(&self, delta: i32) -> Color {
        match delta.signum() {
            1 => self.gain,
            -1 => self.loss,
            _ => self.level,
        }
    }
}

pub fn theme_for_luma(luma: Option<f32>) -> Theme {
    match luma {
        Some(l) if l > LIGHT_LUMA_THRESHOLD => Theme::Light,
        _ => Theme::Dark,
    }
}

/// Detect the terminal background. Must run before raw mode is entered.
/// Falls back to dark when the terminal does not answer.
pub fn resolve_theme() -> Theme {
    theme_for_luma(terminal_light::luma().ok())
}
