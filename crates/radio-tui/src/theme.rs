//! Color palette and style constants for santoplay.

use ratatui::style::{Color, Style};

use radio_core::playback::PlaybackStatus;

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(18, 18, 18);
pub const C_ACCENT: Color = Color::Rgb(255, 95, 95);
pub const C_PLAYING: Color = Color::Rgb(80, 200, 120);
pub const C_CONNECTING: Color = Color::Rgb(255, 184, 80);
pub const C_MUTED: Color = Color::Rgb(72, 72, 88);
pub const C_SECONDARY: Color = Color::Rgb(115, 115, 138);
pub const C_PRIMARY: Color = Color::Rgb(210, 210, 225);
pub const C_SELECTION_BG: Color = Color::Rgb(28, 28, 40);
pub const C_PANEL_BORDER: Color = Color::Rgb(40, 40, 52);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(120, 100, 200);
pub const C_NUMBER_HINT: Color = Color::Rgb(90, 90, 115);
pub const C_FILTER_BG: Color = Color::Rgb(20, 20, 32);
pub const C_FILTER_FG: Color = Color::Rgb(255, 200, 80);
pub const C_POPUP_BG: Color = Color::Rgb(18, 18, 26);
pub const C_TAG: Color = Color::Rgb(80, 140, 200);
pub const C_LOCATION: Color = Color::Rgb(100, 160, 130);
pub const C_TOAST_INFO: Color = Color::Rgb(80, 160, 220);
pub const C_TOAST_SUCCESS: Color = Color::Rgb(80, 200, 120);
pub const C_TOAST_WARNING: Color = Color::Rgb(255, 184, 80);
pub const C_TOAST_ERROR: Color = Color::Rgb(255, 95, 95);
pub const C_MODE_NORMAL: Color = Color::Rgb(115, 115, 138);
pub const C_MODE_INPUT: Color = Color::Rgb(255, 200, 80);
pub const C_MODE_DIALOG: Color = Color::Rgb(255, 95, 95);
pub const C_STARS: Color = Color::Rgb(255, 210, 50);

/// Badge and row color for a playback status.
pub fn status_color(status: &PlaybackStatus) -> Color {
    match status {
        PlaybackStatus::Playing => C_PLAYING,
        PlaybackStatus::Loading | PlaybackStatus::Paused => C_CONNECTING,
        PlaybackStatus::Error(_) => C_ACCENT,
        PlaybackStatus::Idle => C_MUTED,
    }
}

/// Row icon for the station that is currently loaded.
pub fn status_icon(status: &PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Playing => "▶",
        PlaybackStatus::Paused => "⏸",
        PlaybackStatus::Loading => "⋯",
        PlaybackStatus::Error(_) => "✗",
        PlaybackStatus::Idle => "■",
    }
}

// ── Pane borders ──────────────────────────────────────────────────────────────

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}
