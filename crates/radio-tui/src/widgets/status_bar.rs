//! Status bar: bottom line with the input mode and the keys for the current tab.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Tab;
use crate::theme::{C_MODE_DIALOG, C_MODE_INPUT, C_MODE_NORMAL, C_MUTED};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    /// A text input has the keyboard.
    Input,
    /// A modal dialog has the keyboard.
    Dialog,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Input => "INPUT",
            Self::Dialog => "DIALOG",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Input => C_MODE_INPUT,
            Self::Dialog => C_MODE_DIALOG,
        }
    }
}

/// Key hints for `mode` on `tab`.
pub fn key_hints(mode: InputMode, tab: Tab) -> &'static str {
    match mode {
        InputMode::Input => " type text  Enter submit  Esc clear/leave  Tab next pane",
        InputMode::Dialog => " ↑↓ choose  1-9 pick  Enter confirm  Esc cancel",
        InputMode::Normal => match tab {
            Tab::Discover => {
                " ↑↓ select  Enter play  f fav  a add  t top  r surprise  R reload  Space pause  s stop  1-4 tabs  ? help  q quit"
            }
            Tab::Search => {
                " / type  Enter play  f fav  a add  T tag list  Space pause  s stop  Tab next pane  1-4 tabs  ? help  q quit"
            }
            Tab::Favorites => {
                " ↑↓ select  Enter play  f remove  a add  X clear  Space pause  s stop  1-4 tabs  ? help  q quit"
            }
            Tab::Playlists => {
                " n new  D delete  F add favorites  x remove  Enter play  Tab next pane  Space pause  1-4 tabs  ? help  q quit"
            }
        },
    }
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, tab: Tab) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default().fg(mode.color()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(key_hints(mode, tab), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tab_advertises_quit_and_help() {
        for tab in Tab::ALL {
            let hints = key_hints(InputMode::Normal, tab);
            assert!(hints.contains("q quit"), "{:?}", tab);
            assert!(hints.contains("? help"), "{:?}", tab);
        }
        assert!(key_hints(InputMode::Dialog, Tab::Search).contains("Esc cancel"));
    }
}
