//! HelpOverlay component: centered popup listing every key binding.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PANEL_BORDER, C_POPUP_BG, C_PRIMARY, C_SECONDARY},
};

pub struct HelpOverlay {
    pub visible: bool,
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }
}

impl Component for HelpOverlay {
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release || !self.visible {
            return vec![];
        }
        match key.code {
            KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => vec![Action::ToggleHelp],
            // Swallow everything else while open.
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleHelp = action {
            self.visible = !self.visible;
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, _state: &AppState) {
        if !self.visible {
            return;
        }

        let help_lines: Vec<Line> = vec![
            Line::from(Span::styled(
                " keyboard shortcuts",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            section(" playback"),
            help_row("enter", "play selected station"),
            help_row("space", "pause / resume"),
            help_row("s", "stop"),
            Line::from(""),
            section(" discover"),
            help_row("t", "play the top station for the tag"),
            help_row("r", "surprise me: random station"),
            help_row("R", "reload the discover list"),
            help_row("T", "list stations for the tag (search tab)"),
            Line::from(""),
            section(" search"),
            help_row("/  or  i", "type a station name"),
            help_row("enter / esc", "search / clear, then close"),
            Line::from(""),
            section(" library"),
            help_row("f", "toggle favorite"),
            help_row("a", "add to playlist"),
            help_row("X", "clear all favorites"),
            help_row("n", "new playlist"),
            help_row("D", "delete playlist"),
            help_row("F", "add all favorites to playlist"),
            help_row("x", "remove station from playlist"),
            Line::from(""),
            section(" navigation & ui"),
            help_row("1 / 2 / 3 / 4", "discover / search / favorites / playlists"),
            help_row("tab / shift-tab", "next / previous pane, then tab"),
            help_row("← / →  or  h / l", "previous / next pane"),
            help_row("↑ / ↓  or  j / k", "move selection"),
            help_row("home / end  or  g / G", "jump first / last"),
            help_row("y / Y", "copy stream url / homepage"),
            help_row("K / L", "toggle keys bar / log panel"),
            help_row("?", "toggle this help overlay"),
            help_row("q / Ctrl+C", "quit"),
            Line::from(""),
            Line::from(Span::styled(
                " press ? or esc to close",
                Style::default().fg(C_MUTED),
            )),
        ];

        let popup = centered_rect(64, (help_lines.len() as u16 + 2).min(area.height), area);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(help_lines)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(C_PANEL_BORDER))
                        .style(Style::default().bg(C_POPUP_BG)),
                )
                .wrap(Wrap { trim: false }),
            popup,
        );
    }
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        title,
        Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD),
    ))
}

fn help_row<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("{:<22}", key),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(desc, Style::default().fg(C_SECONDARY)),
    ])
}

pub(crate) fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;
    use std::path::PathBuf;

    #[test]
    fn closes_only_on_its_own_keys() {
        let state = AppState::new("gospel".into(), PathBuf::new());
        let mut help = HelpOverlay::new();
        help.on_action(&Action::ToggleHelp, &state);
        assert!(help.visible);
        let swallowed = help.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE), &state);
        assert!(swallowed.is_empty());
        let close = help.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), &state);
        assert!(matches!(&close[..], [Action::ToggleHelp]));
    }

    #[test]
    fn centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(50, 10, area);
        assert_eq!(popup.height, 10);
        assert!(popup.x >= 20 && popup.right() <= 80);
    }
}
