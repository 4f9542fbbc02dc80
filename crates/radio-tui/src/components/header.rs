//! Header component: 2-row top bar.
//!
//! Row 1: now-playing station, its meta line, status badge and status text.
//! Row 2: tab bar (clickable).
//!
//! Not focusable; draws to a 2-row area.

use ratatui::crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use radio_core::playback::PlaybackStatus;
use radio_core::text::sanitize;

use crate::{
    action::{Action, Tab},
    app_state::AppState,
    component::Component,
    player::PlayerSnapshot,
    theme::{
        status_color, status_icon, C_BG, C_CONNECTING, C_LOCATION, C_MUTED, C_NUMBER_HINT,
        C_PANEL_BORDER_FOCUSED, C_PRIMARY, C_SECONDARY,
    },
};

pub struct Header {
    /// Column span of each tab label at the last draw.
    tab_hits: Vec<(u16, u16, Tab)>,
}

impl Header {
    pub fn new() -> Self {
        Self {
            tab_hits: Vec::new(),
        }
    }

    pub fn tab_at(&self, column: u16) -> Option<Tab> {
        self.tab_hits
            .iter()
            .find(|(start, end, _)| (*start..*end).contains(&column))
            .map(|(_, _, tab)| *tab)
    }
}

impl Component for Header {
    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        if event.kind != MouseEventKind::Down(MouseButton::Left) || event.row != area.y + 1 {
            return vec![];
        }
        self.tab_at(event.column)
            .map(|tab| vec![Action::SwitchTab(tab)])
            .unwrap_or_default()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, _focused: bool, state: &AppState) {
        frame.render_widget(Clear, area);
        if area.height < 2 {
            frame.render_widget(Paragraph::new(now_playing_line(&state.player)), area);
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);

        frame.render_widget(Paragraph::new(now_playing_line(&state.player)), rows[0]);

        let (line, hits) = tab_bar(state.tab, rows[1].x);
        self.tab_hits = hits;
        frame.render_widget(Paragraph::new(line), rows[1]);
    }
}

// ── Row 1: now playing ───────────────────────────────────────────────────────

fn now_playing_line(player: &PlayerSnapshot) -> Line<'static> {
    let Some(station) = player.current.as_ref() else {
        return idle_line(&player.status_text);
    };

    let color = status_color(&player.status);
    let mut spans: Vec<Span<'static>> = vec![
        Span::raw(" "),
        Span::styled(status_icon(&player.status), Style::default().fg(color)),
        Span::raw(" "),
        Span::styled("📻 ", Style::default().fg(C_MUTED)),
        Span::styled(
            sanitize(station.display_name()).into_owned(),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            sanitize(&station.meta_line()).into_owned(),
            Style::default().fg(C_LOCATION),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", player.status.label()),
            Style::default()
                .fg(C_BG)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    if let PlaybackStatus::Error(_) | PlaybackStatus::Loading = player.status {
        spans.push(Span::styled(
            format!("  {}", sanitize(&player.status_text)),
            Style::default().fg(color),
        ));
    }
    if player.awaiting_gesture {
        spans.push(Span::styled(
            "  press space to start",
            Style::default().fg(C_CONNECTING),
        ));
    }
    Line::from(spans)
}

fn idle_line(status_text: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw(" "),
        Span::styled(
            format!("■  {}", sanitize(status_text)),
            Style::default().fg(C_MUTED),
        ),
    ])
}

// ── Row 2: tabs ──────────────────────────────────────────────────────────────

fn tab_bar(active: Tab, x: u16) -> (Line<'static>, Vec<(u16, u16, Tab)>) {
    let mut spans: Vec<Span<'static>> = vec![Span::raw(" ")];
    let mut hits = Vec::with_capacity(Tab::ALL.len());
    let mut col = x + 1;
    for tab in Tab::ALL {
        let number = format!("{} ", tab.index() + 1);
        let label = tab.label().to_string();
        let width = (number.width() + label.width()) as u16;
        hits.push((col, col + width, tab));
        col += width + 3;

        let label_style = if tab == active {
            Style::default()
                .fg(C_PANEL_BORDER_FOCUSED)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(C_SECONDARY)
        };
        spans.push(Span::styled(number, Style::default().fg(C_NUMBER_HINT)));
        spans.push(Span::styled(label, label_style));
        spans.push(Span::raw("   "));
    }
    spans.push(Span::styled("? help", Style::default().fg(C_MUTED)));
    (Line::from(spans), hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_core::station::Station;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn tab_hits_cover_each_label() {
        let (_, hits) = tab_bar(Tab::Search, 0);
        let header = Header { tab_hits: hits };
        assert_eq!(header.tab_at(1), Some(Tab::Discover));
        assert_eq!(header.tab_at(0), None);
        let (start, _, _) = header.tab_hits[3];
        assert_eq!(header.tab_at(start), Some(Tab::Playlists));
    }

    #[test]
    fn now_playing_shows_name_and_badge() {
        let snapshot = PlayerSnapshot {
            current: Some(Station {
                stationuuid: "A".into(),
                name: "Rádio Canção Nova".into(),
                country: "Brazil".into(),
                ..Station::default()
            }),
            status: PlaybackStatus::Playing,
            status_text: "Playing".into(),
            awaiting_gesture: false,
        };
        let line = text(&now_playing_line(&snapshot));
        assert!(line.contains("Rádio Canção Nova"));
        assert!(line.contains(PlaybackStatus::Playing.label()));

        let idle = text(&now_playing_line(&PlayerSnapshot::default()));
        assert!(idle.starts_with(" ■"));
    }
}
