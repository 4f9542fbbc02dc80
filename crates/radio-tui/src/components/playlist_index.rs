//! PlaylistIndex component: left pane of the Playlists tab.
//!
//! The selected playlist lives in `AppState`; moving the cursor emits
//! `SelectPlaylist` so the items pane follows.

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use radio_core::text::sanitize;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    widgets::pane_chrome::{pane_chrome, Badge},
};

pub struct PlaylistIndex {
    list_state: ListState,
}

impl PlaylistIndex {
    pub fn new() -> Self {
        Self {
            list_state: ListState::default(),
        }
    }

    fn select(&self, idx: usize, state: &AppState) -> Vec<Action> {
        if idx < state.playlists.len() && idx != state.selected_playlist {
            vec![Action::SelectPlaylist(idx)]
        } else {
            vec![]
        }
    }
}

impl Component for PlaylistIndex {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let current = state.selected_playlist;
        let last = state.playlists.len().saturating_sub(1);
        let has_selection = !state.playlists.is_empty();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select(current.saturating_sub(1), state),
            KeyCode::Down | KeyCode::Char('j') => self.select((current + 1).min(last), state),
            KeyCode::Home | KeyCode::Char('g') => self.select(0, state),
            KeyCode::End | KeyCode::Char('G') => self.select(last, state),
            KeyCode::Enter if has_selection => {
                vec![Action::FocusPane(ComponentId::PlaylistItems)]
            }
            KeyCode::Char('n') => vec![Action::NewPlaylist],
            KeyCode::Char('D') if has_selection => vec![Action::DeletePlaylist(current)],
            KeyCode::Char('F') if has_selection => vec![Action::AddAllFavorites(current)],
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let row = event.row.saturating_sub(area.y + 1) as usize;
                self.select(self.list_state.offset() + row, state)
            }
            MouseEventKind::ScrollUp => self.select(state.selected_playlist.saturating_sub(1), state),
            MouseEventKind::ScrollDown => self.select(
                (state.selected_playlist + 1).min(state.playlists.len().saturating_sub(1)),
                state,
            ),
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let count = state.playlists.len().to_string();
        let block = pane_chrome(
            "playlists",
            Some('4'),
            focused,
            Some(Badge {
                text: &count,
                color: C_MUTED,
            }),
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if state.playlists.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  no playlists yet. press n to create one",
                    Style::default().fg(C_MUTED),
                ))
                .wrap(Wrap { trim: false }),
                inner,
            );
            return;
        }

        let items: Vec<ListItem> = state
            .playlists
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let selected = i == state.selected_playlist;
                let name_style = if selected {
                    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(C_SECONDARY)
                };
                let line = Line::from(vec![
                    Span::raw(" "),
                    Span::styled(sanitize(&p.name).into_owned(), name_style),
                    Span::styled(
                        format!("  {} stations", p.items.len()),
                        Style::default().fg(C_MUTED),
                    ),
                ]);
                let bg = if selected {
                    Style::default().bg(C_SELECTION_BG)
                } else {
                    Style::default()
                };
                ListItem::new(line).style(bg)
            })
            .collect();

        self.list_state.select(Some(state.selected_playlist));
        frame.render_stateful_widget(List::new(items), inner, &mut self.list_state);
    }
}
