//! StationList component: one list of stations, used by every tab.
//!
//! The `ListKind` decides where the rows come from and which extra keys the
//! list answers to.

use std::time::Instant;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use radio_core::station::Station;
use radio_core::text::sanitize;

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, RegionState},
    component::Component,
    theme::{
        status_color, status_icon, C_ACCENT, C_CONNECTING, C_LOCATION, C_MUTED, C_PRIMARY,
        C_SECONDARY, C_SELECTION_BG, C_STARS, C_TAG,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Discover,
    Search,
    Favorites,
    PlaylistItems,
}

impl ListKind {
    fn source(self, state: &AppState) -> &[Station] {
        match self {
            Self::Discover => &state.discover.stations,
            Self::Search => &state.search.stations,
            Self::Favorites => &state.favorites,
            Self::PlaylistItems => state
                .current_playlist()
                .map(|p| p.items.as_slice())
                .unwrap_or(&[]),
        }
    }

    fn region(self, state: &AppState) -> Option<&RegionState> {
        match self {
            Self::Discover => Some(&state.discover),
            Self::Search => Some(&state.search),
            Self::Favorites | Self::PlaylistItems => None,
        }
    }

    fn empty_hint(self, state: &AppState) -> String {
        match self {
            Self::Discover => format!("no {} stations right now. R to reload", state.discover_tag),
            Self::Search => "no results yet. / to type a name, T to list by tag".to_string(),
            Self::Favorites => {
                "no favorites yet. press f on any station to keep it here".to_string()
            }
            Self::PlaylistItems => match state.current_playlist() {
                Some(_) => "this playlist is empty. a adds a station, F adds all favorites"
                    .to_string(),
                None => "create a playlist with n".to_string(),
            },
        }
    }
}

pub struct StationList {
    kind: ListKind,
    pub list: ScrollableList<Station>,
    list_state: ListState,
    /// Track last click (row index, time) for double-click detection.
    last_click: Option<(usize, Instant)>,
}

impl StationList {
    pub fn new(kind: ListKind) -> Self {
        Self {
            kind,
            list: ScrollableList::new(),
            list_state: ListState::default(),
            last_click: None,
        }
    }

    /// Pull rows from `state`, keeping the selected station selected.
    pub fn sync(&mut self, state: &AppState) {
        let source = self.kind.source(state);
        let unchanged = source.len() == self.list.len()
            && source
                .iter()
                .zip(self.list.items.iter())
                .all(|(a, b)| a.id() == b.id());
        if !unchanged {
            self.list
                .set_items_keeping(source.to_vec(), |a, b| a.id() == b.id());
        }
    }

    fn title(&self, state: &AppState) -> String {
        match self.kind {
            ListKind::Discover => format!("top {} stations", sanitize(&state.discover_tag)),
            ListKind::Search => "results".to_string(),
            ListKind::Favorites => "favorites".to_string(),
            ListKind::PlaylistItems => match state.current_playlist() {
                Some(p) => sanitize(&p.name).into_owned(),
                None => "playlist".to_string(),
            },
        }
    }

    fn hint_key(&self) -> Option<char> {
        match self.kind {
            ListKind::Discover => Some('1'),
            ListKind::Search => Some('2'),
            ListKind::Favorites => Some('3'),
            ListKind::PlaylistItems => None,
        }
    }

    fn render_item<'a>(&self, station: &'a Station, is_selected: bool, state: &AppState) -> ListItem<'a> {
        let is_current = state.is_current(station.id());
        let status = &state.player.status;

        let (icon, icon_color) = if is_current {
            (status_icon(status), status_color(status))
        } else {
            (" ", C_MUTED)
        };

        let name_color = if is_current {
            status_color(status)
        } else if is_selected {
            C_PRIMARY
        } else {
            C_SECONDARY
        };
        let name_style = if is_current || is_selected {
            Style::default().fg(name_color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(name_color)
        };

        let fav = if state.is_favorite(station.id()) { "♥ " } else { "  " };

        let mut spans: Vec<Span> = vec![
            Span::styled(fav, Style::default().fg(C_STARS)),
            Span::styled(icon, Style::default().fg(icon_color)),
            Span::raw("  "),
            Span::styled(sanitize(station.display_name()).into_owned(), name_style),
            Span::raw("  "),
            Span::styled(
                sanitize(&station.meta_line()).into_owned(),
                Style::default().fg(C_LOCATION),
            ),
        ];

        let tags = station.tag_list();
        if !tags.is_empty() {
            spans.push(Span::raw("  "));
            for (i, tag) in tags.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled(" · ", Style::default().fg(C_MUTED)));
                }
                spans.push(Span::styled(
                    sanitize(tag).into_owned(),
                    Style::default().fg(C_TAG),
                ));
            }
        }
        if !station.is_playable() {
            spans.push(Span::styled("  no stream", Style::default().fg(C_ACCENT)));
        }

        let bg = if is_selected {
            Style::default().bg(C_SELECTION_BG)
        } else {
            Style::default()
        };
        ListItem::new(Line::from(spans)).style(bg)
    }

    /// Keys only some kinds answer to.
    fn handle_kind_key(&self, key: KeyEvent, state: &AppState) -> Option<Vec<Action>> {
        let selected = self.list.selected_item();
        let actions = match (self.kind, key.code) {
            (ListKind::Discover, KeyCode::Char('t')) => vec![Action::PlayTop],
            (ListKind::Discover, KeyCode::Char('r')) => vec![Action::SurpriseMe],
            (ListKind::Discover, KeyCode::Char('R')) => vec![Action::LoadDiscover],
            (ListKind::Search, KeyCode::Char('/')) => {
                vec![Action::FocusPane(ComponentId::SearchBar), Action::OpenInput]
            }
            (ListKind::Search, KeyCode::Char('T')) => vec![Action::ListTag],
            (ListKind::Favorites, KeyCode::Char('X')) => vec![Action::ClearFavorites],
            (ListKind::PlaylistItems, KeyCode::Char('x')) => match selected {
                Some(st) => vec![Action::RemoveFromPlaylist(
                    state.selected_playlist,
                    st.id().to_string(),
                )],
                None => vec![],
            },
            (ListKind::PlaylistItems, KeyCode::Char('F')) if state.current_playlist().is_some() => {
                vec![Action::AddAllFavorites(state.selected_playlist)]
            }
            _ => return None,
        };
        Some(actions)
    }
}

impl Component for StationList {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        self.sync(state);
        if let Some(actions) = self.handle_kind_key(key, state) {
            return actions;
        }

        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            5
        } else {
            1
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(step),
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),

            KeyCode::Enter => {
                if let Some(st) = self.list.selected_item() {
                    return vec![Action::Play(st.clone())];
                }
            }
            KeyCode::Char('f') => {
                if let Some(st) = self.list.selected_item() {
                    return vec![Action::ToggleFavorite(st.clone())];
                }
            }
            KeyCode::Char('a') => {
                if let Some(st) = self.list.selected_item() {
                    return vec![Action::AddToPlaylist(st.clone())];
                }
            }
            KeyCode::Char('y') => {
                if let Some(url) = self.list.selected_item().and_then(Station::stream_url) {
                    return vec![Action::CopyToClipboard(url.to_string())];
                }
            }
            KeyCode::Char('Y') => {
                return match self.list.selected_item() {
                    Some(st) => match st.homepage_url() {
                        Some(url) => vec![Action::CopyToClipboard(url.to_string())],
                        None => vec![Action::Notify("this station has no homepage".into())],
                    },
                    None => vec![],
                };
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        self.sync(state);
        let header_rows = 1 + u16::from(self.kind.region(state).is_some_and(|r| r.caption.is_some()));
        let rel_row = event.row.saturating_sub(area.y + header_rows) as usize;
        match event.kind {
            MouseEventKind::ScrollUp => self.list.select_up(1),
            MouseEventKind::ScrollDown => self.list.select_down(1),
            MouseEventKind::Down(MouseButton::Left) => {
                let now = Instant::now();
                let is_double = self
                    .last_click
                    .map(|(row, t)| row == rel_row && t.elapsed().as_millis() < 400)
                    .unwrap_or(false);
                if self.list.handle_click(rel_row) && is_double {
                    self.last_click = None;
                    if let Some(st) = self.list.selected_item() {
                        return vec![Action::Play(st.clone())];
                    }
                } else {
                    self.last_click = Some((rel_row, now));
                }
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        if let (ListKind::PlaylistItems, Action::SelectPlaylist(_)) = (self.kind, action) {
            self.list.select_first();
        }
        self.sync(state);
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        self.sync(state);
        let region = self.kind.region(state);
        let loading = region.is_some_and(|r| r.loading);
        let count = self.list.len().to_string();
        let badge = if loading {
            Badge {
                text: "LOADING",
                color: C_CONNECTING,
            }
        } else {
            Badge {
                text: &count,
                color: C_MUTED,
            }
        };

        let title = self.title(state);
        let block = pane_chrome(&title, self.hint_key(), focused, Some(badge));
        let mut inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(error) = region.and_then(|r| r.error.as_deref()) {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("  {}", sanitize(error)),
                    Style::default().fg(C_ACCENT),
                ))
                .wrap(Wrap { trim: false }),
                inner,
            );
            return;
        }

        if let Some(caption) = region.and_then(|r| r.caption.as_deref()) {
            if inner.height > 1 {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        format!("  {}", sanitize(caption)),
                        Style::default().fg(C_SECONDARY),
                    )),
                    Rect { height: 1, ..inner },
                );
                inner.y += 1;
                inner.height -= 1;
            }
        }

        if self.list.is_empty() {
            let msg = if loading {
                "  loading…".to_string()
            } else {
                format!("  {}", self.kind.empty_hint(state))
            };
            frame.render_widget(
                Paragraph::new(Span::styled(msg, Style::default().fg(C_MUTED)))
                    .wrap(Wrap { trim: false }),
                inner,
            );
            return;
        }

        let content_h = inner.height as usize;
        self.list.ensure_visible(content_h);
        let sel_in_view = self.list.selected_in_view(content_h);
        let items: Vec<ListItem> = self
            .list
            .visible_items(content_h)
            .into_iter()
            .enumerate()
            .map(|(view_row, (_, station))| {
                self.render_item(station, focused && view_row == sel_in_view, state)
            })
            .collect();

        self.list_state.select(Some(sel_in_view));
        frame.render_stateful_widget(List::new(items), inner, &mut self.list_state);
    }
}
