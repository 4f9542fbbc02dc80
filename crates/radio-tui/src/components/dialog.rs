//! Modal dialogs: pick one of a list, confirm a destructive action, or type
//! a name.  While a dialog is open it receives every key.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use radio_core::station::Station;
use radio_core::text::sanitize;

use crate::{
    action::Action,
    components::help_overlay::centered_rect,
    theme::{C_MUTED, C_PANEL_BORDER_FOCUSED, C_POPUP_BG, C_PRIMARY, C_SECONDARY, C_SELECTION_BG},
    widgets::text_input::{InputAction, TextInput},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Chosen(usize),
    Cancelled,
}

/// A numbered list of options.  Only ever resolves to an index that exists.
pub struct SelectDialog {
    title: String,
    options: Vec<String>,
    selected: usize,
}

impl SelectDialog {
    pub fn new(title: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            title: title.into(),
            options,
            selected: 0,
        }
    }

    /// Validate a 1-based choice as typed by the user.
    pub fn choose(&self, number: usize) -> Option<Selection> {
        (1..=self.options.len())
            .contains(&number)
            .then(|| Selection::Chosen(number - 1))
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Selection> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Selection::Cancelled),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = (self.selected + 1).min(self.options.len().saturating_sub(1));
                None
            }
            KeyCode::Enter if !self.options.is_empty() => Some(Selection::Chosen(self.selected)),
            KeyCode::Char(c) => c
                .to_digit(10)
                .and_then(|n| self.choose(n as usize)),
            _ => None,
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let height = (self.options.len() as u16 + 4).min(area.height);
        let popup = centered_rect(50, height, area);
        let mut lines: Vec<Line> = Vec::with_capacity(self.options.len() + 2);
        for (i, option) in self.options.iter().enumerate() {
            let selected = i == self.selected;
            let style = if selected {
                Style::default()
                    .fg(C_PRIMARY)
                    .bg(C_SELECTION_BG)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(C_SECONDARY)
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {:>2}. ", i + 1), Style::default().fg(C_MUTED)),
                Span::styled(sanitize(option).into_owned(), style),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Enter choose · 1-9 pick · Esc cancel",
            Style::default().fg(C_MUTED),
        )));
        draw_popup(frame, popup, &self.title, lines);
    }
}

pub struct ConfirmDialog {
    message: String,
}

impl ConfirmDialog {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// `Some(true)` to go ahead, `Some(false)` to back out.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<bool> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(true),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Char('q') => {
                Some(false)
            }
            _ => None,
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(50, 6.min(area.height), area);
        let lines = vec![
            Line::from(Span::styled(
                format!(" {}", sanitize(&self.message)),
                Style::default().fg(C_PRIMARY),
            )),
            Line::from(""),
            Line::from(Span::styled(
                " y / Enter confirm · n / Esc cancel",
                Style::default().fg(C_MUTED),
            )),
        ];
        draw_popup(frame, popup, "confirm", lines);
    }
}

pub struct PromptDialog {
    title: String,
    input: TextInput,
}

impl PromptDialog {
    pub fn new(title: impl Into<String>, placeholder: &str) -> Self {
        let mut input = TextInput::new("›", placeholder);
        input.activate();
        Self {
            title: title.into(),
            input,
        }
    }

    /// `Some(Some(text))` on submit, `Some(None)` on cancel.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Option<String>> {
        match self.input.handle_key(key) {
            InputAction::Submitted(text) => Some(Some(text)),
            InputAction::Cancelled => Some(None),
            InputAction::Changed(_) | InputAction::None => None,
        }
    }

    fn draw(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(50, 5.min(area.height), area);
        draw_popup(frame, popup, &self.title, Vec::new());
        let inner = Rect {
            x: popup.x + 2,
            y: popup.y + 2,
            width: popup.width.saturating_sub(4),
            height: 1,
        };
        if popup.height >= 5 {
            self.input.draw(frame, inner);
        }
    }
}

/// What the app is waiting on, and what to do once the user answers.
pub enum Dialog {
    AddToPlaylist { station: Station, picker: SelectDialog },
    Confirm { dialog: ConfirmDialog, on_confirm: Action },
    NewPlaylist(PromptDialog),
}

pub enum DialogOutcome {
    Pending,
    /// Close the dialog and dispatch these.
    Done(Vec<Action>),
}

impl Dialog {
    pub fn add_to_playlist(station: Station, playlist_names: Vec<String>) -> Self {
        let title = format!("add {} to…", sanitize(station.display_name()));
        Self::AddToPlaylist {
            station,
            picker: SelectDialog::new(title, playlist_names),
        }
    }

    pub fn confirm(message: impl Into<String>, on_confirm: Action) -> Self {
        Self::Confirm {
            dialog: ConfirmDialog::new(message),
            on_confirm,
        }
    }

    pub fn new_playlist() -> Self {
        Self::NewPlaylist(PromptDialog::new("new playlist", "playlist name"))
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> DialogOutcome {
        if key.kind == KeyEventKind::Release {
            return DialogOutcome::Pending;
        }
        match self {
            Self::AddToPlaylist { station, picker } => match picker.handle_key(key) {
                Some(Selection::Chosen(idx)) => DialogOutcome::Done(vec![Action::AddStationTo(
                    idx,
                    station.clone(),
                )]),
                Some(Selection::Cancelled) => DialogOutcome::Done(vec![]),
                None => DialogOutcome::Pending,
            },
            Self::Confirm { dialog, on_confirm } => match dialog.handle_key(key) {
                Some(true) => DialogOutcome::Done(vec![on_confirm.clone()]),
                Some(false) => DialogOutcome::Done(vec![]),
                None => DialogOutcome::Pending,
            },
            Self::NewPlaylist(prompt) => match prompt.handle_key(key) {
                Some(Some(name)) => DialogOutcome::Done(vec![Action::CreatePlaylist(name)]),
                Some(None) => DialogOutcome::Done(vec![]),
                None => DialogOutcome::Pending,
            },
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        match self {
            Self::AddToPlaylist { picker, .. } => picker.draw(frame, area),
            Self::Confirm { dialog, .. } => dialog.draw(frame, area),
            Self::NewPlaylist(prompt) => prompt.draw(frame, area),
        }
    }
}

fn draw_popup(frame: &mut Frame, popup: Rect, title: &str, lines: Vec<Line>) {
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(C_PANEL_BORDER_FOCUSED))
                    .title(Span::styled(
                        format!(" {} ", title),
                        Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
                    ))
                    .style(Style::default().bg(C_POPUP_BG)),
            )
            .wrap(Wrap { trim: false }),
        popup,
    );
}
