//! SearchBar component: name input at the top of the Search tab.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{layout::Rect, Frame};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    widgets::{
        pane_chrome::pane_chrome,
        text_input::{InputAction, TextInput},
    },
};

pub struct SearchBar {
    input: TextInput,
}

impl SearchBar {
    pub fn new() -> Self {
        Self {
            input: TextInput::new("›", "station name, Enter to search"),
        }
    }

    #[cfg(test)]
    pub fn query(&self) -> &str {
        self.input.text()
    }
}

impl Component for SearchBar {
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if !self.input.is_active() {
            return match key.code {
                KeyCode::Enter | KeyCode::Char('/') | KeyCode::Char('i') => {
                    self.input.activate();
                    vec![Action::OpenInput]
                }
                KeyCode::Down => vec![Action::FocusNext],
                _ => vec![],
            };
        }
        match self.input.handle_key(key) {
            InputAction::Submitted(query) => {
                self.input.deactivate();
                vec![
                    Action::CloseInput,
                    Action::Search(query),
                    Action::FocusPane(ComponentId::SearchList),
                ]
            }
            InputAction::Cancelled => vec![Action::CloseInput],
            InputAction::Changed(_) | InputAction::None => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            Action::OpenInput => self.input.activate(),
            Action::CloseInput | Action::SwitchTab(_) | Action::FocusNext | Action::FocusPrev => {
                self.input.deactivate()
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, _state: &AppState) {
        let block = pane_chrome("search", Some('/'), focused || self.input.is_active(), None);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height > 0 {
            self.input.draw(frame, Rect { height: 1, ..inner });
        }
    }

    fn is_editing(&self) -> bool {
        self.input.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;
    use std::path::PathBuf;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn enter_submits_the_typed_query() {
        let state = AppState::new("gospel".into(), PathBuf::new());
        let mut bar = SearchBar::new();
        assert!(matches!(
            &bar.handle_key(key(KeyCode::Enter), &state)[..],
            [Action::OpenInput]
        ));
        assert!(bar.is_editing());
        for c in "louvor".chars() {
            bar.handle_key(key(KeyCode::Char(c)), &state);
        }
        let actions = bar.handle_key(key(KeyCode::Enter), &state);
        assert!(matches!(&actions[1], Action::Search(q) if q == "louvor"));
        assert!(!bar.is_editing());
        assert_eq!(bar.query(), "louvor");
    }

    #[test]
    fn blank_queries_are_still_submitted() {
        // The app answers an empty query with a hint instead of a request.
        let state = AppState::new("gospel".into(), PathBuf::new());
        let mut bar = SearchBar::new();
        bar.handle_key(key(KeyCode::Enter), &state);
        let actions = bar.handle_key(key(KeyCode::Enter), &state);
        assert!(matches!(&actions[1], Action::Search(q) if q.is_empty()));
    }
}
