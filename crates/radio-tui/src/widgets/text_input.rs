//! TextInput: wraps tui-input for single-line entry (search box, dialog prompts).

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Changed(String),
    Submitted(String),
    Cancelled,
    None,
}

pub struct TextInput {
    input: Input,
    pub active: bool,
    prompt: &'static str,
    placeholder: String,
}

impl TextInput {
    pub fn new(prompt: &'static str, placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            active: false,
            prompt,
            placeholder: placeholder.into(),
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    #[cfg(test)]
    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Handle a key event. Returns what happened.
    ///
    /// Enter submits the current text and stays active.
    /// Esc clears the text; on an empty input it deactivates.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match key.code {
            KeyCode::Esc => {
                if !self.input.value().is_empty() {
                    self.input = Input::default();
                    InputAction::Changed(String::new())
                } else {
                    self.deactivate();
                    InputAction::Cancelled
                }
            }
            KeyCode::Enter => InputAction::Submitted(self.input.value().to_string()),
            _ => match self.input.handle_event(&Event::Key(key)) {
                Some(change) if change.value => InputAction::Changed(self.input.value().to_string()),
                _ => InputAction::None,
            },
        }
    }

    /// Render the input line into `area`.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let prefix = format!("{} ", self.prompt);
        let prefix_w = prefix.chars().count() as u16;
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(prefix_w + 1) as usize);
        let value = self.input.value();
        let display = if value.is_empty() {
            Span::styled(
                format!("{}{}", prefix, self.placeholder),
                Style::default().fg(C_MUTED),
            )
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(format!("{}{}", prefix, visible), Style::default().fg(C_FILTER_FG))
        };

        let paragraph =
            Paragraph::new(Line::from(vec![display])).style(Style::default().bg(C_FILTER_BG));
        frame.render_widget(paragraph, area);

        if self.active && area.width > 0 {
            let cursor_x = area.x + prefix_w + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_then_submitting() {
        let mut input = TextInput::new(">", "type a name");
        input.activate();
        assert_eq!(
            input.handle_key(key(KeyCode::Char('j'))),
            InputAction::Changed("j".into())
        );
        input.handle_key(key(KeyCode::Char('a')));
        assert_eq!(
            input.handle_key(key(KeyCode::Enter)),
            InputAction::Submitted("ja".into())
        );
        assert!(input.is_active());
    }

    #[test]
    fn escape_clears_then_closes() {
        let mut input = TextInput::new(">", "");
        input.activate();
        input.handle_key(key(KeyCode::Char('x')));
        assert_eq!(
            input.handle_key(key(KeyCode::Esc)),
            InputAction::Changed(String::new())
        );
        assert!(input.is_active());
        assert_eq!(input.handle_key(key(KeyCode::Esc)), InputAction::Cancelled);
        assert!(!input.is_active());
    }
}
