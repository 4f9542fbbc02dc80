//! Toast notification system: transient status messages.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::theme::{C_TOAST_ERROR, C_TOAST_INFO, C_TOAST_SUCCESS, C_TOAST_WARNING};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    fn icon(self) -> &'static str {
        match self {
            Self::Info => "·",
            Self::Success => "✓",
            Self::Warning => "!",
            Self::Error => "✗",
        }
    }

    fn color(self) -> ratatui::style::Color {
        match self {
            Self::Info => C_TOAST_INFO,
            Self::Success => C_TOAST_SUCCESS,
            Self::Warning => C_TOAST_WARNING,
            Self::Error => C_TOAST_ERROR,
        }
    }
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

/// A persistent spinner toast that animates until its origin resolves it.
struct SpinnerToast {
    key: &'static str,
    message: String,
    frame: usize,
}

const SPINNER_FRAMES: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    spinners: Vec<SpinnerToast>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            spinners: Vec::new(),
            max_visible: 4,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity, duration: Duration) {
        let msg = message.into();
        self.toasts.retain(|t| t.message != msg);
        self.toasts.push_back(Toast {
            message: msg,
            severity,
            expires: Instant::now() + duration,
        });
        while self.toasts.len() > self.max_visible * 2 {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info, Duration::from_secs(3));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success, Duration::from_secs(3));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Warning, Duration::from_secs(4));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error, Duration::from_secs(5));
    }

    /// Start or replace the spinner owned by `key`.  It animates on every
    /// `tick()` until `dismiss_spinner(key)` is called; other keys' spinners
    /// are left alone.
    pub fn spinner(&mut self, key: &'static str, message: impl Into<String>) {
        let message = message.into();
        match self.spinners.iter_mut().find(|s| s.key == key) {
            Some(s) => s.message = message,
            None => self.spinners.push(SpinnerToast {
                key,
                message,
                frame: 0,
            }),
        }
    }

    pub fn dismiss_spinner(&mut self, key: &'static str) {
        self.spinners.retain(|s| s.key != key);
    }

    /// Remove expired toasts and advance the spinner frame. Call each tick.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.toasts.retain(|t| t.expires > now);
        for s in &mut self.spinners {
            s.frame = (s.frame + 1) % SPINNER_FRAMES.len();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty() && self.spinners.is_empty()
    }

    /// Messages currently queued, oldest first.
    #[cfg(test)]
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.toasts.iter().map(|t| t.message.as_str())
    }

    #[cfg(test)]
    pub fn spinner_messages(&self) -> impl Iterator<Item = &str> {
        self.spinners.iter().map(|s| s.message.as_str())
    }

    /// Render toasts in the top-right corner of `area`.
    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        if self.is_empty() {
            return;
        }
        let max_width = (area.width / 2).clamp(30, 60).min(area.width);
        let mut y = area.y + 1;

        let mut rows: Vec<(String, Style)> = Vec::new();
        for s in &self.spinners {
            let icon = SPINNER_FRAMES[s.frame % SPINNER_FRAMES.len()];
            rows.push((
                format!(" {} {} ", icon, s.message),
                Style::default().fg(C_TOAST_INFO).add_modifier(Modifier::BOLD),
            ));
        }
        for toast in self.toasts.iter().rev().take(self.max_visible) {
            rows.push((
                format!(" {} {} ", toast.severity.icon(), toast.message),
                Style::default()
                    .fg(toast.severity.color())
                    .add_modifier(Modifier::BOLD),
            ));
        }

        for (text, style) in rows {
            if y >= area.y + area.height {
                break;
            }
            let w = (text.width() as u16).min(max_width);
            let x = area.x + area.width.saturating_sub(w + 1);
            let toast_area = Rect {
                x,
                y,
                width: w,
                height: 1,
            };
            frame.render_widget(Clear, toast_area);
            frame.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), toast_area);
            y += 1;
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse_and_expired_toasts_go() {
        let mut toasts = ToastManager::new();
        toasts.info("added to favorites");
        toasts.info("added to favorites");
        assert_eq!(toasts.messages().count(), 1);

        toasts.push("gone", Severity::Warning, Duration::ZERO);
        toasts.tick();
        assert_eq!(toasts.messages().collect::<Vec<_>>(), vec!["added to favorites"]);
    }

    #[test]
    fn spinner_keeps_manager_busy_until_dismissed() {
        let mut toasts = ToastManager::new();
        toasts.spinner("search", "searching");
        toasts.tick();
        assert!(!toasts.is_empty());
        toasts.dismiss_spinner("search");
        assert!(toasts.is_empty());
    }

    #[test]
    fn spinners_only_dismiss_their_own_origin() {
        let mut toasts = ToastManager::new();
        toasts.spinner("random", "picking a random station");
        toasts.spinner("discover", "loading top stations");
        toasts.spinner("discover", "reloading top stations");
        assert_eq!(toasts.spinner_messages().count(), 2);

        toasts.dismiss_spinner("discover");
        assert_eq!(
            toasts.spinner_messages().collect::<Vec<_>>(),
            vec!["picking a random station"]
        );
    }
}
