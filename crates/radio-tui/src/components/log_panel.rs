//! LogPanel component: tail of santoplay.log under the tab body.
//!
//! Follows new lines while scrolled to the bottom; mouse wheel scrolls back.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    theme::{C_MUTED, C_SECONDARY},
    widgets::pane_chrome::pane_chrome,
};

pub struct LogPanel {
    /// First visible line; `usize::MAX` pins to the newest.
    pub scroll: usize,
    /// Rows available at the last draw.
    height: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            scroll: usize::MAX,
            height: 1,
        }
    }

    fn scroll_by(&mut self, delta: isize, total: usize, height: usize) {
        let max_scroll = total.saturating_sub(height);
        let current = self.scroll.min(max_scroll);
        let next = current.saturating_add_signed(delta).min(max_scroll);
        self.scroll = if next == max_scroll { usize::MAX } else { next };
    }
}

impl Component for LogPanel {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let (total, height) = (state.log_lines.len(), self.height);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1, total, height),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1, total, height),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::End | KeyCode::Char('G') => self.scroll = usize::MAX,
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, state: &AppState) -> Vec<Action> {
        let height = area.height.saturating_sub(2) as usize;
        let total = state.log_lines.len();
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll_by(-3, total, height),
            MouseEventKind::ScrollDown => self.scroll_by(3, total, height),
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleLogs = action {
            self.scroll = usize::MAX;
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        if area.height == 0 {
            return;
        }
        frame.render_widget(Clear, area);

        let block = pane_chrome("log", Some('L'), focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.height = (inner.height as usize).max(1);

        let logs = &state.log_lines;
        if logs.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("  no log entries yet in {}", state.log_path.display()),
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        let height = inner.height as usize;
        let start = self.scroll.min(logs.len().saturating_sub(height));
        let lines: Vec<Line> = logs
            .iter()
            .skip(start)
            .take(height)
            .map(|msg| {
                Line::from(vec![
                    Span::raw(" "),
                    Span::styled(compact_log_line(msg), Style::default().fg(C_SECONDARY)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

// ── Log line formatting ───────────────────────────────────────────────────────

fn compact_log_line(raw: &str) -> String {
    let clean = strip_ansi(raw).trim().to_string();
    let mut rest = clean.as_str();
    let mut head: Vec<String> = Vec::new();

    // Try to parse a leading RFC3339 timestamp
    if let Some((tok, rem)) = split_first_token(rest) {
        if let Some(ts) = compact_timestamp(tok) {
            head.push(ts);
            rest = rem.trim_start();
        }
    }

    // Try to strip a log level
    if let Some((tok, rem)) = split_first_token(rest) {
        let upper = tok.to_ascii_uppercase();
        if matches!(
            upper.as_str(),
            "TRACE" | "DEBUG" | "INFO" | "WARN" | "ERROR"
        ) {
            head.push(upper);
            rest = rem.trim_start();
        }
    }

    // Strip a module path prefix like "foo::bar: "
    if let Some((left, msg)) = rest.split_once(": ") {
        if !left.is_empty()
            && left.len() <= 48
            && left
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-'))
        {
            rest = msg.trim_start();
        }
    }

    if head.is_empty() {
        rest.to_string()
    } else if rest.is_empty() {
        head.join(" ")
    } else {
        format!("{} {}", head.join(" "), rest)
    }
}

fn compact_timestamp(token: &str) -> Option<String> {
    let dt = chrono::DateTime::parse_from_rfc3339(token).ok()?;
    let local = dt.with_timezone(&chrono::Local);
    let fmt = if local.date_naive() == chrono::Local::now().date_naive() {
        "%H:%M:%S"
    } else {
        "%m-%d %H:%M"
    };
    Some(local.format(fmt).to_string())
}

fn split_first_token(s: &str) -> Option<(&str, &str)> {
    let mut parts = s.splitn(2, char::is_whitespace);
    let first = parts.next()?.trim();
    if first.is_empty() {
        return None;
    }
    Some((first, parts.next().unwrap_or("")))
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_escape = false;
    for ch in s.chars() {
        if in_escape {
            if ('@'..='~').contains(&ch) {
                in_escape = false;
            }
            continue;
        }
        if ch == '\u{1b}' {
            in_escape = true;
            continue;
        }
        out.push(ch);
    }
    out
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compacts_tracing_lines() {
        let line = "\u{1b}[2m2020-01-02T03:04:05.000000Z\u{1b}[0m  INFO radio_tui::player: playing station";
        let compact = compact_log_line(line);
        assert!(compact.ends_with("INFO playing station"), "{compact}");
        assert!(!compact.contains('\u{1b}'));
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(compact_log_line("  mpv exited  "), "mpv exited");
        assert_eq!(
            compact_log_line("connection failed: timed out"),
            "connection failed: timed out"
        );
    }

    #[test]
    fn scrolling_back_to_the_end_pins_to_newest() {
        let mut panel = LogPanel::new();
        panel.scroll_by(-2, 10, 4);
        assert_eq!(panel.scroll, 4);
        panel.scroll_by(5, 10, 4);
        assert_eq!(panel.scroll, usize::MAX);
    }
}
