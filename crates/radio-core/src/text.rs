//! Sanitizing of third-party text before it reaches the terminal.
//!
//! Station names, countries and tags come straight from the directory, so an
//! entry could carry escape sequences that move the cursor, retitle the
//! window or rewrite the clipboard.  Everything rendered goes through
//! [`sanitize`] first.

use std::borrow::Cow;

/// Strip ANSI/OSC escape sequences and control characters.  Line breaks and
/// tabs fold to a single space so a value always renders on one row.
pub fn sanitize(s: &str) -> Cow<'_, str> {
    if !s.chars().any(needs_cleaning) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\u{1b}' => match chars.peek() {
                // CSI: ESC [ params... final byte in @..~
                Some('[') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('@'..='~').contains(&c) {
                            break;
                        }
                    }
                }
                // OSC: ESC ] ... terminated by BEL or ST (ESC \)
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\u{7}' {
                            break;
                        }
                        if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                // Two-character escape
                Some(_) => {
                    chars.next();
                }
                None => {}
            },
            '\n' | '\r' | '\t' => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn needs_cleaning(c: char) -> bool {
    c.is_control()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        let s = "Rádio Oração • 128 kbps";
        assert!(matches!(sanitize(s), Cow::Borrowed(_)));
        assert_eq!(sanitize(s), s);
    }

    #[test]
    fn strips_csi_sequences() {
        assert_eq!(sanitize("\u{1b}[31mRed\u{1b}[0m FM"), "Red FM");
        assert_eq!(sanitize("a\u{1b}[2J\u{1b}[Hb"), "ab");
    }

    #[test]
    fn strips_osc_sequences() {
        assert_eq!(sanitize("\u{1b}]0;pwned\u{7}Radio"), "Radio");
        assert_eq!(sanitize("\u{1b}]52;c;Zm9v\u{1b}\\Radio"), "Radio");
    }

    #[test]
    fn folds_line_breaks() {
        assert_eq!(sanitize("Line one\r\nLine two"), "Line one Line two");
        assert_eq!(sanitize("tab\there"), "tab here");
    }

    #[test]
    fn drops_other_controls() {
        assert_eq!(sanitize("be\u{7}ll\u{0}\u{7f}\u{9b}"), "bell");
    }

    #[test]
    fn trailing_escape_is_dropped() {
        assert_eq!(sanitize("abc\u{1b}"), "abc");
    }
}
