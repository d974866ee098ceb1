use std::io::{self, Write};
use crossterm::{cursor::MoveTo, queue, style::{Color, SetForegroundColor, SetBackgroundColor, ResetColor}};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::model::{Notification, Severity};

/// Cut a string to at most `max_cols` terminal columns, appending "..." if
/// truncated. Wide characters count as two columns.
pub fn truncate_str(s: &str, max_cols: usize) -> String {
    if s.width() <= max_cols {
        return s.to_string();
    }
    let (budget, ellipsis) = if max_cols > 3 { (max_cols - 3, "...") } else { (max_cols, "") };
    let mut used = 0;
    let mut truncated = String::new();
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        truncated.push(ch);
    }
    truncated.push_str(ellipsis);
    truncated
}

/// Print `text` at (`x`, `y`), cut or padded to exactly `width` columns.
pub fn put(out: &mut impl Write, x: u16, y: u16, text: &str, width: usize) -> io::Result<()> {
    queue!(out, MoveTo(x, y))?;
    let text = truncate_str(text, width);
    let pad = width.saturating_sub(text.width());
    write!(out, "{}{:pad$}", text, "", pad = pad)
}

/// Like [`put`], highlighted when `selected`.
pub fn put_selectable(out: &mut impl Write, x: u16, y: u16, text: &str, width: usize, selected: bool) -> io::Result<()> {
    if selected {
        queue!(out, SetBackgroundColor(Color::DarkGrey), SetForegroundColor(Color::White))?;
    }
    put(out, x, y, text, width)?;
    if selected {
        queue!(out, ResetColor)?;
    }
    Ok(())
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

/// Newest notification just above the footer, then the key help.
pub fn render_status_line(out: &mut impl Write, latest: Option<&Notification>, cols: u16, rows: u16) -> io::Result<()> {
    let width = cols as usize;
    if let Some(note) = latest {
        let text = if note.message.is_empty() {
            format!(" {}", note.title)
        } else {
            format!(" {}: {}", note.title, note.message)
        };
        queue!(out, SetForegroundColor(severity_color(note.severity)))?;
        put(out, 0, rows.saturating_sub(2), &text, width)?;
        queue!(out, ResetColor)?;
    }

    let help = "q: Quit | ↑/↓: Select | Tab: Content | l: Reload logs | PgUp/PgDn/f: Scroll | s: Start | t: Stop | r: Restart | x: Remove | A: Start all | Z: Stop all";
    queue!(out, SetForegroundColor(Color::DarkGrey))?;
    put(out, 1, rows.saturating_sub(1), help, width.saturating_sub(1))?;
    queue!(out, ResetColor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_str_long_string() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
    }

    #[test]
    fn truncate_str_utf8() {
        assert_eq!(truncate_str("café", 4), "café");
        assert_eq!(truncate_str("hello世界", 6), "hel...");
    }

    #[test]
    fn truncate_str_counts_wide_chars_as_two_columns() {
        assert_eq!(truncate_str("世界世界世界", 8), "世界...");
        assert_eq!(truncate_str("ab世界", 3), "ab");
    }

    #[test]
    fn put_pads_wide_text_by_columns() {
        let mut buf = Vec::new();
        put(&mut buf, 0, 0, "世界", 6).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("世界  "));

        let mut buf = Vec::new();
        put(&mut buf, 0, 0, "日本語のログ行です", 10).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("日本語... "));
    }

    #[test]
    fn put_pads_to_width() {
        let mut buf = Vec::new();
        put(&mut buf, 0, 0, "abc", 6).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("abc   "));
    }
}
