use std::io::{self, Write, stdout};
use crossterm::{queue, style::{Attribute, Color, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor}, terminal};

use super::shared::put;

/// Prompt bar above the status line for a staged destructive command.
pub fn render_confirmation(prompt: &str, remaining_secs: u64) -> io::Result<()> {
    let mut out = stdout();
    let (cols, rows) = terminal::size()?;

    queue!(out, SetBackgroundColor(Color::DarkRed), SetForegroundColor(Color::White), SetAttribute(Attribute::Bold))?;
    let line = format!("  {} y: confirm, any other key: cancel ({}s)", prompt, remaining_secs);
    put(&mut out, 0, rows.saturating_sub(3), &line, cols as usize)?;
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    out.flush()
}
