use std::io::{self, Write};
use crossterm::{
    cursor, queue,
    style::{Color, SetForegroundColor, SetBackgroundColor, ResetColor},
};

use crate::model::ContentTab;

/// Title row plus separator.
pub fn render_header(out: &mut impl Write, container_count: usize, cols: u16) -> io::Result<()> {
    queue!(out, cursor::MoveTo(0, 0))?;
    queue!(out, SetBackgroundColor(Color::DarkBlue), SetForegroundColor(Color::White))?;
    write!(out, " pocker ")?;
    queue!(out, ResetColor)?;
    write!(out, "  Containers ({})", container_count)?;

    // Right-align the time
    let time_str = format!("{} ", chrono::Local::now().format("%H:%M:%S"));
    let col = (cols as usize).saturating_sub(time_str.len());
    queue!(out, cursor::MoveTo(col as u16, 0), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "{}", time_str)?;

    queue!(out, cursor::MoveTo(0, 1))?;
    write!(out, "{}", "─".repeat(cols as usize))?;
    queue!(out, ResetColor)?;
    Ok(())
}

/// One row of content tabs starting at (`x`, `y`).
pub fn render_content_tabs(out: &mut impl Write, active: ContentTab, x: u16, y: u16) -> io::Result<()> {
    queue!(out, cursor::MoveTo(x, y))?;
    for tab in ContentTab::ALL {
        if tab == active {
            queue!(out, SetBackgroundColor(Color::DarkBlue), SetForegroundColor(Color::White))?;
        } else {
            queue!(out, SetForegroundColor(Color::DarkGrey))?;
        }
        write!(out, " {} ", tab.title())?;
        queue!(out, ResetColor)?;
        write!(out, " ")?;
    }
    Ok(())
}
