use std::io::{self, Write, stdout};
use crossterm::{cursor::MoveTo, execute, queue, style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor}, terminal::{self, Clear, ClearType}};

use crate::error::PockerError;

pub fn render_loading() -> io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All))?;
    let (cols, rows) = terminal::size()?;
    let msg = "Connecting to the container engine...";
    queue!(out, MoveTo(cols.saturating_sub(msg.len() as u16) / 2, rows / 2), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "{}", msg)?;
    queue!(out, ResetColor)?;
    out.flush()
}

/// Blocking screen for the fatal startup errors: reason, help, how to leave.
pub fn render_startup_error(err: &PockerError) -> io::Result<()> {
    let mut out = stdout();
    execute!(out, Clear(ClearType::All))?;
    let (_, rows) = terminal::size()?;

    let help = err.help();
    let block_height = help.len() as u16 + 4;
    let mut y = rows.saturating_sub(block_height) / 2;

    queue!(out, MoveTo(4, y), SetForegroundColor(Color::Red), SetAttribute(Attribute::Bold))?;
    write!(out, "{}", err.reason())?;
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    y += 2;

    for line in &help {
        queue!(out, MoveTo(4, y))?;
        write!(out, "{}", line)?;
        y += 1;
    }

    queue!(out, MoveTo(4, y + 1), SetForegroundColor(Color::DarkGrey))?;
    write!(out, "Press q to quit.")?;
    queue!(out, ResetColor)?;
    out.flush()
}
