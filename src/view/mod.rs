mod confirmation;
mod containers;
mod content;
mod shared;
mod startup;
mod tab_bar;

use std::io::{self, Write};
use crossterm::{execute, cursor, queue, style::{Color, SetForegroundColor, ResetColor}, terminal};

use crate::app::Dashboard;
use crate::error::PockerError;

pub use shared::truncate_str;
pub use content::log_window;

pub struct Presenter;

/// Minimum terminal dimensions for usable rendering.
pub const MIN_COLS: u16 = 80;
pub const MIN_ROWS: u16 = 12;

/// Width of the container/image column on the left.
pub const SIDEBAR_COLS: u16 = 34;

impl Presenter {
    /// Check if the terminal is large enough. If not, render a "too small"
    /// message and return `true` (meaning "skip normal rendering").
    pub fn render_size_guard() -> io::Result<bool> {
        let (cols, rows) = terminal::size()?;
        if cols < MIN_COLS || rows < MIN_ROWS {
            let mut out = std::io::stdout();
            execute!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;
            let msg = format!(
                "Terminal too small ({}x{}). Resize to at least {}x{}.",
                cols, rows, MIN_COLS, MIN_ROWS
            );
            let y = rows / 2;
            let x = cols.saturating_sub(msg.len() as u16) / 2;
            queue!(out, cursor::MoveTo(x, y), SetForegroundColor(Color::Yellow))?;
            write!(out, "{}", msg)?;
            queue!(out, ResetColor)?;
            out.flush()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub fn render_loading() -> io::Result<()> {
        startup::render_loading()
    }

    /// Full frame: header, container list, images, content tabs, status line.
    pub fn render_dashboard(dash: &Dashboard) -> io::Result<()> {
        let mut out = io::stdout();
        let (cols, rows) = terminal::size()?;
        execute!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;

        tab_bar::render_header(&mut out, dash.registry.len(), cols)?;
        containers::render_sidebar(&mut out, &dash.registry, &dash.images, rows)?;
        content::render_content(&mut out, dash, cols, rows)?;
        shared::render_status_line(&mut out, dash.notifications.latest(), cols, rows)?;

        out.flush()
    }

    pub fn render_startup_error(err: &PockerError) -> io::Result<()> {
        startup::render_startup_error(err)
    }

    pub fn render_confirmation(prompt: &str, remaining_secs: u64) -> io::Result<()> {
        confirmation::render_confirmation(prompt, remaining_secs)
    }
}
