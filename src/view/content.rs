use std::io::{self, Write};
use std::ops::Range;
use crossterm::{queue, style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor}};

use crate::app::Dashboard;
use crate::model::ContentTab;
use super::SIDEBAR_COLS;
use super::shared::put;
use super::tab_bar::render_content_tabs;

const TOP: u16 = 2;

/// Which slice of `total` lines fits in `height` rows. Following pins the
/// window to the bottom; otherwise it sits `scroll_offset` lines above it.
pub fn log_window(total: usize, height: usize, auto_follow: bool, scroll_offset: usize) -> Range<usize> {
    let bottom_start = total.saturating_sub(height);
    let start = if auto_follow {
        bottom_start
    } else {
        bottom_start.saturating_sub(scroll_offset)
    };
    start..(start + height).min(total)
}

/// Content tabs, the title/stats line and the active pane, right of the sidebar.
pub fn render_content(out: &mut impl Write, dash: &Dashboard, cols: u16, rows: u16) -> io::Result<()> {
    let x = SIDEBAR_COLS;
    let width = cols.saturating_sub(SIDEBAR_COLS) as usize;

    render_content_tabs(out, dash.detail.tab, x, TOP)?;

    let pane = &dash.log_pane;
    let follow = if pane.auto_follow { "" } else { " (paused)" };
    let title = if pane.title.is_empty() {
        "no container selected".to_string()
    } else {
        format!("{}{}", pane.title, follow)
    };
    let stats = dash.stats.summary(pane.len());
    queue!(out, SetAttribute(Attribute::Bold))?;
    put(out, x, TOP + 1, &title, width.saturating_sub(stats.len() + 1))?;
    queue!(out, SetAttribute(Attribute::Reset), SetForegroundColor(Color::Cyan))?;
    put(out, x + width.saturating_sub(stats.len()) as u16, TOP + 1, &stats, stats.len())?;
    queue!(out, ResetColor)?;

    let body_top = TOP + 2;
    let height = rows.saturating_sub(body_top + 2) as usize;

    if dash.detail.tab == ContentTab::Logs {
        let lines: Vec<&String> = pane.lines().collect();
        let window = log_window(lines.len(), height, pane.auto_follow, pane.scroll_offset);
        for (row, line) in lines[window].iter().enumerate() {
            put(out, x, body_top + row as u16, line, width)?;
        }
        return Ok(());
    }

    if dash.detail.loading {
        queue!(out, SetForegroundColor(Color::DarkGrey))?;
        put(out, x, body_top, &format!("Loading {}...", dash.detail.tab.title().to_lowercase()), width)?;
        queue!(out, ResetColor)?;
        return Ok(());
    }
    for (row, line) in dash.detail.lines.iter().take(height).enumerate() {
        put(out, x, body_top + row as u16, line, width)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn following_shows_the_tail() {
        assert_eq!(log_window(100, 10, true, 0), 90..100);
        assert_eq!(log_window(5, 10, true, 0), 0..5);
    }

    #[test]
    fn scrolled_window_stops_at_top() {
        assert_eq!(log_window(100, 10, false, 25), 65..75);
        assert_eq!(log_window(100, 10, false, 500), 0..10);
    }
}
