use std::io;
use std::time::Instant;

use crate::view::Presenter;

use super::App;

pub fn render(app: &App) -> io::Result<()> {
    Presenter::render_dashboard(&app.dashboard)?;
    if let Some(ref pa) = app.pending_action {
        let remaining = pa.expires.saturating_duration_since(Instant::now());
        Presenter::render_confirmation(&pa.description, remaining.as_secs() + 1)?;
    }
    Ok(())
}
