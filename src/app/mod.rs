mod dashboard;
mod event_loop;
mod input;
mod reconcile;
mod render;
mod startup;
mod state;
#[cfg(test)]
pub(crate) mod testing;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use tracing::{error, info};

use crate::config::Config;
use crate::docker::DockerEngine;
use crate::engine::Engine;
use crate::error::{PockerError, Result};
use crate::scheduler::{self, UiQueue};
use crate::tasks::{TaskSettings, Workers};
use crate::view::Presenter;

pub use dashboard::Dashboard;
pub use input::{InputResult, handle_key};
pub use startup::{InitialState, load_initial};
pub use state::{CONFIRM_TIMEOUT, PendingAction, PendingActionKind};

/// Restore the terminal to normal mode. Safe to call multiple times.
pub fn restore_terminal() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// The terminal front end: the dashboard plus the queue its loops post into.
pub struct App {
    pub dashboard: Dashboard,
    queue: UiQueue<Dashboard>,
    pub pending_action: Option<PendingAction>,
    pub tick_rate: Duration,
}

impl App {
    pub fn new(dashboard: Dashboard, queue: UiQueue<Dashboard>) -> Self {
        Self {
            dashboard,
            queue,
            pending_action: None,
            tick_rate: Duration::from_millis(100),
        }
    }
}

/// Run the application. Sets up terminal, runs the main loop, restores terminal on exit.
pub fn run(config: &Config, config_path: &Path, should_quit: Arc<AtomicBool>) -> Result<()> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .build()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Clear(ClearType::All))?;

    let outcome = run_dashboard(&rt, config, config_path, &should_quit);

    restore_terminal();
    outcome
}

fn run_dashboard(
    rt: &tokio::runtime::Runtime,
    config: &Config,
    config_path: &Path,
    should_quit: &AtomicBool,
) -> Result<()> {
    Presenter::render_loading()?;

    let loaded = rt.block_on(async {
        let engine: Arc<dyn Engine> = Arc::new(DockerEngine::connect().await?);
        let initial = load_initial(engine.as_ref(), config.show_all_containers, config_path).await?;
        Ok::<_, PockerError>((engine, initial))
    });
    let (engine, initial) = match loaded {
        Ok(loaded) => loaded,
        Err(e) if e.is_fatal() => {
            error!(error = %e, "startup failed");
            startup_error_loop(&e, should_quit)?;
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    let (sched, queue) = scheduler::channel();
    let workers = Workers::new(engine, sched, rt.handle().clone(), TaskSettings::from(config));
    let mut app = App::new(Dashboard::new(initial, workers, config.max_log_lines), queue);

    app.dashboard.on_start();
    let result = main_loop(&mut app, should_quit);
    app.dashboard.on_stop();
    result
}

fn main_loop(app: &mut App, should_quit: &AtomicBool) -> Result<()> {
    let mut needs_render = true;

    loop {
        if should_quit.load(Ordering::Relaxed) {
            info!("quit requested by signal");
            break;
        }

        if app.process_queue() {
            needs_render = true;
        }
        if app.expire_pending_action() {
            needs_render = true;
        }
        if app.expire_notifications() {
            needs_render = true;
        }

        if needs_render {
            if Presenter::render_size_guard()? {
                needs_render = false;
                if event::poll(app.tick_rate)? {
                    let _ = event::read()?;
                    needs_render = true;
                }
                continue;
            }

            render::render(app)?;
            needs_render = false;
        }

        if event::poll(app.tick_rate)? {
            match event::read()? {
                Event::Key(key_event) => match input::handle_key(app, key_event) {
                    Some(InputResult::Quit) => break,
                    Some(InputResult::Consumed) => needs_render = true,
                    None => {}
                },
                Event::Resize(_, _) => needs_render = true,
                _ => {}
            }
        }
    }

    Ok(())
}

/// Block on the error screen for one of the fatal startup errors until the
/// user quits.
fn startup_error_loop(err: &PockerError, should_quit: &AtomicBool) -> Result<()> {
    Presenter::render_startup_error(err)?;
    while !should_quit.load(Ordering::Relaxed) {
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        match event::read()? {
            Event::Key(KeyEvent { code, modifiers, .. }) => {
                let ctrl_c = code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL);
                if ctrl_c || matches!(code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter) {
                    break;
                }
            }
            Event::Resize(_, _) => Presenter::render_startup_error(err)?,
            _ => {}
        }
    }
    Ok(())
}
