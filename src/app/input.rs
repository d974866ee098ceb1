use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::engine::ContainerAction;
use crate::model::Severity;

use super::App;
use super::state::{PendingAction, PendingActionKind};

/// Result of handling a key: Quit the app, or key was consumed (needs render).
/// None means the key was not handled.
#[derive(Debug, PartialEq, Eq)]
pub enum InputResult {
    Quit,
    Consumed,
}

/// Handle a key event. Returns Some(Quit) to exit, Some(Consumed) if key was handled and
/// a render is needed, None if the key was not handled.
pub fn handle_key(app: &mut App, key_event: KeyEvent) -> Option<InputResult> {
    let KeyEvent { code, modifiers, .. } = key_event;

    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Some(InputResult::Quit);
    }

    if let Some(pa) = app.pending_action.take() {
        if code == KeyCode::Char('y') || code == KeyCode::Char('Y') {
            confirm(app, pa.kind);
        }
        return Some(InputResult::Consumed);
    }

    let page_size = crossterm::terminal::size()
        .map(|(_, h)| h as usize)
        .unwrap_or(24)
        .saturating_sub(6)
        .max(1);

    let dash = &mut app.dashboard;
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(InputResult::Quit),
        KeyCode::Up | KeyCode::Char('k') => {
            if dash.select_step(-1).is_changed() {
                return Some(InputResult::Consumed);
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if dash.select_step(1).is_changed() {
                return Some(InputResult::Consumed);
            }
        }
        KeyCode::Tab => {
            let next = dash.detail.tab.next();
            dash.show_tab(next);
            return Some(InputResult::Consumed);
        }
        KeyCode::Char('l') => {
            dash.run_log_task();
            return Some(InputResult::Consumed);
        }
        KeyCode::PageUp => {
            dash.log_pane.scroll_up(page_size);
            return Some(InputResult::Consumed);
        }
        KeyCode::PageDown => {
            dash.log_pane.scroll_down(page_size);
            return Some(InputResult::Consumed);
        }
        KeyCode::Char('f') | KeyCode::End => {
            dash.log_pane.follow();
            return Some(InputResult::Consumed);
        }
        KeyCode::Char('s') => {
            if dash.command(ContainerAction::Start) {
                return Some(InputResult::Consumed);
            }
        }
        KeyCode::Char('t') => return stage(app, ContainerAction::Stop),
        KeyCode::Char('r') => return stage(app, ContainerAction::Restart),
        KeyCode::Char('x') => return stage(app, ContainerAction::Remove),
        KeyCode::Char('A') => {
            let started = dash.command_all(ContainerAction::Start);
            if started == 0 {
                dash.notify("Nothing to start", "", Severity::Info);
            }
            return Some(InputResult::Consumed);
        }
        KeyCode::Char('Z') => {
            let running = dash
                .registry
                .ordered()
                .iter()
                .filter(|r| r.status.is_running())
                .count();
            if running == 0 {
                dash.notify("Nothing to stop", "", Severity::Info);
            } else {
                app.pending_action = Some(PendingAction::stop_all(running));
            }
            return Some(InputResult::Consumed);
        }
        _ => {}
    }
    None
}

fn stage(app: &mut App, action: ContainerAction) -> Option<InputResult> {
    let identity = app.dashboard.selection.current()?.to_string();
    app.pending_action = Some(PendingAction::container(&identity, action));
    Some(InputResult::Consumed)
}

fn confirm(app: &mut App, kind: PendingActionKind) {
    let dash = &mut app.dashboard;
    match kind {
        PendingActionKind::Container(identity, action) => {
            if !dash.command_for(&identity, action) {
                dash.notify(
                    format!("Could not {} {}", action.verb(), identity),
                    "container is no longer listed",
                    Severity::Warning,
                );
            }
        }
        PendingActionKind::StopAll => {
            dash.command_all(ContainerAction::Stop);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::app::testing::shared_dashboard;
    use crate::engine::memory::MemoryEngine;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn stop_requires_confirmation() {
        let engine = Arc::new(MemoryEngine::new().with_container("web", "w1", "running"));
        let (_rt, dash, queue) = shared_dashboard(Arc::clone(&engine));
        let mut app = App::new(dash, queue);
        app.dashboard.select("web");

        assert_eq!(handle_key(&mut app, key(KeyCode::Char('t'))), Some(InputResult::Consumed));
        assert!(app.pending_action.is_some());
        // Any other key cancels.
        handle_key(&mut app, key(KeyCode::Char('n')));
        assert!(app.pending_action.is_none());

        handle_key(&mut app, key(KeyCode::Char('t')));
        handle_key(&mut app, key(KeyCode::Char('y')));
        assert!(wait_until(|| !engine.applied().is_empty()));
        assert_eq!(engine.applied(), vec![("w1".to_string(), ContainerAction::Stop)]);
    }

    #[test]
    fn arrows_move_selection_and_q_quits() {
        let engine = Arc::new(
            MemoryEngine::new()
                .with_container("web", "w1", "running")
                .with_container("db", "d1", "exited"),
        );
        let (_rt, dash, queue) = shared_dashboard(engine);
        let mut app = App::new(dash, queue);
        app.dashboard.select("web");

        assert_eq!(handle_key(&mut app, key(KeyCode::Up)), None);
        handle_key(&mut app, key(KeyCode::Down));
        assert_eq!(app.dashboard.selection.current(), Some("db"));
        assert_eq!(handle_key(&mut app, key(KeyCode::Char('q'))), Some(InputResult::Quit));
        assert_eq!(
            handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(InputResult::Quit)
        );
    }

    #[test]
    fn tab_cycles_content() {
        let engine = Arc::new(MemoryEngine::new().with_container("web", "w1", "running"));
        let (_rt, dash, queue) = shared_dashboard(engine);
        let mut app = App::new(dash, queue);

        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.dashboard.detail.tab, crate::model::ContentTab::Attributes);
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.dashboard.detail.tab, crate::model::ContentTab::Logs);
    }
}
