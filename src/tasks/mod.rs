//! Background work: the event reconciliation loop, the log tail and the stats
//! poll, plus one-shot fetches and container commands.
//!
//! Everything here runs on the tokio runtime and reaches UI state only through
//! the [`UiScheduler`]. Selection-bound loops get a fresh [`CancellationToken`]
//! per [`Generation`]; restarting cancels the old tokens without waiting for the
//! old tasks to finish.

pub mod events;
pub mod logs;
pub mod stats;

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::app::Dashboard;
use crate::config::{Config, LogMode};
use crate::engine::{ContainerAction, Engine};
use crate::model::{
    ContainerRecord, ContentTab, Generation, Severity, environment_lines, json_lines,
};
use crate::scheduler::UiScheduler;

pub use events::ResubscribePolicy;

/// Knobs for the selection-bound loops, taken from the config at startup.
#[derive(Clone, Debug)]
pub struct TaskSettings {
    pub log_tail: usize,
    pub log_mode: LogMode,
    pub log_poll_interval: Duration,
    pub stats_interval: Duration,
    pub resubscribe: ResubscribePolicy,
}

impl From<&Config> for TaskSettings {
    fn from(config: &Config) -> Self {
        Self {
            log_tail: config.log_tail,
            log_mode: config.log_mode,
            log_poll_interval: config.log_poll_interval(),
            stats_interval: config.stats_interval(),
            resubscribe: ResubscribePolicy::with_attempts(config.event_resubscribe_attempts),
        }
    }
}

/// Sleep for `period` unless `token` fires first. Returns false if cancelled.
pub(crate) async fn pause(token: &CancellationToken, period: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(period) => true,
    }
}

/// Spawns and supersedes background tasks on behalf of the dashboard.
pub struct Workers {
    engine: Arc<dyn Engine>,
    scheduler: UiScheduler<Dashboard>,
    runtime: Handle,
    settings: TaskSettings,
    generation: Generation,
    tail: Option<CancellationToken>,
    stats: Option<CancellationToken>,
    shutdown: CancellationToken,
}

impl Workers {
    pub fn new(
        engine: Arc<dyn Engine>,
        scheduler: UiScheduler<Dashboard>,
        runtime: Handle,
        settings: TaskSettings,
    ) -> Self {
        Self {
            engine,
            scheduler,
            runtime,
            settings,
            generation: Generation::default(),
            tail: None,
            stats: None,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// True when no log tail is running, or the current one ended itself.
    pub fn tail_stopped(&self) -> bool {
        self.tail.as_ref().is_none_or(CancellationToken::is_cancelled)
    }

    /// Cancel the selection-bound loops and start new ones for `target`.
    /// Returns the generation every result of the new loops will carry.
    pub fn restart(&mut self, target: Option<&ContainerRecord>) -> Generation {
        self.cancel_selection_tasks();
        self.generation = self.generation.next();

        if let Some(record) = target {
            self.run_log_task(record);
            self.live_statistics_task(record);
        }
        debug!(generation = self.generation.0, target = ?target.map(|r| &r.identity), "selection tasks restarted");
        self.generation
    }

    /// Start the log tail for `record` under the current generation.
    fn run_log_task(&mut self, record: &ContainerRecord) {
        let token = self.shutdown.child_token();
        let job = logs::TailJob {
            engine: Arc::clone(&self.engine),
            scheduler: self.scheduler.clone(),
            handle: record.handle.clone(),
            generation: self.generation,
            token: token.clone(),
            tail: self.settings.log_tail,
            poll_interval: self.settings.log_poll_interval,
        };
        match self.settings.log_mode {
            LogMode::Poll => self.runtime.spawn(logs::poll_tail(job)),
            LogMode::Follow => self.runtime.spawn(logs::follow_tail(job)),
        };
        self.tail = Some(token);
    }

    /// Start the stats poll for `record` under the current generation.
    fn live_statistics_task(&mut self, record: &ContainerRecord) {
        let token = self.shutdown.child_token();
        let job = stats::StatsJob {
            engine: Arc::clone(&self.engine),
            scheduler: self.scheduler.clone(),
            handle: record.handle.clone(),
            generation: self.generation,
            token: token.clone(),
            interval: self.settings.stats_interval,
        };
        self.runtime.spawn(stats::live_statistics_task(job));
        self.stats = Some(token);
    }

    pub fn spawn_event_loop(&self) {
        self.runtime.spawn(events::run_event_loop(
            Arc::clone(&self.engine),
            self.scheduler.clone(),
            self.settings.resubscribe.clone(),
            self.shutdown.child_token(),
        ));
    }

    /// Fire-and-forget container command. The outcome comes back as a notification;
    /// the registry changes only when the matching engine event arrives.
    pub fn spawn_action(&self, record: &ContainerRecord, action: ContainerAction) {
        let engine = Arc::clone(&self.engine);
        let scheduler = self.scheduler.clone();
        let handle = record.handle.clone();
        let name = record.display_name.clone();

        self.runtime.spawn(async move {
            match engine.apply(&handle, action).await {
                Ok(()) => {
                    scheduler.post(move |d: &mut Dashboard| {
                        d.notify(format!("{} {}", action.past_tense(), name), "", Severity::Info);
                    });
                }
                Err(e) => {
                    warn!(container = %name, action = action.verb(), error = %e, "container action failed");
                    scheduler.post(move |d: &mut Dashboard| {
                        d.notify(
                            format!("Could not {} {}", action.verb(), name),
                            e.to_string(),
                            Severity::Error,
                        );
                    });
                }
            }
        });
    }

    /// One-shot fetch for a non-log content tab.
    pub fn spawn_detail(&self, record: &ContainerRecord, tab: ContentTab, generation: Generation) {
        if tab == ContentTab::Logs {
            return;
        }
        let engine = Arc::clone(&self.engine);
        let scheduler = self.scheduler.clone();
        let handle = record.handle.clone();

        self.runtime.spawn(async move {
            let lines = match tab {
                ContentTab::Attributes => engine.inspect(&handle).await.map(|v| json_lines(&v)),
                ContentTab::Environment => engine.inspect(&handle).await.map(|v| environment_lines(&v)),
                ContentTab::Statistics => engine.fetch_stats(&handle).await.map(|v| json_lines(&v)),
                ContentTab::Logs => return,
            };
            let lines = lines.unwrap_or_else(|e| {
                debug!(tab = tab.title(), error = %e, "detail fetch failed");
                vec![format!("Could not load {}: {}", tab.title().to_lowercase(), e)]
            });
            scheduler.post(move |d: &mut Dashboard| {
                d.detail.fill(tab, generation, lines);
            });
        });
    }

    /// Stop everything, including the event loop.
    pub fn shutdown(&mut self) {
        self.cancel_selection_tasks();
        self.shutdown.cancel();
    }

    fn cancel_selection_tasks(&mut self) {
        if let Some(token) = self.tail.take() {
            token.cancel();
        }
        if let Some(token) = self.stats.take() {
            token.cancel();
        }
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
