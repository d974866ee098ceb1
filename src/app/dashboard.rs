use tracing::{debug, info};

use crate::engine::ContainerAction;
use crate::model::{
    ContainerRecord, ContainerStatus, ContentTab, DetailPane, ImageRecord, LogPane, Notifications,
    Severity, StatsPanel,
};
use crate::registry::Registry;
use crate::selection::{SelectionChange, SelectionController};
use crate::tasks::Workers;

use super::startup::InitialState;

/// Everything the UI thread owns: the registry, the selection and the panes the
/// background loops write into. Only ever touched from the UI thread; loops reach
/// it through posted closures.
pub struct Dashboard {
    pub registry: Registry,
    pub selection: SelectionController,
    pub images: Vec<ImageRecord>,
    pub log_pane: LogPane,
    pub stats: StatsPanel,
    pub detail: DetailPane,
    pub notifications: Notifications,
    pub(super) workers: Workers,
}

impl Dashboard {
    pub fn new(initial: InitialState, workers: Workers, max_log_lines: usize) -> Self {
        let mut registry = Registry::new();
        registry.initialize(initial.containers);
        let mut selection = SelectionController::new();
        selection.revalidate(&mut registry);
        Self {
            registry,
            selection,
            images: initial.images,
            log_pane: LogPane::new(max_log_lines),
            stats: StatsPanel::default(),
            detail: DetailPane::default(),
            notifications: Notifications::default(),
            workers,
        }
    }

    /// Start the loops for the current selection and subscribe to events.
    pub fn on_start(&mut self) {
        self.run_log_task();
        self.workers.spawn_event_loop();
        info!(containers = self.registry.len(), selected = ?self.selection.current(), "dashboard started");
    }

    pub fn on_stop(&mut self) {
        self.workers.shutdown();
        info!("dashboard stopped");
    }

    pub fn select(&mut self, identity: &str) -> SelectionChange {
        let change = self.selection.select(&mut self.registry, identity);
        if change.is_changed() {
            self.run_log_task();
        }
        change
    }

    pub fn select_step(&mut self, step: isize) -> SelectionChange {
        let change = self.selection.step(&mut self.registry, step);
        if change.is_changed() {
            self.run_log_task();
        }
        change
    }

    pub fn selected(&self) -> Option<&ContainerRecord> {
        self.selection.current().and_then(|id| self.registry.get(id))
    }

    /// Supersede the running tail and stats poll with fresh ones for the current
    /// selection. Safe to call any number of times in a row.
    pub fn run_log_task(&mut self) {
        let target = self.selected().cloned();
        let generation = self.workers.restart(target.as_ref());
        let title = target.as_ref().map(|r| r.display_name.as_str()).unwrap_or("");
        self.log_pane.reset(generation, title);
        self.stats.reset(generation);

        let tab = self.detail.tab;
        self.detail.begin(tab, generation);
        if let Some(record) = &target {
            self.workers.spawn_detail(record, tab, generation);
        }
    }

    pub fn show_tab(&mut self, tab: ContentTab) {
        let generation = self.workers.generation();
        self.detail.begin(tab, generation);
        if let Some(record) = self.selected().cloned() {
            self.workers.spawn_detail(&record, tab, generation);
        }
    }

    /// Issue `action` against the selected container.
    pub fn command(&mut self, action: ContainerAction) -> bool {
        match self.selection.current().map(str::to_string) {
            Some(identity) => self.command_for(&identity, action),
            None => false,
        }
    }

    /// Issue `action` against `identity`. Returns false if it is no longer listed.
    pub fn command_for(&mut self, identity: &str, action: ContainerAction) -> bool {
        let Some(record) = self.registry.get(identity).cloned() else {
            return false;
        };
        if matches!(action, ContainerAction::Stop | ContainerAction::Restart) && record.status.is_running() {
            self.registry.update_status(&record.identity, ContainerStatus::Stopping);
        }
        debug!(container = %record.identity, action = action.verb(), "command issued");
        self.workers.spawn_action(&record, action);
        true
    }

    /// Start every stopped container, or stop every running one.
    pub fn command_all(&mut self, action: ContainerAction) -> usize {
        let targets: Vec<ContainerRecord> = self
            .registry
            .ordered()
            .into_iter()
            .filter(|r| match action {
                ContainerAction::Start => !r.status.is_running(),
                ContainerAction::Stop => r.status.is_running(),
                ContainerAction::Restart | ContainerAction::Remove => false,
            })
            .cloned()
            .collect();
        for record in &targets {
            if action == ContainerAction::Stop {
                self.registry.update_status(&record.identity, ContainerStatus::Stopping);
            }
            self.workers.spawn_action(record, action);
        }
        targets.len()
    }

    pub fn notify(&mut self, title: impl Into<String>, message: impl Into<String>, severity: Severity) {
        self.notifications.push(title, message, severity);
    }

    /// Follow a selection change made by reconciliation.
    pub(super) fn apply_selection(&mut self, change: SelectionChange) {
        if change.is_changed() {
            self.run_log_task();
        }
    }
}
