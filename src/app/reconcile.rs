//! Applies engine lifecycle events to the registry, one at a time, in the order
//! the event loop posted them.

use tracing::{debug, info};

use crate::engine::{EngineEvent, LifecycleAction};
use crate::model::ContainerStatus;

use super::Dashboard;

impl Dashboard {
    pub fn handle_event(&mut self, event: EngineEvent) {
        let EngineEvent { action, identity, handle } = event;
        let is_selected = self.selection.current() == Some(identity.as_str());
        let mut resume_tail = false;

        match action {
            LifecycleAction::Start => {
                if self.registry.upsert(&identity, &handle, ContainerStatus::Running) {
                    info!(container = %identity, "new container observed");
                } else {
                    // A follow-mode tail ends with its container; pick it back up.
                    resume_tail = is_selected && self.workers.tail_stopped();
                }
            }
            LifecycleAction::Stop => {
                // Docker sends `stop` after `die`; only a running container can be stopping.
                if self.registry.get(&identity).is_some_and(|r| r.status.is_running()) {
                    self.registry.update_status(&identity, ContainerStatus::Stopping);
                }
            }
            LifecycleAction::Die => {
                self.registry.update_status(&identity, ContainerStatus::Down);
            }
            LifecycleAction::Destroy => {
                if self.registry.remove(&identity).is_some() {
                    info!(container = %identity, "container removed");
                } else {
                    debug!(container = %identity, "destroy for unknown container");
                }
            }
        }

        let change = self.selection.revalidate(&mut self.registry);
        if change.is_changed() {
            self.apply_selection(change);
        } else if resume_tail {
            self.run_log_task();
        }
    }
}
