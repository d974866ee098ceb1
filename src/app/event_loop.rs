use std::time::Instant;

use super::App;

/// Upper bound on posted tasks applied between two frames.
const QUEUE_BUDGET: usize = 512;

impl App {
    /// Apply work posted by the background loops, oldest first.
    pub fn process_queue(&mut self) -> bool {
        self.queue.run_pending(&mut self.dashboard, QUEUE_BUDGET) > 0
    }

    /// Expire pending confirmation if timed out.
    pub fn expire_pending_action(&mut self) -> bool {
        let now = Instant::now();
        if self.pending_action.as_ref().is_some_and(|pa| pa.is_expired(now)) {
            self.pending_action = None;
            return true;
        }
        false
    }

    pub fn expire_notifications(&mut self) -> bool {
        self.dashboard.notifications.expire(Instant::now())
    }
}
