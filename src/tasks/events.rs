//! The event reconciliation loop.
//!
//! Consumes the engine's event stream one event at a time and posts each one
//! to the UI thread, where [`Dashboard::handle_event`] applies it. The queue is
//! FIFO, so per-container ordering is exactly the engine's emission order.
//!
//! When the stream fails or ends, the loop resubscribes with exponential
//! backoff. A delivered event resets the retry budget; once the budget is spent
//! the loop reports the disconnect and stops.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::pause;
use crate::app::Dashboard;
use crate::engine::Engine;
use crate::error::PockerError;
use crate::model::Severity;
use crate::scheduler::UiScheduler;

#[derive(Clone, Debug, PartialEq)]
pub struct ResubscribePolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for ResubscribePolicy {
    fn default() -> Self {
        Self::with_attempts(5)
    }
}

impl ResubscribePolicy {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }

    /// Delay before resubscription attempt `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

pub(crate) async fn run_event_loop(
    engine: Arc<dyn Engine>,
    scheduler: UiScheduler<Dashboard>,
    policy: ResubscribePolicy,
    shutdown: CancellationToken,
) {
    let mut failures: u32 = 0;
    loop {
        let mut stream = engine.events();
        info!(attempt = failures, "subscribed to engine events");

        let reason = loop {
            let next = tokio::select! {
                _ = shutdown.cancelled() => return,
                next = stream.next() => next,
            };
            match next {
                Some(Ok(event)) => {
                    failures = 0;
                    debug!(identity = %event.identity, action = ?event.action, "engine event");
                    if !scheduler.post(move |d: &mut Dashboard| d.handle_event(event)) {
                        return;
                    }
                }
                Some(Err(e)) => break e.to_string(),
                None => break "event stream ended".to_string(),
            }
        };

        failures += 1;
        if failures > policy.max_attempts {
            let err = PockerError::StreamDisconnected(reason);
            error!(error = %err, "giving up on engine events");
            scheduler.post(move |d: &mut Dashboard| {
                d.notify(
                    "Live updates stopped",
                    format!("{}; container status will no longer refresh", err),
                    Severity::Error,
                );
            });
            return;
        }

        let delay = policy.backoff(failures);
        warn!(reason = %reason, attempt = failures, delay_ms = delay.as_millis() as u64, "resubscribing to engine events");
        if !pause(&shutdown, delay).await {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::MemoryEngine;
    use crate::engine::{EngineEvent, LifecycleAction};
    use crate::scheduler;

    fn quick_policy(max_attempts: u32) -> ResubscribePolicy {
        ResubscribePolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(20),
        }
    }

    async fn wait_for(mut cond: impl FnMut() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn resubscribes_after_stream_ends() {
        let engine = Arc::new(MemoryEngine::new().with_container("web", "w1", "running"));
        let (sched, queue) = scheduler::channel::<Dashboard>();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run_event_loop(
            Arc::clone(&engine) as Arc<dyn Engine>,
            sched,
            quick_policy(3),
            shutdown.clone(),
        ));

        wait_for(|| engine.subscriptions() == 1).await;
        engine.disconnect_events();
        wait_for(|| engine.subscriptions() == 2).await;

        engine.emit(EngineEvent::new(LifecycleAction::Die, "web", "w1"));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(queue.discard_pending(), 1);

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn delivered_event_resets_retry_budget() {
        let engine = Arc::new(MemoryEngine::new().with_container("web", "w1", "running"));
        let (sched, queue) = scheduler::channel::<Dashboard>();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run_event_loop(
            Arc::clone(&engine) as Arc<dyn Engine>,
            sched,
            quick_policy(1),
            shutdown.clone(),
        ));

        wait_for(|| engine.subscriptions() == 1).await;
        engine.disconnect_events();
        wait_for(|| engine.subscriptions() == 2).await;
        engine.emit(EngineEvent::new(LifecycleAction::Die, "web", "w1"));
        tokio::time::sleep(Duration::from_millis(30)).await;

        // A second drop would exhaust a budget of one without the reset.
        engine.disconnect_events();
        wait_for(|| engine.subscriptions() == 3).await;
        engine.emit(EngineEvent::new(LifecycleAction::Start, "web", "w1"));
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(!task.is_finished());
        assert_eq!(engine.subscriptions(), 3);
        // Both events, no disconnect notification.
        assert_eq!(queue.discard_pending(), 2);

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn gives_up_after_budget_and_reports() {
        let engine = Arc::new(MemoryEngine::new());
        engine.set_reachable(false);
        let (sched, queue) = scheduler::channel::<Dashboard>();

        tokio::time::timeout(
            Duration::from_secs(2),
            run_event_loop(
                Arc::clone(&engine) as Arc<dyn Engine>,
                sched,
                quick_policy(2),
                CancellationToken::new(),
            ),
        )
        .await
        .expect("loop should stop on its own");

        assert_eq!(engine.subscriptions(), 3);
        // Only the disconnect notification.
        assert_eq!(queue.discard_pending(), 1);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = ResubscribePolicy::with_attempts(10);
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(4), Duration::from_secs(8));
        assert_eq!(policy.backoff(6), Duration::from_secs(30));
        assert_eq!(policy.backoff(40), Duration::from_secs(30));
    }
}
