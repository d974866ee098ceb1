//! Log tailing for the selected container.
//!
//! A tail writes to the log pane only while its token is live, and every write is
//! tagged with its generation so the pane can drop anything that slips through
//! after a newer tail started. A failed fetch (container gone mid-stream) cancels
//! the tail's own token and ends it quietly; the pane keeps what it already has.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::pause;
use crate::app::Dashboard;
use crate::engine::{Engine, LogQuery};
use crate::error::PockerError;
use crate::model::Generation;
use crate::scheduler::UiScheduler;

pub(crate) struct TailJob {
    pub engine: Arc<dyn Engine>,
    pub scheduler: UiScheduler<Dashboard>,
    pub handle: String,
    pub generation: Generation,
    pub token: CancellationToken,
    pub tail: usize,
    pub poll_interval: Duration,
}

impl TailJob {
    /// Hand lines to the UI. Returns false once this tail must stop writing.
    fn write(&self, lines: Vec<String>) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        if lines.is_empty() {
            return true;
        }
        let generation = self.generation;
        self.scheduler.post(move |d: &mut Dashboard| {
            d.log_pane.append(generation, lines);
        })
    }

    fn stop(&self, reason: &PockerError) {
        debug!(handle = %self.handle, generation = self.generation.0, error = %reason, "log tail stopped");
        self.token.cancel();
    }
}

/// Snapshot the last `tail` lines, then re-fetch with `since=<last fetch>` on a
/// fixed interval.
///
/// Delivery is at-least-once: `since` is captured before each fetch and has
/// one-second resolution, so lines near a poll boundary can show up twice.
pub(crate) async fn poll_tail(job: TailJob) {
    let mut since = chrono::Utc::now().timestamp();
    let initial = tokio::select! {
        _ = job.token.cancelled() => return,
        res = job.engine.fetch_logs(&job.handle, LogQuery::tail(job.tail)) => res,
    };
    match initial {
        Ok(lines) => {
            if !job.write(lines) {
                return;
            }
        }
        Err(e) => return job.stop(&e),
    }

    loop {
        if !pause(&job.token, job.poll_interval).await {
            return;
        }
        let fetched_at = chrono::Utc::now().timestamp();
        let fetched = tokio::select! {
            _ = job.token.cancelled() => return,
            res = job.engine.fetch_logs(&job.handle, LogQuery::since(since)) => res,
        };
        match fetched {
            Ok(lines) if lines.is_empty() => {}
            Ok(lines) => {
                if !job.write(lines) {
                    return;
                }
                since = fetched_at;
            }
            Err(e) => return job.stop(&e),
        }
    }
}

/// Hold one streaming read open, starting with the last `tail` lines.
pub(crate) async fn follow_tail(job: TailJob) {
    let mut stream = job.engine.stream_logs(&job.handle, job.tail).ready_chunks(256);
    loop {
        let batch = tokio::select! {
            _ = job.token.cancelled() => return,
            batch = stream.next() => batch,
        };
        let Some(batch) = batch else {
            return job.stop(&PockerError::StreamDisconnected(format!("logs for {} ended", job.handle)));
        };

        let mut lines = Vec::with_capacity(batch.len());
        let mut failure = None;
        for item in batch {
            match item {
                Ok(line) => lines.push(line),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if !job.write(lines) {
            return;
        }
        if let Some(e) = failure {
            return job.stop(&e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::MemoryEngine;
    use crate::scheduler;

    fn job(engine: Arc<MemoryEngine>, token: CancellationToken) -> (TailJob, crate::scheduler::UiQueue<Dashboard>) {
        let (sched, queue) = scheduler::channel::<Dashboard>();
        let job = TailJob {
            engine,
            scheduler: sched,
            handle: "w1".into(),
            generation: Generation(1),
            token,
            tail: 10,
            poll_interval: Duration::from_millis(20),
        };
        (job, queue)
    }

    #[tokio::test]
    async fn failed_fetch_cancels_own_token() {
        let engine = Arc::new(MemoryEngine::new().with_container("web", "w1", "running"));
        engine.fail_handle("w1");
        let token = CancellationToken::new();
        let (job, _queue) = job(engine, token.clone());

        poll_tail(job).await;
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_tail_never_posts() {
        let engine = Arc::new(MemoryEngine::new().with_container("web", "w1", "running"));
        engine.push_log("w1", "hello");
        let token = CancellationToken::new();
        token.cancel();
        let (job, queue) = job(Arc::clone(&engine), token);

        poll_tail(job).await;
        assert_eq!(queue.discard_pending(), 0);
    }

    #[tokio::test]
    async fn follow_stops_when_stream_ends() {
        let engine = Arc::new(MemoryEngine::new().with_container("web", "w1", "running"));
        engine.push_log("w1", "one");
        engine.push_log("w1", "two");
        let token = CancellationToken::new();
        let (job, queue) = job(engine, token.clone());

        follow_tail(job).await;
        assert!(token.is_cancelled());
        assert_eq!(queue.discard_pending(), 1);
    }
}
