//! Stats polling for the selected container. One sample per tick; a failed
//! fetch or a malformed sample shows N/A and the loop carries on.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::pause;
use crate::app::Dashboard;
use crate::engine::Engine;
use crate::model::{Generation, StatsReading, parse_stats};
use crate::scheduler::UiScheduler;

pub(crate) struct StatsJob {
    pub engine: Arc<dyn Engine>,
    pub scheduler: UiScheduler<Dashboard>,
    pub handle: String,
    pub generation: Generation,
    pub token: CancellationToken,
    pub interval: Duration,
}

pub(crate) async fn live_statistics_task(job: StatsJob) {
    let mut failing = false;
    loop {
        let fetched = tokio::select! {
            _ = job.token.cancelled() => return,
            res = job.engine.fetch_stats(&job.handle) => res,
        };
        let reading = match fetched {
            Ok(raw) => {
                failing = false;
                parse_stats(&raw)
            }
            Err(e) => {
                if !failing {
                    warn!(handle = %job.handle, error = %e, "stats fetch failed; retrying next tick");
                }
                failing = true;
                StatsReading::Unavailable
            }
        };

        if job.token.is_cancelled() {
            return;
        }
        let generation = job.generation;
        let posted = job.scheduler.post(move |d: &mut Dashboard| {
            d.stats.update(generation, reading);
        });
        if !posted {
            debug!(handle = %job.handle, "ui gone; stats poll exiting");
            return;
        }
        if !pause(&job.token, job.interval).await {
            return;
        }
    }
}
