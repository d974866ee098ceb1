//! Shared harness: a dashboard over the in-memory engine, with its UI queue
//! pumped on the test thread the way the terminal loop does it.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pocker::app::{Dashboard, InitialState, load_initial};
use pocker::config::Config;
use pocker::engine::Engine;
use pocker::engine::memory::MemoryEngine;
use pocker::scheduler::{self, UiQueue};
use pocker::tasks::{TaskSettings, Workers};
use tokio::runtime::Runtime;

pub struct Harness {
    pub engine: Arc<MemoryEngine>,
    pub dash: Dashboard,
    pub queue: UiQueue<Dashboard>,
    // Last so it outlives the workers.
    _rt: Runtime,
}

pub fn config() -> Config {
    Config {
        log_tail: 3,
        show_all_containers: true,
        log_poll_interval_ms: 20,
        stats_poll_interval_secs: 0.02,
        ..Config::default()
    }
}

pub fn harness(engine: MemoryEngine, config: &Config) -> Harness {
    let engine = Arc::new(engine);
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let initial: InitialState = rt
        .block_on(load_initial(engine.as_ref(), config.show_all_containers, Path::new("pocker.toml")))
        .unwrap();
    let (sched, queue) = scheduler::channel();
    let shared: Arc<dyn Engine> = engine.clone();
    let workers = Workers::new(shared, sched, rt.handle().clone(), TaskSettings::from(config));
    let dash = Dashboard::new(initial, workers, config.max_log_lines);
    Harness {
        engine,
        dash,
        queue,
        _rt: rt,
    }
}

impl Harness {
    /// Run posted tasks until `cond` holds or five seconds pass.
    pub fn pump_until(&mut self, mut cond: impl FnMut(&Dashboard, &MemoryEngine) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond(&self.dash, &self.engine) {
                return true;
            }
            self.queue.run_one_timeout(&mut self.dash, Duration::from_millis(20));
        }
        cond(&self.dash, &self.engine)
    }

    /// Run posted tasks for `period` regardless of what they do.
    pub fn pump_for(&mut self, period: Duration) {
        let deadline = Instant::now() + period;
        while Instant::now() < deadline {
            self.queue.run_one_timeout(&mut self.dash, Duration::from_millis(10));
        }
    }

    pub fn pane_lines(&self) -> Vec<String> {
        self.dash.log_pane.lines().cloned().collect()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.dash.on_stop();
    }
}
