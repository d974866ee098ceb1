use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;

use super::{Dashboard, InitialState};
use crate::config::Config;
use crate::engine::Engine;
use crate::engine::memory::MemoryEngine;
use crate::scheduler::{self, UiQueue};
use crate::tasks::{TaskSettings, Workers};

pub(crate) fn settings() -> TaskSettings {
    let mut settings = TaskSettings::from(&Config::default());
    settings.log_poll_interval = Duration::from_millis(20);
    settings.stats_interval = Duration::from_millis(20);
    settings
}

/// A dashboard over `engine` listing every container, without `on_start`.
pub(crate) fn shared_dashboard(engine: Arc<MemoryEngine>) -> (Runtime, Dashboard, UiQueue<Dashboard>) {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let containers = rt.block_on(engine.list_containers(true)).unwrap();
    let (sched, queue) = scheduler::channel();
    let workers = Workers::new(engine, sched, rt.handle().clone(), settings());
    let dash = Dashboard::new(
        InitialState {
            containers,
            images: Vec::new(),
        },
        workers,
        500,
    );
    (rt, dash, queue)
}

pub(crate) fn dashboard(engine: MemoryEngine) -> (Runtime, Dashboard, UiQueue<Dashboard>) {
    shared_dashboard(Arc::new(engine))
}
