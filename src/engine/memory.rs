//! An in-process engine whose containers, logs, stats and events are scripted
//! by the caller. It mimics the daemon closely enough for the dashboard: actions
//! emit the same lifecycle events the real engine would, and every read is
//! recorded so callers can assert on what was asked for.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use serde_json::{Value, json};
use tokio::sync::mpsc;

use super::{ContainerAction, Engine, EngineEvent, LifecycleAction, LogQuery};
use crate::error::{PockerError, Result};
use crate::model::{ContainerRecord, ContainerStatus, ImageRecord};

type EventItem = Result<EngineEvent>;

struct MemoryContainer {
    id: String,
    name: String,
    state: String,
    image: String,
    logs: Vec<(i64, String)>,
    stats: Option<Value>,
    env: Vec<String>,
}

#[derive(Default)]
struct State {
    containers: Vec<MemoryContainer>,
    images: Vec<String>,
    failing: HashSet<String>,
}

impl State {
    fn find(&self, handle: &str) -> Option<&MemoryContainer> {
        self.containers.iter().find(|c| c.id == handle || c.name == handle)
    }

    fn find_mut(&mut self, handle: &str) -> Option<&mut MemoryContainer> {
        self.containers.iter_mut().find(|c| c.id == handle || c.name == handle)
    }
}

pub struct MemoryEngine {
    state: Mutex<State>,
    events_tx: Mutex<mpsc::UnboundedSender<EventItem>>,
    pending_rx: Mutex<Option<mpsc::UnboundedReceiver<EventItem>>>,
    reachable: AtomicBool,
    subscriptions: AtomicUsize,
    log_queries: Mutex<Vec<(String, LogQuery)>>,
    stats_requests: Mutex<Vec<String>>,
    applied: Mutex<Vec<(String, ContainerAction)>>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: Mutex::new(State::default()),
            events_tx: Mutex::new(tx),
            pending_rx: Mutex::new(Some(rx)),
            reachable: AtomicBool::new(true),
            subscriptions: AtomicUsize::new(0),
            log_queries: Mutex::new(Vec::new()),
            stats_requests: Mutex::new(Vec::new()),
            applied: Mutex::new(Vec::new()),
        }
    }

    /// Add a container. `state` is the engine's raw state string ("running", "exited").
    pub fn with_container(self, name: &str, id: &str, state: &str) -> Self {
        self.add_container(name, id, state);
        self
    }

    pub fn with_image(self, reference: &str) -> Self {
        self.lock().images.push(reference.to_string());
        self
    }

    pub fn add_container(&self, name: &str, id: &str, state: &str) {
        self.lock().containers.push(MemoryContainer {
            id: id.to_string(),
            name: name.to_string(),
            state: state.to_string(),
            image: format!("{}:latest", name),
            logs: Vec::new(),
            stats: None,
            env: Vec::new(),
        });
    }

    /// Make every call fail as if the daemon were down.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Make reads and actions against `handle` fail, as if it vanished mid-call.
    pub fn fail_handle(&self, handle: &str) {
        self.lock().failing.insert(handle.to_string());
    }

    pub fn push_log(&self, handle: &str, line: &str) {
        let now = chrono::Utc::now().timestamp();
        if let Some(c) = self.lock().find_mut(handle) {
            c.logs.push((now, line.to_string()));
        }
    }

    pub fn set_stats(&self, handle: &str, stats: Value) {
        if let Some(c) = self.lock().find_mut(handle) {
            c.stats = Some(stats);
        }
    }

    pub fn set_env(&self, handle: &str, env: &[&str]) {
        if let Some(c) = self.lock().find_mut(handle) {
            c.env = env.iter().map(|e| e.to_string()).collect();
        }
    }

    /// Deliver an event to the current subscriber.
    pub fn emit(&self, event: EngineEvent) {
        let tx = self.events_tx.lock().unwrap_or_else(|e| e.into_inner());
        let _ = tx.send(Ok(event));
    }

    /// End the current event stream. The next `events()` call subscribes afresh.
    pub fn disconnect_events(&self) {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.events_tx.lock().unwrap_or_else(|e| e.into_inner()) = tx;
        *self.pending_rx.lock().unwrap_or_else(|e| e.into_inner()) = Some(rx);
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    pub fn log_queries(&self) -> Vec<(String, LogQuery)> {
        self.log_queries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn stats_requests(&self) -> Vec<String> {
        self.stats_requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn applied(&self) -> Vec<(String, ContainerAction)> {
        self.applied.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_reachable(&self) -> Result<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PockerError::EngineUnavailable("memory engine is offline".into()))
        }
    }

    fn check_handle(&self, state: &State, operation: &'static str, handle: &str) -> Result<()> {
        self.check_reachable()?;
        if state.failing.contains(handle) || state.find(handle).is_none() {
            return Err(PockerError::operation_failed(operation, handle, "No such container"));
        }
        Ok(())
    }
}

#[async_trait]
impl Engine for MemoryEngine {
    async fn list_containers(&self, include_stopped: bool) -> Result<Vec<ContainerRecord>> {
        self.check_reachable()?;
        let state = self.lock();
        Ok(state
            .containers
            .iter()
            .filter(|c| include_stopped || c.state == "running")
            .map(|c| {
                ContainerRecord::new(c.name.clone(), c.id.clone(), ContainerStatus::from_engine_state(&c.state))
                    .with_image(c.image.clone())
            })
            .collect())
    }

    async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        self.check_reachable()?;
        Ok(self
            .lock()
            .images
            .iter()
            .filter_map(|r| ImageRecord::from_reference(r))
            .collect())
    }

    async fn fetch_logs(&self, handle: &str, query: LogQuery) -> Result<Vec<String>> {
        self.log_queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((handle.to_string(), query));
        let state = self.lock();
        self.check_handle(&state, "logs", handle)?;
        let Some(c) = state.find(handle) else {
            return Ok(Vec::new());
        };
        let matching: Vec<&String> = c
            .logs
            .iter()
            .filter(|(ts, _)| query.since.is_none_or(|since| *ts >= since))
            .map(|(_, line)| line)
            .collect();
        let skip = query.tail.map(|n| matching.len().saturating_sub(n)).unwrap_or(0);
        Ok(matching.into_iter().skip(skip).cloned().collect())
    }

    fn stream_logs(&self, handle: &str, tail: usize) -> BoxStream<'static, Result<String>> {
        // Replays the current tail and ends; there is no live producer to follow.
        let state = self.lock();
        if let Err(e) = self.check_handle(&state, "logs", handle) {
            return stream::iter(vec![Err(e)]).boxed();
        }
        let lines: Vec<Result<String>> = state
            .find(handle)
            .map(|c| {
                let skip = c.logs.len().saturating_sub(tail);
                c.logs.iter().skip(skip).map(|(_, l)| Ok(l.clone())).collect()
            })
            .unwrap_or_default();
        stream::iter(lines).boxed()
    }

    fn events(&self) -> BoxStream<'static, Result<EngineEvent>> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        if !self.reachable.load(Ordering::SeqCst) {
            return stream::iter(vec![Err(PockerError::StreamDisconnected(
                "memory engine is offline".into(),
            ))])
            .boxed();
        }
        let rx = self
            .pending_rx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let rx = match rx {
            Some(rx) => rx,
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                *self.events_tx.lock().unwrap_or_else(|e| e.into_inner()) = tx;
                rx
            }
        };
        stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) }).boxed()
    }

    async fn fetch_stats(&self, handle: &str) -> Result<Value> {
        self.stats_requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(handle.to_string());
        let state = self.lock();
        self.check_handle(&state, "stats", handle)?;
        Ok(state
            .find(handle)
            .and_then(|c| c.stats.clone())
            .unwrap_or_else(|| json!({})))
    }

    async fn inspect(&self, handle: &str) -> Result<Value> {
        let state = self.lock();
        self.check_handle(&state, "inspect", handle)?;
        let Some(c) = state.find(handle) else {
            return Ok(Value::Null);
        };
        Ok(json!({
            "Id": c.id,
            "Name": format!("/{}", c.name),
            "State": { "Status": c.state, "Running": c.state == "running" },
            "Config": { "Image": c.image, "Env": c.env },
        }))
    }

    async fn apply(&self, handle: &str, action: ContainerAction) -> Result<()> {
        self.applied
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((handle.to_string(), action));

        let mut events = Vec::new();
        {
            let mut state = self.lock();
            self.check_handle(&state, action.verb(), handle)?;
            let target = state.find_mut(handle).map(|c| {
                match action {
                    ContainerAction::Start | ContainerAction::Restart => c.state = "running".into(),
                    ContainerAction::Stop => c.state = "exited".into(),
                    ContainerAction::Remove => {}
                }
                (c.name.clone(), c.id.clone())
            });
            let Some((name, id)) = target else {
                return Ok(());
            };
            let ev = |a| EngineEvent::new(a, name.clone(), id.clone());
            match action {
                ContainerAction::Start => events.push(ev(LifecycleAction::Start)),
                ContainerAction::Stop => {
                    events.push(ev(LifecycleAction::Die));
                    events.push(ev(LifecycleAction::Stop));
                }
                ContainerAction::Restart => {
                    events.push(ev(LifecycleAction::Die));
                    events.push(ev(LifecycleAction::Stop));
                    events.push(ev(LifecycleAction::Start));
                }
                ContainerAction::Remove => {
                    state.containers.retain(|c| c.id != id);
                    events.push(ev(LifecycleAction::Die));
                    events.push(ev(LifecycleAction::Destroy));
                }
            }
        }
        for event in events {
            self.emit(event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listing_respects_visibility_filter() {
        let engine = MemoryEngine::new()
            .with_container("web", "w1", "running")
            .with_container("db", "d1", "exited");
        assert_eq!(engine.list_containers(false).await.unwrap().len(), 1);
        assert_eq!(engine.list_containers(true).await.unwrap().len(), 2);

        engine.set_reachable(false);
        assert!(matches!(
            engine.list_containers(true).await,
            Err(PockerError::EngineUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn fetch_logs_honours_tail() {
        let engine = MemoryEngine::new().with_container("web", "w1", "running");
        for i in 0..5 {
            engine.push_log("w1", &format!("line {}", i));
        }
        let lines = engine.fetch_logs("w1", LogQuery::tail(2)).await.unwrap();
        assert_eq!(lines, vec!["line 3", "line 4"]);
        assert_eq!(engine.log_queries(), vec![("w1".to_string(), LogQuery::tail(2))]);
    }

    #[tokio::test]
    async fn stop_emits_die_then_stop() {
        let engine = MemoryEngine::new().with_container("web", "w1", "running");
        let mut events = engine.events();
        engine.apply("w1", ContainerAction::Stop).await.unwrap();
        let first = events.next().await.unwrap().unwrap();
        let second = events.next().await.unwrap().unwrap();
        assert_eq!(first.action, LifecycleAction::Die);
        assert_eq!(second.action, LifecycleAction::Stop);
        assert_eq!(second.identity, "web");
    }

    #[tokio::test]
    async fn failing_handle_errors() {
        let engine = MemoryEngine::new().with_container("web", "w1", "running");
        engine.fail_handle("w1");
        assert!(matches!(
            engine.fetch_stats("w1").await,
            Err(PockerError::EngineOperationFailed { .. })
        ));
    }
}
