//! The narrow contract between the dashboard and the container engine.
//!
//! [`DockerEngine`](crate::docker::DockerEngine) implements it against the
//! local daemon; [`memory::MemoryEngine`] is a scriptable stand-in.

pub mod memory;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde_json::Value;

use crate::error::Result;
use crate::model::{ContainerRecord, ImageRecord};

/// Lifecycle transitions the reconciliation loop reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleAction {
    Start,
    Stop,
    Die,
    Destroy,
}

impl LifecycleAction {
    /// Map the engine's event action string. Anything else (exec_start, attach,
    /// health_status...) is not a lifecycle transition.
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "start" => Some(LifecycleAction::Start),
            "stop" => Some(LifecycleAction::Stop),
            "die" => Some(LifecycleAction::Die),
            "destroy" => Some(LifecycleAction::Destroy),
            _ => None,
        }
    }
}

/// A container event as delivered by the engine's event stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineEvent {
    pub action: LifecycleAction,
    /// Container name, the registry identity.
    pub identity: String,
    /// Container id.
    pub handle: String,
}

impl EngineEvent {
    pub fn new(action: LifecycleAction, identity: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            action,
            identity: identity.into(),
            handle: handle.into(),
        }
    }
}

/// Snapshot log read parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogQuery {
    /// Only the last N lines. `None` means everything matching `since`.
    pub tail: Option<usize>,
    /// Unix seconds; only output at or after this time.
    pub since: Option<i64>,
}

impl LogQuery {
    pub fn tail(lines: usize) -> Self {
        Self { tail: Some(lines), since: None }
    }

    pub fn since(timestamp: i64) -> Self {
        Self { tail: None, since: Some(timestamp) }
    }
}

/// One-off commands issued from the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerAction {
    Start,
    Stop,
    Restart,
    Remove,
}

impl ContainerAction {
    pub fn verb(self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Restart => "restart",
            ContainerAction::Remove => "remove",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            ContainerAction::Start => "Started",
            ContainerAction::Stop => "Stopped",
            ContainerAction::Restart => "Restarted",
            ContainerAction::Remove => "Removed",
        }
    }
}

#[async_trait]
pub trait Engine: Send + Sync {
    /// List containers. Failure here means the engine is unreachable.
    async fn list_containers(&self, include_stopped: bool) -> Result<Vec<ContainerRecord>>;

    async fn list_images(&self) -> Result<Vec<ImageRecord>>;

    /// Non-streaming log read, split into lines.
    async fn fetch_logs(&self, handle: &str, query: LogQuery) -> Result<Vec<String>>;

    /// Follow a container's output starting with the last `tail` lines. The
    /// stream ends when the container stops or the connection drops.
    fn stream_logs(&self, handle: &str, tail: usize) -> BoxStream<'static, Result<String>>;

    /// Container lifecycle events, in engine emission order.
    fn events(&self) -> BoxStream<'static, Result<EngineEvent>>;

    /// One raw stats document (`cpu_stats`, `memory_stats`, ...).
    async fn fetch_stats(&self, handle: &str) -> Result<Value>;

    /// Raw inspect document for the attributes and environment tabs.
    async fn inspect(&self, handle: &str) -> Result<Value>;

    async fn apply(&self, handle: &str, action: ContainerAction) -> Result<()>;
}

/// Split one raw log chunk into display lines.
pub fn chunk_lines(chunk: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(chunk)
        .lines()
        .map(|l| l.trim_end().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_lifecycle_actions_parse() {
        assert_eq!(LifecycleAction::parse("start"), Some(LifecycleAction::Start));
        assert_eq!(LifecycleAction::parse("destroy"), Some(LifecycleAction::Destroy));
        assert_eq!(LifecycleAction::parse("exec_start: sh"), None);
        assert_eq!(LifecycleAction::parse("health_status: healthy"), None);
    }

    #[test]
    fn chunk_is_split_and_trimmed() {
        let lines = chunk_lines(b"one\r\ntwo  \nthree");
        assert_eq!(lines, vec!["one", "two", "three"]);
    }
}
