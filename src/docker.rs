use std::collections::HashMap;

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{
    InspectContainerOptions, ListContainersOptions, LogOutput, LogsOptions,
    RemoveContainerOptions, RestartContainerOptions, StatsOptions, StopContainerOptions,
};
use bollard::image::ListImagesOptions;
use bollard::models::{ContainerSummary, EventMessage, EventMessageTypeEnum};
use bollard::system::EventsOptions;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde_json::Value;
use tracing::{debug, info};

use crate::engine::{ContainerAction, Engine, EngineEvent, LifecycleAction, LogQuery, chunk_lines};
use crate::error::{PockerError, Result};
use crate::model::{ContainerRecord, ImageRecord};
use crate::registry::Registry;

/// Grace period handed to the daemon on stop/restart.
const STOP_TIMEOUT_SECS: i64 = 10;

/// Engine adapter over bollard's Docker client.
pub struct DockerEngine {
    client: Docker,
}

impl DockerEngine {
    /// Connect to the local daemon and ping it. Failure is fatal at startup.
    pub async fn connect() -> Result<Self> {
        let client = Docker::connect_with_local_defaults()
            .map_err(|e| PockerError::EngineUnavailable(e.to_string()))?;
        client
            .ping()
            .await
            .map_err(|e| PockerError::EngineUnavailable(e.to_string()))?;
        info!("connected to docker daemon");
        Ok(Self { client })
    }
}

#[async_trait]
impl Engine for DockerEngine {
    async fn list_containers(&self, include_stopped: bool) -> Result<Vec<ContainerRecord>> {
        let options: ListContainersOptions<String> = ListContainersOptions {
            all: include_stopped,
            ..Default::default()
        };

        let summaries = self
            .client
            .list_containers(Some(options))
            .await
            .map_err(|e| PockerError::EngineUnavailable(e.to_string()))?;

        Ok(summaries.iter().map(summary_to_record).collect())
    }

    async fn list_images(&self) -> Result<Vec<ImageRecord>> {
        let options: ListImagesOptions<String> = ListImagesOptions {
            all: true,
            ..Default::default()
        };
        let images = self
            .client
            .list_images(Some(options))
            .await
            .map_err(|e| PockerError::operation_failed("list images", "engine", e))?;

        Ok(images
            .iter()
            .filter_map(|img| img.repo_tags.first())
            .filter_map(|reference| ImageRecord::from_reference(reference))
            .collect())
    }

    async fn fetch_logs(&self, handle: &str, query: LogQuery) -> Result<Vec<String>> {
        let options: LogsOptions<String> = LogsOptions {
            stdout: true,
            stderr: true,
            follow: false,
            since: query.since.unwrap_or(0),
            tail: query
                .tail
                .map(|n| n.to_string())
                .unwrap_or_else(|| "all".to_string()),
            ..Default::default()
        };

        let mut stream = self.client.logs(handle, Some(options));
        let mut lines = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| PockerError::operation_failed("logs", handle, e))?;
            if let Some(bytes) = output_bytes(&chunk) {
                lines.extend(chunk_lines(bytes));
            }
        }
        Ok(lines)
    }

    fn stream_logs(&self, handle: &str, tail: usize) -> BoxStream<'static, Result<String>> {
        let options: LogsOptions<String> = LogsOptions {
            stdout: true,
            stderr: true,
            follow: true,
            tail: tail.to_string(),
            ..Default::default()
        };
        let target = handle.to_string();

        self.client
            .logs(handle, Some(options))
            .flat_map(move |chunk| {
                let items: Vec<Result<String>> = match chunk {
                    Ok(output) => output_bytes(&output)
                        .map(|bytes| chunk_lines(bytes).into_iter().map(Ok).collect())
                        .unwrap_or_default(),
                    Err(e) => vec![Err(PockerError::StreamDisconnected(format!(
                        "logs for {}: {}",
                        target, e
                    )))],
                };
                futures_util::stream::iter(items)
            })
            .boxed()
    }

    fn events(&self) -> BoxStream<'static, Result<EngineEvent>> {
        let mut filters = HashMap::new();
        filters.insert("type".to_string(), vec!["container".to_string()]);
        let options = EventsOptions::<String> {
            filters,
            ..Default::default()
        };

        self.client
            .events(Some(options))
            .filter_map(|message| async move {
                match message {
                    Ok(msg) => message_to_event(&msg).map(Ok),
                    Err(e) => Some(Err(PockerError::StreamDisconnected(e.to_string()))),
                }
            })
            .boxed()
    }

    async fn fetch_stats(&self, handle: &str) -> Result<Value> {
        let options = StatsOptions {
            stream: false,
            one_shot: true,
        };

        let mut stream = self.client.stats(handle, Some(options));
        match stream.next().await {
            Some(Ok(stats)) => serde_json::to_value(&stats)
                .map_err(|e| PockerError::operation_failed("stats", handle, e)),
            Some(Err(e)) => Err(PockerError::operation_failed("stats", handle, e)),
            None => Err(PockerError::operation_failed("stats", handle, "empty stats stream")),
        }
    }

    async fn inspect(&self, handle: &str) -> Result<Value> {
        let details = self
            .client
            .inspect_container(handle, None::<InspectContainerOptions>)
            .await
            .map_err(|e| PockerError::operation_failed("inspect", handle, e))?;
        serde_json::to_value(&details).map_err(|e| PockerError::operation_failed("inspect", handle, e))
    }

    async fn apply(&self, handle: &str, action: ContainerAction) -> Result<()> {
        debug!(handle, action = action.verb(), "container action");
        let result = match action {
            ContainerAction::Start => self.client.start_container::<String>(handle, None).await,
            ContainerAction::Stop => {
                let options = StopContainerOptions { t: STOP_TIMEOUT_SECS };
                self.client.stop_container(handle, Some(options)).await
            }
            ContainerAction::Restart => {
                let options = RestartContainerOptions { t: STOP_TIMEOUT_SECS as isize };
                self.client.restart_container(handle, Some(options)).await
            }
            ContainerAction::Remove => {
                let options = RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                };
                self.client.remove_container(handle, Some(options)).await
            }
        };
        result.map_err(|e| PockerError::operation_failed(action.verb(), handle, e))
    }
}

// --- Free helper functions ---

fn output_bytes(output: &LogOutput) -> Option<&[u8]> {
    match output {
        LogOutput::StdOut { message }
        | LogOutput::StdErr { message }
        | LogOutput::Console { message } => Some(message.as_ref()),
        LogOutput::StdIn { .. } => None,
    }
}

fn summary_to_record(s: &ContainerSummary) -> ContainerRecord {
    let id = s.id.clone().unwrap_or_default();

    let name = s
        .names
        .as_ref()
        .and_then(|n| n.first())
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_else(|| id.chars().take(12).collect());

    let state = s.state.clone().unwrap_or_default();

    ContainerRecord::new(name, id, Registry::status_of(&state))
        .with_image(s.image.clone().unwrap_or_default())
}

fn message_to_event(msg: &EventMessage) -> Option<EngineEvent> {
    if msg.typ != Some(EventMessageTypeEnum::CONTAINER) {
        return None;
    }
    let action = LifecycleAction::parse(msg.action.as_deref()?)?;
    let actor = msg.actor.as_ref()?;
    let handle = actor.id.clone().unwrap_or_default();
    let name = actor
        .attributes
        .as_ref()
        .and_then(|attrs| attrs.get("name"))
        .cloned()
        .unwrap_or_else(|| handle.chars().take(12).collect());
    Some(EngineEvent::new(action, name, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::EventActor;

    fn message(typ: EventMessageTypeEnum, action: &str, name: &str) -> EventMessage {
        let mut attributes = HashMap::new();
        attributes.insert("name".to_string(), name.to_string());
        EventMessage {
            typ: Some(typ),
            action: Some(action.to_string()),
            actor: Some(EventActor {
                id: Some("0123456789abcdef".to_string()),
                attributes: Some(attributes),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn container_lifecycle_message_maps_to_event() {
        let ev = message_to_event(&message(EventMessageTypeEnum::CONTAINER, "die", "web")).unwrap();
        assert_eq!(ev, EngineEvent::new(LifecycleAction::Die, "web", "0123456789abcdef"));
    }

    #[test]
    fn other_messages_are_ignored() {
        assert!(message_to_event(&message(EventMessageTypeEnum::NETWORK, "destroy", "net")).is_none());
        assert!(message_to_event(&message(EventMessageTypeEnum::CONTAINER, "exec_start: sh", "web")).is_none());
    }

    #[test]
    fn summary_uses_trimmed_name_and_state() {
        let summary = ContainerSummary {
            id: Some("abcdef0123456789".to_string()),
            names: Some(vec!["/web".to_string()]),
            image: Some("nginx:latest".to_string()),
            state: Some("running".to_string()),
            ..Default::default()
        };
        let rec = summary_to_record(&summary);
        assert_eq!(rec.identity, "web");
        assert_eq!(rec.handle, "abcdef0123456789");
        assert!(rec.status.is_running());
        assert_eq!(rec.image, "nginx:latest");
    }
}
