use std::time::{Duration, Instant};

use crate::engine::ContainerAction;

/// How long a confirmation prompt waits for `y`.
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(5);

/// Destructive action awaiting confirmation.
pub struct PendingAction {
    pub description: String,
    pub kind: PendingActionKind,
    pub expires: Instant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingActionKind {
    /// One container, by identity.
    Container(String, ContainerAction),
    StopAll,
}

impl PendingAction {
    pub fn container(identity: &str, action: ContainerAction) -> Self {
        Self::new(
            format!("{} container '{}'?", capitalize(action.verb()), identity),
            PendingActionKind::Container(identity.to_string(), action),
        )
    }

    pub fn stop_all(running: usize) -> Self {
        Self::new(
            format!("Stop all {} running container(s)?", running),
            PendingActionKind::StopAll,
        )
    }

    fn new(description: String, kind: PendingActionKind) -> Self {
        Self {
            description,
            kind,
            expires: Instant::now() + CONFIRM_TIMEOUT,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
