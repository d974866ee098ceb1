use std::fmt;

/// Lifecycle status as shown in the container list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerStatus {
    Running,
    /// A `stop` event arrived but the container has not died yet.
    Stopping,
    Down,
}

impl ContainerStatus {
    /// Two-valued classification of the engine's raw state string. Everything
    /// that is not actively running (paused, restarting, exited, created...) is down.
    pub fn from_engine_state(state: &str) -> Self {
        if state.eq_ignore_ascii_case("running") {
            ContainerStatus::Running
        } else {
            ContainerStatus::Down
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContainerStatus::Running => "running",
            ContainerStatus::Stopping => "stopping",
            ContainerStatus::Down => "down",
        }
    }

    pub fn is_running(self) -> bool {
        self == ContainerStatus::Running
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ContainerRecord {
    /// Registry key: the container name.
    pub identity: String,
    pub display_name: String,
    pub status: ContainerStatus,
    pub selected: bool,
    /// Engine-side reference (container id) used for every operation.
    pub handle: String,
    pub image: String,
}

impl ContainerRecord {
    pub fn new(identity: impl Into<String>, handle: impl Into<String>, status: ContainerStatus) -> Self {
        let identity = identity.into();
        Self {
            display_name: identity.clone(),
            identity,
            status,
            selected: false,
            handle: handle.into(),
            image: String::new(),
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_state_is_two_valued() {
        assert_eq!(ContainerStatus::from_engine_state("running"), ContainerStatus::Running);
        assert_eq!(ContainerStatus::from_engine_state("exited"), ContainerStatus::Down);
        assert_eq!(ContainerStatus::from_engine_state("paused"), ContainerStatus::Down);
        assert_eq!(ContainerStatus::from_engine_state("restarting"), ContainerStatus::Down);
        assert_eq!(ContainerStatus::from_engine_state(""), ContainerStatus::Down);
    }

    #[test]
    fn new_record_uses_identity_as_display_name() {
        let rec = ContainerRecord::new("web", "abc123", ContainerStatus::Running);
        assert_eq!(rec.display_name, "web");
        assert!(!rec.selected);
    }
}
