// Plain data types shared by the registry, the background loops and the view.

pub use container::{ContainerRecord, ContainerStatus};
pub use content::{ContentTab, DetailPane, environment_lines, json_lines};
pub use image::ImageRecord;
pub use logs::LogPane;
pub use notice::{Notification, Notifications, Severity};
pub use stats::{StatsPanel, StatsReading, parse_stats};

mod container;
mod content;
mod image;
mod logs;
mod notice;
mod stats;

/// Identifies one round of selection-bound background work. Bumped on every
/// selection change; results carrying an older value are discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}
