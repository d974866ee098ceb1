use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub expires: Instant,
}

/// Toast notifications for non-fatal conditions.
pub struct Notifications {
    queue: VecDeque<Notification>,
    ttl: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(6))
    }
}

impl Notifications {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            ttl,
        }
    }

    pub fn push(&mut self, title: impl Into<String>, message: impl Into<String>, severity: Severity) {
        if self.queue.len() >= 16 {
            self.queue.pop_front();
        }
        self.queue.push_back(Notification {
            title: title.into(),
            message: message.into(),
            severity,
            expires: Instant::now() + self.ttl,
        });
    }

    /// Drop expired toasts. Returns true if anything was removed.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.queue.len();
        self.queue.retain(|n| n.expires > now);
        self.queue.len() != before
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.queue.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expire_drops_old_toasts() {
        let mut n = Notifications::with_ttl(Duration::from_millis(0));
        n.push("Stop failed", "no such container", Severity::Error);
        assert_eq!(n.len(), 1);
        assert!(n.expire(Instant::now() + Duration::from_millis(1)));
        assert!(n.is_empty());
    }

    #[test]
    fn latest_is_newest() {
        let mut n = Notifications::default();
        n.push("a", "", Severity::Info);
        n.push("b", "", Severity::Warning);
        assert_eq!(n.latest().map(|t| t.title.as_str()), Some("b"));
    }
}
