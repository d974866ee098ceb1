//! The single writer of "which container is selected".
//!
//! Both user input and event reconciliation go through this controller, so the
//! selection always points at a live record, or at nothing when the registry is
//! empty.

use tracing::debug;

use crate::registry::Registry;

/// Outcome of a selection request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionChange {
    /// Already selected, or nothing to do. No restart needed.
    Unchanged,
    /// The selection moved. `None` means the registry became empty.
    Changed(Option<String>),
    /// The requested identity is not in the registry.
    Unknown,
}

impl SelectionChange {
    pub fn is_changed(&self) -> bool {
        matches!(self, SelectionChange::Changed(_))
    }
}

#[derive(Debug, Default)]
pub struct SelectionController {
    current: Option<String>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Select `identity`. Selecting the current identity again is a no-op.
    pub fn select(&mut self, registry: &mut Registry, identity: &str) -> SelectionChange {
        if !registry.contains(identity) {
            debug!(identity, "ignoring selection of unknown container");
            return SelectionChange::Unknown;
        }
        if self.current.as_deref() == Some(identity) {
            return SelectionChange::Unchanged;
        }
        self.set(registry, Some(identity.to_string()))
    }

    /// Re-check the selection after the registry changed. Falls back to the first
    /// record in display order when the selected one is gone (or nothing was
    /// selected yet), and to no selection when the registry is empty.
    pub fn revalidate(&mut self, registry: &mut Registry) -> SelectionChange {
        if let Some(current) = self.current.as_deref() {
            if registry.contains(current) {
                return SelectionChange::Unchanged;
            }
        }
        let fallback = registry.first().map(|r| r.identity.clone());
        if fallback.is_none() && self.current.is_none() {
            return SelectionChange::Unchanged;
        }
        self.set(registry, fallback)
    }

    /// Move `step` places through the display order, clamped at both ends.
    pub fn step(&mut self, registry: &mut Registry, step: isize) -> SelectionChange {
        let target = {
            let ordered = registry.ordered();
            if ordered.is_empty() {
                return SelectionChange::Unchanged;
            }
            let idx = self
                .current
                .as_deref()
                .and_then(|cur| ordered.iter().position(|r| r.identity == cur))
                .unwrap_or(0);
            let next = (idx as isize + step).clamp(0, ordered.len() as isize - 1) as usize;
            ordered[next].identity.clone()
        };
        self.select(registry, &target)
    }

    fn set(&mut self, registry: &mut Registry, identity: Option<String>) -> SelectionChange {
        debug!(from = ?self.current, to = ?identity, "selection changed");
        registry.mark_selected(identity.as_deref());
        self.current = identity.clone();
        SelectionChange::Changed(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContainerRecord, ContainerStatus};

    fn registry(names: &[(&str, ContainerStatus)]) -> Registry {
        let mut reg = Registry::new();
        reg.initialize(
            names
                .iter()
                .map(|(n, s)| ContainerRecord::new(*n, format!("{}-id", n), *s))
                .collect(),
        );
        reg
    }

    fn selected_flags(reg: &Registry) -> Vec<&str> {
        reg.ordered()
            .into_iter()
            .filter(|r| r.selected)
            .map(|r| r.identity.as_str())
            .collect()
    }

    #[test]
    fn select_is_idempotent() {
        let mut reg = registry(&[("web", ContainerStatus::Running), ("db", ContainerStatus::Down)]);
        let mut sel = SelectionController::new();
        assert_eq!(sel.select(&mut reg, "db"), SelectionChange::Changed(Some("db".into())));
        assert_eq!(sel.select(&mut reg, "db"), SelectionChange::Unchanged);
        assert_eq!(selected_flags(&reg), vec!["db"]);
    }

    #[test]
    fn unknown_identity_is_rejected() {
        let mut reg = registry(&[("web", ContainerStatus::Running)]);
        let mut sel = SelectionController::new();
        sel.revalidate(&mut reg);
        assert_eq!(sel.select(&mut reg, "ghost"), SelectionChange::Unknown);
        assert_eq!(sel.current(), Some("web"));
    }

    #[test]
    fn removal_of_selected_falls_back_to_first() {
        let mut reg = registry(&[("a", ContainerStatus::Running), ("b", ContainerStatus::Running)]);
        let mut sel = SelectionController::new();
        sel.revalidate(&mut reg);
        assert_eq!(sel.current(), Some("a"));

        reg.remove("a");
        assert_eq!(sel.revalidate(&mut reg), SelectionChange::Changed(Some("b".into())));
        assert_eq!(selected_flags(&reg), vec!["b"]);

        reg.remove("b");
        assert_eq!(sel.revalidate(&mut reg), SelectionChange::Changed(None));
        assert_eq!(sel.current(), None);
        assert_eq!(sel.revalidate(&mut reg), SelectionChange::Unchanged);
    }

    #[test]
    fn removal_of_other_keeps_selection() {
        let mut reg = registry(&[("a", ContainerStatus::Running), ("b", ContainerStatus::Running)]);
        let mut sel = SelectionController::new();
        sel.select(&mut reg, "b");
        reg.remove("a");
        assert_eq!(sel.revalidate(&mut reg), SelectionChange::Unchanged);
        assert_eq!(sel.current(), Some("b"));
    }

    #[test]
    fn selection_is_valid_for_every_reachable_state() {
        let mut reg = Registry::new();
        let mut sel = SelectionController::new();
        let script: &[(&str, bool)] = &[
            ("a", true), ("b", true), ("a", false), ("c", true),
            ("b", false), ("c", false), ("d", true), ("d", false),
        ];
        for (name, add) in script {
            if *add {
                reg.upsert(name, "", ContainerStatus::Running);
            } else {
                reg.remove(name);
            }
            sel.revalidate(&mut reg);
            match sel.current() {
                Some(cur) => assert!(reg.contains(cur)),
                None => assert!(reg.is_empty()),
            }
            let flags = selected_flags(&reg);
            assert_eq!(flags.len(), usize::from(!reg.is_empty()));
        }
    }

    #[test]
    fn step_moves_through_display_order() {
        let mut reg = registry(&[
            ("db", ContainerStatus::Down),
            ("web", ContainerStatus::Running),
        ]);
        let mut sel = SelectionController::new();
        sel.revalidate(&mut reg);
        assert_eq!(sel.current(), Some("web"));
        sel.step(&mut reg, 1);
        assert_eq!(sel.current(), Some("db"));
        assert_eq!(sel.step(&mut reg, 1), SelectionChange::Unchanged);
        sel.step(&mut reg, -5);
        assert_eq!(sel.current(), Some("web"));
    }
}
