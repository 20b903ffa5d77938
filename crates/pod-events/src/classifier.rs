//! Significant-change policy
//!
//! Decides whether the difference between two snapshots of the same pod is
//! worth reporting. Only the fields listed in [`TrackedField`] count; status
//! churn such as condition timestamps or restart counts is ignored.
//!
//! Container readiness is compared by position, not by name. Reordering
//! containers is significant whenever it changes the ready flag seen at some
//! index.

use crate::snapshot::WorkloadSnapshot;
use std::fmt;

/// A field whose change makes an update significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedField {
    /// Pod phase
    Phase,
    /// Pod IP
    Address,
    /// Node the pod is bound to
    Host,
    /// Container count, or the ready flag at any index
    ContainerReadiness,
    /// Label map
    Labels,
    /// Annotation map
    Annotations,
}

impl TrackedField {
    /// Short name used in diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Phase => "phase",
            Self::Address => "ip",
            Self::Host => "node",
            Self::ContainerReadiness => "containers",
            Self::Labels => "labels",
            Self::Annotations => "annotations",
        }
    }
}

impl fmt::Display for TrackedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if any tracked field differs between `prior` and `next`.
///
/// Both snapshots must describe the same pod.
#[must_use]
pub fn is_significant(prior: &WorkloadSnapshot, next: &WorkloadSnapshot) -> bool {
    debug_assert_eq!(prior.key, next.key, "compared snapshots of different pods");

    prior.phase != next.phase
        || prior.address != next.address
        || prior.host != next.host
        || readiness_changed(prior, next)
        || prior.labels != next.labels
        || prior.annotations != next.annotations
}

/// Lists the tracked fields that differ, in declaration order of [`TrackedField`].
///
/// Empty exactly when [`is_significant`] is false.
#[must_use]
pub fn significant_changes(prior: &WorkloadSnapshot, next: &WorkloadSnapshot) -> Vec<TrackedField> {
    let checks = [
        (TrackedField::Phase, prior.phase != next.phase),
        (TrackedField::Address, prior.address != next.address),
        (TrackedField::Host, prior.host != next.host),
        (TrackedField::ContainerReadiness, readiness_changed(prior, next)),
        (TrackedField::Labels, prior.labels != next.labels),
        (TrackedField::Annotations, prior.annotations != next.annotations),
    ];

    checks
        .into_iter()
        .filter_map(|(field, changed)| changed.then_some(field))
        .collect()
}

fn readiness_changed(prior: &WorkloadSnapshot, next: &WorkloadSnapshot) -> bool {
    prior.containers.len() != next.containers.len()
        || prior
            .containers
            .iter()
            .zip(&next.containers)
            .any(|(old, new)| old.ready != new.ready)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Phase;

    fn base() -> WorkloadSnapshot {
        WorkloadSnapshot::new("default", "web-0")
            .with_phase(Phase::Running)
            .with_address("10.0.0.5")
            .with_host("node-a")
            .with_container("app", true)
            .with_container("proxy", false)
            .with_label("app", "web")
            .with_annotation("revision", "3")
    }

    #[test]
    fn test_identical_snapshots_not_significant() {
        let prior = base();
        let next = base();
        assert!(!is_significant(&prior, &next));
        assert!(significant_changes(&prior, &next).is_empty());
    }

    #[test]
    fn test_each_tracked_field_alone_is_significant() {
        let cases = [
            (base().with_phase(Phase::Failed), TrackedField::Phase),
            (base().with_address("10.0.0.6"), TrackedField::Address),
            (base().with_host("node-b"), TrackedField::Host),
            (base().with_container("extra", true), TrackedField::ContainerReadiness),
            (base().with_label("tier", "frontend"), TrackedField::Labels),
            (base().with_annotation("revision", "4"), TrackedField::Annotations),
        ];

        for (next, field) in cases {
            assert!(is_significant(&base(), &next), "{field} change should be significant");
            assert_eq!(significant_changes(&base(), &next), vec![field]);
        }
    }

    #[test]
    fn test_ready_flag_flip_is_significant() {
        let mut next = base();
        next.containers[1].ready = true;
        assert_eq!(
            significant_changes(&base(), &next),
            vec![TrackedField::ContainerReadiness]
        );
    }

    #[test]
    fn test_container_rename_alone_is_not_significant() {
        let mut next = base();
        next.containers[0].name = "application".to_string();
        assert!(!is_significant(&base(), &next));
    }

    #[test]
    fn test_container_reorder_compared_by_index() {
        // [app:true, proxy:false] -> [proxy:false, app:true] changes both indices
        let mut swapped = base();
        swapped.containers.reverse();
        assert!(is_significant(&base(), &swapped));

        // Same flags at every index after the swap: nothing to report
        let prior = WorkloadSnapshot::new("default", "web-0")
            .with_container("a", true)
            .with_container("b", true);
        let next = WorkloadSnapshot::new("default", "web-0")
            .with_container("b", true)
            .with_container("a", true);
        assert!(!is_significant(&prior, &next));
    }

    #[test]
    fn test_label_removal_is_significant() {
        let mut next = base();
        next.labels.clear();
        assert!(is_significant(&base(), &next));
    }

    #[test]
    fn test_multiple_changes_listed_in_order() {
        let next = base()
            .with_annotation("note", "x")
            .with_phase(Phase::Succeeded)
            .with_host("");
        assert_eq!(
            significant_changes(&base(), &next),
            vec![TrackedField::Phase, TrackedField::Host, TrackedField::Annotations]
        );
    }
}
