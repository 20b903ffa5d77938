//! Classified change events.

use crate::snapshot::{ObjectKey, WorkloadSnapshot};

/// A pod lifecycle change worth reporting.
///
/// Events are built by [`crate::ResourceWatcher`] and handed straight to the
/// formatter; they are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// Pod appeared in the watch
    Created(WorkloadSnapshot),
    /// Pod changed in at least one tracked field
    Updated {
        /// State before the change
        prior: WorkloadSnapshot,
        /// State after the change
        next: WorkloadSnapshot,
    },
    /// Pod disappeared from the watch
    Deleted(ObjectKey),
}

impl ChangeEvent {
    /// Identity of the pod the event is about.
    #[must_use]
    pub fn key(&self) -> &ObjectKey {
        match self {
            Self::Created(snapshot) => &snapshot.key,
            Self::Updated { next, .. } => &next.key,
            Self::Deleted(key) => key,
        }
    }

    /// Upper-case verb used in the log line.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Created(_) => "CREATED",
            Self::Updated { .. } => "UPDATED",
            Self::Deleted(_) => "DELETED",
        }
    }
}
