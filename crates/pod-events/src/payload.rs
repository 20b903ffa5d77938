//! Notification payloads
//!
//! What the watch subsystem hands to the add/update/delete callbacks. A
//! deletion may arrive as the deleted object itself, or as a tombstone when
//! the watch lost track of the object and only has its last known state.

use crate::snapshot::WorkloadSnapshot;
use k8s_openapi::api::core::v1::Pod;
use tracing::debug;

/// Deletion placeholder for an object whose final state was not observed.
#[derive(Debug, Clone, PartialEq)]
pub struct Tombstone {
    /// Cache key of the object, `namespace/name`
    pub key: String,
    /// Last state the cache held, if any
    pub last_known: Option<Box<Pod>>,
}

impl Tombstone {
    /// Creates a tombstone carrying the last known object.
    pub fn new(key: impl Into<String>, last_known: Pod) -> Self {
        Self {
            key: key.into(),
            last_known: Some(Box::new(last_known)),
        }
    }
}

/// Object delivered to a watch callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Concrete pod
    Object(Box<Pod>),
    /// Deletion whose final state is unknown
    FinalStateUnknown(Tombstone),
}

impl Payload {
    /// Wraps a concrete pod.
    #[must_use]
    pub fn object(pod: Pod) -> Self {
        Self::Object(Box::new(pod))
    }

    /// Snapshot of a concrete pod.
    ///
    /// Tombstones are not accepted here; they are only meaningful for deletes.
    #[must_use]
    pub fn concrete_snapshot(&self) -> Option<WorkloadSnapshot> {
        match self {
            Self::Object(pod) => snapshot_of(pod),
            Self::FinalStateUnknown(tombstone) => {
                debug!("Ignoring tombstone {} outside of a delete", tombstone.key);
                None
            }
        }
    }

    /// Snapshot of either a concrete pod or a tombstone's last known state.
    #[must_use]
    pub fn deleted_snapshot(&self) -> Option<WorkloadSnapshot> {
        match self {
            Self::Object(pod) => snapshot_of(pod),
            Self::FinalStateUnknown(Tombstone { key, last_known }) => match last_known {
                Some(pod) => snapshot_of(pod),
                None => {
                    debug!("Tombstone {} has no last known state", key);
                    None
                }
            },
        }
    }
}

fn snapshot_of(pod: &Pod) -> Option<WorkloadSnapshot> {
    match WorkloadSnapshot::try_from(pod) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            debug!("Dropping malformed pod payload: {}", e);
            None
        }
    }
}
