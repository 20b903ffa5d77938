//! Pod snapshots
//!
//! Immutable point-in-time views of a pod, reduced to the fields the
//! change log cares about.

use crate::error::SnapshotError;
use k8s_openapi::api::core::v1::Pod;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Pod lifecycle phase
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Accepted but not all containers are running yet
    Pending,
    /// Bound to a node and at least one container is running
    Running,
    /// All containers terminated successfully
    Succeeded,
    /// All containers terminated, at least one in failure
    Failed,
    /// Phase could not be obtained, or is not one of the above
    #[default]
    Unknown,
}

impl Phase {
    /// Maps the API `status.phase` string onto a [`Phase`].
    ///
    /// Anything unrecognised becomes [`Phase::Unknown`].
    #[must_use]
    pub fn from_api(phase: &str) -> Self {
        match phase {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    /// The API spelling of the phase.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a pod: namespace and name.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    /// Namespace (empty for objects that carry none)
    pub namespace: String,
    /// Object name
    pub name: String,
}

impl ObjectKey {
    /// Creates a key from namespace and name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Readiness of one container, by position in `status.containerStatuses`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerState {
    /// Container name
    pub name: String,
    /// Whether the container passed its readiness probe
    pub ready: bool,
}

impl ContainerState {
    /// Creates a container state.
    pub fn new(name: impl Into<String>, ready: bool) -> Self {
        Self {
            name: name.into(),
            ready,
        }
    }
}

/// Point-in-time view of one pod.
///
/// Snapshots are plain values. Every notification builds its own, so nothing
/// is shared between callback invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSnapshot {
    /// Pod identity
    pub key: ObjectKey,
    /// `status.phase`
    pub phase: Phase,
    /// `status.podIP`, empty when unassigned
    pub address: String,
    /// `spec.nodeName`, empty when unscheduled
    pub host: String,
    /// `status.containerStatuses`, in API order
    pub containers: Vec<ContainerState>,
    /// `metadata.labels`
    pub labels: BTreeMap<String, String>,
    /// `metadata.annotations`
    pub annotations: BTreeMap<String, String>,
}

impl WorkloadSnapshot {
    /// Creates an empty snapshot in [`Phase::Unknown`].
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: ObjectKey::new(namespace, name),
            phase: Phase::Unknown,
            address: String::new(),
            host: String::new(),
            containers: Vec::new(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }

    /// Namespace of the pod.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.key.namespace
    }

    /// Name of the pod.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.key.name
    }

    /// Returns the snapshot with `phase` replaced.
    #[must_use]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Returns the snapshot with `address` replaced.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Returns the snapshot with `host` replaced.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Returns the snapshot with one more container state appended.
    #[must_use]
    pub fn with_container(mut self, name: impl Into<String>, ready: bool) -> Self {
        self.containers.push(ContainerState::new(name, ready));
        self
    }

    /// Returns the snapshot with a label set.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Returns the snapshot with an annotation set.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }
}

impl TryFrom<&Pod> for WorkloadSnapshot {
    type Error = SnapshotError;

    fn try_from(pod: &Pod) -> Result<Self, Self::Error> {
        let name = pod
            .metadata
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .ok_or(SnapshotError::MissingName)?;
        let namespace = pod.metadata.namespace.clone().unwrap_or_default();
        let status = pod.status.as_ref();

        let phase = status
            .and_then(|s| s.phase.as_deref())
            .map_or(Phase::Unknown, Phase::from_api);
        let address = status.and_then(|s| s.pod_ip.clone()).unwrap_or_default();
        let host = pod
            .spec
            .as_ref()
            .and_then(|s| s.node_name.clone())
            .unwrap_or_default();
        let containers = status
            .and_then(|s| s.container_statuses.as_ref())
            .map(|statuses| {
                statuses
                    .iter()
                    .map(|c| ContainerState::new(c.name.clone(), c.ready))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            key: ObjectKey::new(namespace, name),
            phase,
            address,
            host,
            containers,
            labels: pod.metadata.labels.clone().unwrap_or_default(),
            annotations: pod.metadata.annotations.clone().unwrap_or_default(),
        })
    }
}

impl TryFrom<Pod> for WorkloadSnapshot {
    type Error = SnapshotError;

    fn try_from(pod: Pod) -> Result<Self, Self::Error> {
        Self::try_from(&pod)
    }
}
