//! Error types for the pod-events crate.

use thiserror::Error;

/// Errors raised while reading a pod into a [`crate::WorkloadSnapshot`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Pod has no `metadata.name`, so it has no reportable identity
    #[error("pod has no metadata.name")]
    MissingName,
}

/// Error returned when parsing an unknown output format.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown output format '{0}' (expected 'text' or 'json')")]
pub struct UnknownOutputFormat(pub String);
