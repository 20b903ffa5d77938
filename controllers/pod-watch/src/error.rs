//! Controller-specific error types.
//!
//! Every variant is a startup failure: per-event problems never surface as
//! errors, they are dropped by the watcher.

use crate::controller::LifecycleState;
use kube::config::KubeconfigError;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in pod-watch.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Credentials could not be loaded
    #[error("Unable to build kubeconfig: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Pod cache did not sync in time
    #[error("Cache did not sync within {0:?}")]
    SyncTimeout(Duration),

    /// Pod cache can no longer sync
    #[error("Cache sync failed: {0}")]
    SyncFailed(String),

    /// Termination signal arrived before the cache synced
    #[error("Interrupted before the cache synced")]
    Interrupted,

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),

    /// Lifecycle state machine misuse
    #[error("Invalid lifecycle transition from {from} to {to}")]
    InvalidTransition {
        /// State the controller was in
        from: LifecycleState,
        /// State that was requested
        to: LifecycleState,
    },

    /// Signal handlers could not be installed
    #[error("Unable to install signal handlers: {0}")]
    Signal(#[from] std::io::Error),
}
