//! Lifecycle controller.
//!
//! Drives the watch through `Idle -> Syncing -> Running -> ShuttingDown ->
//! Stopped`. Startup blocks on the initial cache sync (bounded, fatal on
//! failure); the running phase blocks on the shutdown token, which is wired
//! to SIGINT/SIGTERM by `main`.

use crate::config::{WatchConfig, WatchScope};
use crate::error::ControllerError;
use crate::informer::WatchSubsystem;
use chrono::{Local, SecondsFormat};
use pod_events::{EventFormatter, EventSink, ResourceEventHandler};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, nothing started
    Idle,
    /// Watch started, waiting for the initial list
    Syncing,
    /// Cache synced, events flowing
    Running,
    /// Releasing the watch
    ShuttingDown,
    /// Terminal
    Stopped,
}

impl LifecycleState {
    /// Whether `next` directly follows `self`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Syncing)
                | (Self::Syncing, Self::Running)
                | (Self::Running, Self::ShuttingDown)
                | (Self::ShuttingDown, Self::Stopped)
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Syncing => "Syncing",
            Self::Running => "Running",
            Self::ShuttingDown => "ShuttingDown",
            Self::Stopped => "Stopped",
        };
        f.write_str(name)
    }
}

/// Main controller for pod lifecycle logging.
pub struct LifecycleController<W, S> {
    subsystem: W,
    handler: Arc<dyn ResourceEventHandler>,
    scope: WatchScope,
    sync_timeout: Duration,
    shutdown: CancellationToken,
    formatter: EventFormatter,
    notices: S,
    state: LifecycleState,
}

impl<W: WatchSubsystem, S: EventSink> LifecycleController<W, S> {
    /// Creates a controller in [`LifecycleState::Idle`].
    ///
    /// `handler` is subscribed to `subsystem` when the controller starts;
    /// lifecycle notices go to `notices`.
    pub fn new(
        subsystem: W,
        handler: Arc<dyn ResourceEventHandler>,
        config: &WatchConfig,
        shutdown: CancellationToken,
        notices: S,
    ) -> Self {
        Self {
            subsystem,
            handler,
            scope: config.scope.clone(),
            sync_timeout: config.sync_timeout,
            shutdown,
            formatter: EventFormatter::new(config.output),
            notices,
            state: LifecycleState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Runs the controller until shutdown.
    ///
    /// Returns an error only for startup failures. A termination signal that
    /// arrives before the cache synced aborts startup with
    /// [`ControllerError::Interrupted`].
    pub async fn run(&mut self) -> Result<(), ControllerError> {
        self.transition(LifecycleState::Syncing)?;
        self.subsystem.subscribe(Arc::clone(&self.handler));
        self.subsystem.start()?;

        info!("Waiting up to {:?} for pod cache sync", self.sync_timeout);
        let synced = tokio::select! {
            biased;
            result = self.subsystem.wait_for_sync(self.sync_timeout) => result,
            () = self.shutdown.cancelled() => Err(ControllerError::Interrupted),
        };
        if let Err(e) = synced {
            self.subsystem.stop().await;
            return Err(e);
        }

        self.transition(LifecycleState::Running)?;
        let started = Local::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        self.notice(&format!("watching pods (namespace={}, started={started})", self.scope));

        self.shutdown.cancelled().await;

        self.transition(LifecycleState::ShuttingDown)?;
        self.notice("shutting down");
        self.subsystem.stop().await;

        self.transition(LifecycleState::Stopped)?;
        Ok(())
    }

    fn transition(&mut self, next: LifecycleState) -> Result<(), ControllerError> {
        if !self.state.can_transition_to(next) {
            warn!("Rejected lifecycle transition {} -> {}", self.state, next);
            return Err(ControllerError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        info!("Lifecycle {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn notice(&self, message: &str) {
        self.notices
            .emit(&self.formatter.notice_line(message, &Local::now()));
    }
}
