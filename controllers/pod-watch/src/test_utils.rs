//! Test utilities for unit testing the controller
//!
//! A scripted stand-in for the pod informer.

#[cfg(test)]
use crate::error::ControllerError;
#[cfg(test)]
use crate::informer::WatchSubsystem;
#[cfg(test)]
use pod_events::{Payload, ResourceEventHandler};
#[cfg(test)]
use std::sync::{Arc, Mutex};
#[cfg(test)]
use std::time::Duration;

/// How the fake reacts to `wait_for_sync`
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub enum SyncBehavior {
    /// Syncs immediately
    Syncs,
    /// Never syncs; times out after the requested bound
    Never,
    /// Reports a sync failure immediately
    Fails,
}

/// Fake watch subsystem recording the calls made on it. Clones share state.
#[cfg(test)]
#[derive(Clone)]
pub struct FakeSubsystem {
    behavior: SyncBehavior,
    calls: Arc<Mutex<Vec<String>>>,
    handlers: Arc<Mutex<Vec<Arc<dyn ResourceEventHandler>>>>,
}

#[cfg(test)]
impl FakeSubsystem {
    pub fn new(behavior: SyncBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::default(),
            handlers: Arc::default(),
        }
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Pushes an add through every subscribed handler
    pub fn deliver_add(&self, obj: Payload) {
        for handler in self.handlers.lock().unwrap().iter() {
            handler.on_add(obj.clone());
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[cfg(test)]
#[async_trait::async_trait]
impl WatchSubsystem for FakeSubsystem {
    fn subscribe(&mut self, handler: Arc<dyn ResourceEventHandler>) {
        self.record("subscribe");
        self.handlers.lock().unwrap().push(handler);
    }

    fn start(&mut self) -> Result<(), ControllerError> {
        self.record("start");
        Ok(())
    }

    async fn wait_for_sync(&mut self, timeout: Duration) -> Result<(), ControllerError> {
        self.record("wait_for_sync");
        match self.behavior {
            SyncBehavior::Syncs => Ok(()),
            SyncBehavior::Never => {
                tokio::time::sleep(timeout).await;
                Err(ControllerError::SyncTimeout(timeout))
            }
            SyncBehavior::Fails => Err(ControllerError::SyncFailed("fake failure".to_string())),
        }
    }

    async fn stop(&mut self) {
        self.record("stop");
    }
}
