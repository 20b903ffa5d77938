//! Pod watch subsystem.
//!
//! Wraps `kube_runtime::watcher` into an informer: a background task keeps a
//! local pod cache and turns the raw watch stream into add/update/delete
//! callbacks, with a one-shot "synced" signal once the first list completes.
//!
//! Reconnection and backoff are left to `kube_runtime` (`default_backoff`).
//! A relist after a lost watch is reconciled against the cache: pods that are
//! gone from the new list are delivered as tombstone deletes.

use crate::error::ControllerError;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use kube_runtime::watcher::{self, Event};
use kube_runtime::WatchStreamExt;
use pod_events::{Payload, ResourceEventHandler, Tombstone};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Raw watch events as produced by `kube_runtime::watcher`.
pub type PodEventStream = BoxStream<'static, Result<Event<Pod>, watcher::Error>>;

/// Source of pod notifications with a locally synchronised cache.
///
/// Handlers must be subscribed before `start`.
#[async_trait]
pub trait WatchSubsystem: Send {
    /// Registers a handler for add/update/delete callbacks.
    fn subscribe(&mut self, handler: Arc<dyn ResourceEventHandler>);

    /// Begins delivering notifications in the background.
    fn start(&mut self) -> Result<(), ControllerError>;

    /// Waits until the local cache reflects the cluster, at most `timeout`.
    async fn wait_for_sync(&mut self, timeout: Duration) -> Result<(), ControllerError>;

    /// Releases the subscription. Safe to call more than once.
    async fn stop(&mut self);
}

/// Informer over `Pod` objects backed by `kube_runtime::watcher`.
pub struct PodInformer {
    source: Option<PodEventStream>,
    handlers: Vec<Arc<dyn ResourceEventHandler>>,
    shutdown: CancellationToken,
    synced: Option<watch::Receiver<bool>>,
    task: Option<JoinHandle<()>>,
}

impl PodInformer {
    /// Creates an informer watching the pods visible through `api`.
    pub fn new(api: Api<Pod>) -> Self {
        let stream = watcher::watcher(api, watcher::Config::default())
            .default_backoff()
            .boxed();
        Self::from_stream(stream)
    }

    /// Creates an informer over an arbitrary event stream.
    pub fn from_stream(stream: PodEventStream) -> Self {
        Self {
            source: Some(stream),
            handlers: Vec::new(),
            shutdown: CancellationToken::new(),
            synced: None,
            task: None,
        }
    }
}

#[async_trait]
impl WatchSubsystem for PodInformer {
    fn subscribe(&mut self, handler: Arc<dyn ResourceEventHandler>) {
        self.handlers.push(handler);
    }

    fn start(&mut self) -> Result<(), ControllerError> {
        let stream = self
            .source
            .take()
            .ok_or_else(|| ControllerError::Watch("pod informer already started".to_string()))?;

        let (synced_tx, synced_rx) = watch::channel(false);
        let handlers = self.handlers.clone();
        let shutdown = self.shutdown.clone();

        info!("Starting Pod watcher");
        self.task = Some(tokio::spawn(run_watch(stream, handlers, synced_tx, shutdown)));
        self.synced = Some(synced_rx);
        Ok(())
    }

    async fn wait_for_sync(&mut self, timeout: Duration) -> Result<(), ControllerError> {
        let synced = self
            .synced
            .as_mut()
            .ok_or_else(|| ControllerError::SyncFailed("pod informer not started".to_string()))?;

        let outcome = tokio::time::timeout(timeout, synced.wait_for(|done| *done))
            .await
            .map(|waited| waited.is_ok());

        match outcome {
            Ok(true) => Ok(()),
            Ok(false) => Err(ControllerError::SyncFailed(
                "pod watch ended before the cache synced".to_string(),
            )),
            Err(_elapsed) => Err(ControllerError::SyncTimeout(timeout)),
        }
    }

    async fn stop(&mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Pod watcher task ended abnormally: {}", e);
            }
            info!("Pod watcher stopped");
        }
    }
}

async fn run_watch<S>(
    stream: S,
    handlers: Vec<Arc<dyn ResourceEventHandler>>,
    synced: watch::Sender<bool>,
    shutdown: CancellationToken,
) where
    S: Stream<Item = Result<Event<Pod>, watcher::Error>> + Send,
{
    let mut stream = std::pin::pin!(stream);
    let mut cache = PodCache::default();

    loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                debug!("Pod watcher cancelled");
                break;
            }
            next = stream.next() => match next {
                Some(Ok(event)) => {
                    if cache.apply(event, &handlers) && !*synced.borrow() {
                        info!("Pod cache synced ({} pods)", cache.pod_count());
                        synced.send_replace(true);
                    }
                }
                // kube_runtime backs off and retries on its own
                Some(Err(e)) => warn!("Pod watch error: {}", e),
                None => {
                    warn!("Pod watch stream ended");
                    break;
                }
            }
        }
    }
}

/// Local view of the watched pods, keyed by `namespace/name`.
///
/// Owned by the watch task alone; callbacks never see it. Objects of a
/// (re)list are buffered and only reconciled once the list is complete.
#[derive(Debug, Default)]
pub struct PodCache {
    objects: BTreeMap<String, Pod>,
    relist: Option<Vec<Pod>>,
}

impl PodCache {
    /// Number of cached pods.
    pub fn pod_count(&self) -> usize {
        self.objects.len()
    }

    /// Folds one watch event into the cache and notifies `handlers`.
    ///
    /// Returns true when the event completes a full list.
    pub fn apply(
        &mut self,
        event: Event<Pod>,
        handlers: &[Arc<dyn ResourceEventHandler>],
    ) -> bool {
        match event {
            Event::Init => {
                debug!("Pod relist started");
                self.relist = Some(Vec::new());
                false
            }
            Event::InitApply(pod) => {
                match self.relist.as_mut() {
                    Some(listed) => listed.push(pod),
                    None => self.upsert(pod, handlers),
                }
                false
            }
            Event::InitDone => {
                self.finish_relist(handlers);
                true
            }
            Event::Apply(pod) => {
                self.upsert(pod, handlers);
                false
            }
            Event::Delete(pod) => {
                if let Some(key) = cache_key(&pod) {
                    self.objects.remove(&key);
                }
                for handler in handlers {
                    handler.on_delete(Payload::object(pod.clone()));
                }
                false
            }
        }
    }

    fn upsert(&mut self, pod: Pod, handlers: &[Arc<dyn ResourceEventHandler>]) {
        let Some(key) = cache_key(&pod) else {
            // Uncacheable; the handlers drop it for lack of identity
            for handler in handlers {
                handler.on_add(Payload::object(pod.clone()));
            }
            return;
        };

        match self.objects.insert(key, pod.clone()) {
            Some(prior) => {
                for handler in handlers {
                    handler.on_update(Payload::object(prior.clone()), Payload::object(pod.clone()));
                }
            }
            None => {
                for handler in handlers {
                    handler.on_add(Payload::object(pod.clone()));
                }
            }
        }
    }

    /// Reconciles a completed list: adds and updates first, then tombstones
    /// for cached pods the list no longer contains.
    fn finish_relist(&mut self, handlers: &[Arc<dyn ResourceEventHandler>]) {
        let Some(listed) = self.relist.take() else {
            return;
        };

        let seen: BTreeSet<String> = listed.iter().filter_map(cache_key).collect();
        let stale: Vec<String> = self
            .objects
            .keys()
            .filter(|key| !seen.contains(*key))
            .cloned()
            .collect();

        for pod in listed {
            self.upsert(pod, handlers);
        }

        for key in stale {
            if let Some(last) = self.objects.remove(&key) {
                debug!("Pod {} vanished during relist", key);
                for handler in handlers {
                    let tombstone = Tombstone::new(key.clone(), last.clone());
                    handler.on_delete(Payload::FinalStateUnknown(tombstone));
                }
            }
        }
    }
}

/// `namespace/name`, or just `name` for cluster-scoped objects.
fn cache_key(pod: &Pod) -> Option<String> {
    let name = pod.metadata.name.as_deref().filter(|n| !n.is_empty())?;
    match pod.metadata.namespace.as_deref() {
        Some(ns) if !ns.is_empty() => Some(format!("{ns}/{name}")),
        _ => Some(name.to_string()),
    }
}
