//! Test helpers
//!
//! In-memory sinks, a recording handler and a pod builder. Enabled for the
//! crate's own tests and, via the `test-util` feature, for dependents.

use crate::handler::ResourceEventHandler;
use crate::payload::Payload;
use crate::sink::EventSink;
use k8s_openapi::api::core::v1::{ContainerStatus, Pod, PodSpec, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::sync::{Arc, Mutex};

/// Sink that keeps every line in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// All lines emitted so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Emitted lines with the `<timestamp> | ` prefix stripped.
    #[must_use]
    pub fn summaries(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|line| match line.split_once(" | ") {
                Some((_, summary)) => summary.to_string(),
                None => line,
            })
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// One callback invocation seen by a [`RecordingHandler`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// `on_add`
    Add(Payload),
    /// `on_update`
    Update(Payload, Payload),
    /// `on_delete`
    Delete(Payload),
}

/// Handler that records every callback in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl RecordingHandler {
    /// All calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: RecordedCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl ResourceEventHandler for RecordingHandler {
    fn on_add(&self, obj: Payload) {
        self.record(RecordedCall::Add(obj));
    }

    fn on_update(&self, prior: Payload, next: Payload) {
        self.record(RecordedCall::Update(prior, next));
    }

    fn on_delete(&self, obj: Payload) {
        self.record(RecordedCall::Delete(obj));
    }
}

/// Builds `Pod` objects for tests.
#[derive(Debug, Clone, Default)]
pub struct PodBuilder {
    pod: Pod,
}

impl PodBuilder {
    /// Starts a pod with the given namespace and name.
    #[must_use]
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            pod: Pod {
                metadata: ObjectMeta {
                    name: Some(name.to_string()),
                    namespace: Some(namespace.to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
        }
    }

    /// Starts a pod with no name.
    #[must_use]
    pub fn nameless(namespace: &str) -> Self {
        let mut builder = Self::default();
        builder.pod.metadata.namespace = Some(namespace.to_string());
        builder
    }

    /// Sets `metadata.resourceVersion`.
    #[must_use]
    pub fn resource_version(mut self, version: &str) -> Self {
        self.pod.metadata.resource_version = Some(version.to_string());
        self
    }

    /// Sets `status.phase`.
    #[must_use]
    pub fn phase(mut self, phase: &str) -> Self {
        self.status().phase = Some(phase.to_string());
        self
    }

    /// Sets `status.podIP`.
    #[must_use]
    pub fn pod_ip(mut self, ip: &str) -> Self {
        self.status().pod_ip = Some(ip.to_string());
        self
    }

    /// Sets `spec.nodeName`.
    #[must_use]
    pub fn node(mut self, node: &str) -> Self {
        self.pod.spec.get_or_insert_with(PodSpec::default).node_name = Some(node.to_string());
        self
    }

    /// Appends a container status.
    #[must_use]
    pub fn container(mut self, name: &str, ready: bool) -> Self {
        self.status()
            .container_statuses
            .get_or_insert_with(Vec::new)
            .push(ContainerStatus {
                name: name.to_string(),
                ready,
                ..Default::default()
            });
        self
    }

    /// Sets a label.
    #[must_use]
    pub fn label(mut self, key: &str, value: &str) -> Self {
        self.pod
            .metadata
            .labels
            .get_or_insert_with(Default::default)
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Sets an annotation.
    #[must_use]
    pub fn annotation(mut self, key: &str, value: &str) -> Self {
        self.pod
            .metadata
            .annotations
            .get_or_insert_with(Default::default)
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Finishes the pod.
    #[must_use]
    pub fn build(self) -> Pod {
        self.pod
    }

    fn status(&mut self) -> &mut PodStatus {
        self.pod.status.get_or_insert_with(PodStatus::default)
    }
}
