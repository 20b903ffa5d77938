//! Notification classification and dispatch.
//!
//! [`ResourceWatcher`] is the handler registered with the watch subsystem.
//! It turns raw notifications into [`ChangeEvent`]s, drops the noise, and
//! writes one line per surviving event before returning to the caller.

use crate::classifier::{is_significant, significant_changes};
use crate::event::ChangeEvent;
use crate::formatter::EventFormatter;
use crate::handler::ResourceEventHandler;
use crate::payload::Payload;
use crate::sink::EventSink;
use chrono::Local;
use tracing::debug;

/// Bridges watch notifications to the change log.
///
/// Holds no per-pod state, so it can be shared across concurrent callbacks.
#[derive(Debug, Clone)]
pub struct ResourceWatcher<S> {
    formatter: EventFormatter,
    sink: S,
}

impl<S: EventSink> ResourceWatcher<S> {
    /// Creates a watcher writing through `formatter` into `sink`.
    pub fn new(formatter: EventFormatter, sink: S) -> Self {
        Self { formatter, sink }
    }

    /// Classifies an add. Every resolvable pod is reported.
    #[must_use]
    pub fn classify_add(&self, obj: &Payload) -> Option<ChangeEvent> {
        obj.concrete_snapshot().map(ChangeEvent::Created)
    }

    /// Classifies an update. Only significant changes are reported.
    #[must_use]
    pub fn classify_update(&self, prior: &Payload, next: &Payload) -> Option<ChangeEvent> {
        let prior = prior.concrete_snapshot()?;
        let next = next.concrete_snapshot()?;

        if prior.key != next.key {
            debug!("Dropping update pairing {} with {}", prior.key, next.key);
            return None;
        }

        if !is_significant(&prior, &next) {
            debug!("No significant change for pod {}", next.key);
            return None;
        }

        debug!(
            "Pod {} changed: {:?}",
            next.key,
            significant_changes(&prior, &next)
        );
        Some(ChangeEvent::Updated { prior, next })
    }

    /// Classifies a delete. Concrete pods and tombstones with a last known
    /// state are always reported.
    #[must_use]
    pub fn classify_delete(&self, obj: &Payload) -> Option<ChangeEvent> {
        obj.deleted_snapshot()
            .map(|snapshot| ChangeEvent::Deleted(snapshot.key))
    }

    fn emit(&self, event: Option<ChangeEvent>) {
        if let Some(event) = event {
            self.sink
                .emit(&self.formatter.event_line(&event, &Local::now()));
        }
    }
}

impl<S: EventSink> ResourceEventHandler for ResourceWatcher<S> {
    fn on_add(&self, obj: Payload) {
        self.emit(self.classify_add(&obj));
    }

    fn on_update(&self, prior: Payload, next: Payload) {
        self.emit(self.classify_update(&prior, &next));
    }

    fn on_delete(&self, obj: Payload) {
        self.emit(self.classify_delete(&obj));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Tombstone;
    use crate::snapshot::{ObjectKey, Phase};
    use crate::testing::{MemorySink, PodBuilder};

    fn watcher() -> (ResourceWatcher<MemorySink>, MemorySink) {
        let sink = MemorySink::default();
        (ResourceWatcher::new(EventFormatter::default(), sink.clone()), sink)
    }

    #[test]
    fn test_add_always_reported() {
        let (watcher, sink) = watcher();
        watcher.on_add(Payload::object(PodBuilder::new("default", "web-0").build()));
        watcher.on_add(Payload::object(
            PodBuilder::new("default", "web-1").phase("Running").build(),
        ));

        assert_eq!(
            sink.summaries(),
            vec![
                "CREATED  pod default/web-0 phase=Unknown ip= node=",
                "CREATED  pod default/web-1 phase=Running ip= node=",
            ]
        );
    }

    #[test]
    fn test_add_of_tombstone_dropped() {
        let (watcher, sink) = watcher();
        let pod = PodBuilder::new("default", "web-0").build();
        watcher.on_add(Payload::FinalStateUnknown(Tombstone::new("default/web-0", pod)));
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_insignificant_update_dropped() {
        let (watcher, sink) = watcher();
        let prior = PodBuilder::new("default", "web-0")
            .phase("Running")
            .label("v", "1")
            .resource_version("10")
            .build();
        // Only the resource version moves
        let next = PodBuilder::new("default", "web-0")
            .phase("Running")
            .label("v", "1")
            .resource_version("11")
            .build();

        watcher.on_update(Payload::object(prior), Payload::object(next));
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_update_with_mismatched_identity_dropped() {
        let (watcher, _sink) = watcher();
        let prior = Payload::object(PodBuilder::new("default", "a").build());
        let next = Payload::object(PodBuilder::new("default", "b").phase("Running").build());
        assert_eq!(watcher.classify_update(&prior, &next), None);
    }

    #[test]
    fn test_update_with_nameless_object_dropped() {
        let (watcher, sink) = watcher();
        let prior = Payload::object(PodBuilder::nameless("default").build());
        let next = Payload::object(PodBuilder::new("default", "web-0").phase("Running").build());
        watcher.on_update(prior, next);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_delete_of_object_and_tombstone_reported() {
        let (watcher, sink) = watcher();
        watcher.on_delete(Payload::object(PodBuilder::new("default", "web-0").build()));
        watcher.on_delete(Payload::FinalStateUnknown(Tombstone::new(
            "default/web-1",
            PodBuilder::new("default", "web-1").phase("Running").build(),
        )));

        assert_eq!(
            sink.summaries(),
            vec!["DELETED  pod default/web-0", "DELETED  pod default/web-1"]
        );
    }

    #[test]
    fn test_delete_without_identity_dropped() {
        let (watcher, sink) = watcher();
        watcher.on_delete(Payload::FinalStateUnknown(Tombstone {
            key: "default/gone".to_string(),
            last_known: None,
        }));
        watcher.on_delete(Payload::object(PodBuilder::nameless("default").build()));
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_classify_update_carries_both_snapshots() {
        let (watcher, _sink) = watcher();
        let prior = Payload::object(PodBuilder::new("default", "web-0").phase("Pending").build());
        let next = Payload::object(
            PodBuilder::new("default", "web-0")
                .phase("Running")
                .pod_ip("10.0.0.5")
                .build(),
        );

        let Some(ChangeEvent::Updated { prior, next }) = watcher.classify_update(&prior, &next)
        else {
            panic!("expected an update");
        };
        assert_eq!(prior.phase, Phase::Pending);
        assert_eq!(next.phase, Phase::Running);
        assert_eq!(next.key, ObjectKey::new("default", "web-0"));
    }
}
