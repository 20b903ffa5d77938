//! End-to-end scenarios through `ResourceWatcher`.
//!
//! Each test feeds raw pod notifications in, then inspects the change log.

use pod_events::testing::{MemorySink, PodBuilder};
use pod_events::{
    EventFormatter, OutputFormat, Payload, ResourceEventHandler, ResourceWatcher, Tombstone,
};

fn watcher() -> (ResourceWatcher<MemorySink>, MemorySink) {
    let sink = MemorySink::default();
    (
        ResourceWatcher::new(EventFormatter::new(OutputFormat::Text), sink.clone()),
        sink,
    )
}

#[test]
fn test_pending_to_running_reports_phase_and_ip() {
    let (watcher, sink) = watcher();
    let pending = PodBuilder::new("default", "a").phase("Pending").build();
    let running = PodBuilder::new("default", "a")
        .phase("Running")
        .pod_ip("10.0.0.5")
        .build();

    watcher.on_update(Payload::object(pending), Payload::object(running));

    assert_eq!(
        sink.summaries(),
        vec!["UPDATED  pod default/a phase:Pending->Running ip:->10.0.0.5 node:->"]
    );
}

#[test]
fn test_unchanged_labels_yield_nothing() {
    let (watcher, sink) = watcher();
    let pod = PodBuilder::new("default", "a").label("v", "1").build();

    watcher.on_update(Payload::object(pod.clone()), Payload::object(pod));

    assert!(sink.lines().is_empty());
}

#[test]
fn test_redelivered_update_reported_once() {
    let (watcher, sink) = watcher();
    let before = PodBuilder::new("default", "a").container("app", false).build();
    let after = PodBuilder::new("default", "a").container("app", true).build();

    watcher.on_update(Payload::object(before), Payload::object(after.clone()));
    // Redelivery: the cache already holds the new state
    watcher.on_update(Payload::object(after.clone()), Payload::object(after));

    assert_eq!(sink.lines().len(), 1);
}

#[test]
fn test_full_lifecycle_in_order() {
    let (watcher, sink) = watcher();
    let created = PodBuilder::new("jobs", "batch-1").phase("Pending").build();
    let scheduled = PodBuilder::new("jobs", "batch-1")
        .phase("Pending")
        .node("node-a")
        .build();
    let running = PodBuilder::new("jobs", "batch-1")
        .phase("Running")
        .node("node-a")
        .pod_ip("10.1.0.7")
        .container("worker", true)
        .build();

    watcher.on_add(Payload::object(created.clone()));
    watcher.on_update(Payload::object(created), Payload::object(scheduled.clone()));
    watcher.on_update(Payload::object(scheduled), Payload::object(running.clone()));
    watcher.on_delete(Payload::FinalStateUnknown(Tombstone::new("jobs/batch-1", running)));

    assert_eq!(
        sink.summaries(),
        vec![
            "CREATED  pod jobs/batch-1 phase=Pending ip= node=",
            "UPDATED  pod jobs/batch-1 phase:Pending->Pending ip:-> node:->node-a",
            "UPDATED  pod jobs/batch-1 phase:Pending->Running ip:->10.1.0.7 node:->node-a",
            "DELETED  pod jobs/batch-1",
        ]
    );
}

#[test]
fn test_lines_carry_millisecond_timestamp() {
    let (watcher, sink) = watcher();
    watcher.on_add(Payload::object(PodBuilder::new("default", "a").build()));

    let lines = sink.lines();
    let (ts, _) = lines[0].split_once(" | ").unwrap();
    let parsed = chrono::DateTime::parse_from_rfc3339(ts).unwrap();
    assert_eq!(parsed.timestamp_subsec_nanos() % 1_000_000, 0);
    let frac = ts.split_once('.').map(|(_, rest)| rest).unwrap();
    assert!(frac[..3].chars().all(|c| c.is_ascii_digit()));
    assert!(!frac[3..4].chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn test_concurrent_callbacks_write_whole_lines() {
    let (watcher, sink) = watcher();
    let watcher = std::sync::Arc::new(watcher);

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let watcher = std::sync::Arc::clone(&watcher);
            std::thread::spawn(move || {
                for seq in 0..50 {
                    let namespace = format!("ns{worker}");
                    let pod = PodBuilder::new(&namespace, &format!("pod-{seq}")).build();
                    watcher.on_add(Payload::object(pod));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let summaries = sink.summaries();
    assert_eq!(summaries.len(), 200);
    for worker in 0..4 {
        let prefix = format!("CREATED  pod ns{worker}/");
        let ours: Vec<&String> = summaries.iter().filter(|s| s.starts_with(&prefix)).collect();
        let expected: Vec<String> = (0..50)
            .map(|seq| format!("CREATED  pod ns{worker}/pod-{seq} phase=Unknown ip= node="))
            .collect();
        assert_eq!(ours, expected.iter().collect::<Vec<_>>());
    }
}
