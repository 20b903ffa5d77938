//! Pod change events
//!
//! Turns raw pod notifications from a cluster watch into a readable change log.
//!
//! # Example
//!
//! ```
//! use pod_events::{classifier, Phase, WorkloadSnapshot};
//!
//! let prior = WorkloadSnapshot::new("default", "web-0").with_phase(Phase::Pending);
//! let next = prior.clone().with_phase(Phase::Running).with_address("10.0.0.5");
//!
//! assert!(classifier::is_significant(&prior, &next));
//! assert!(!classifier::is_significant(&next, &next.clone()));
//! ```
//!
//! # Pieces
//!
//! - **Snapshots**: immutable views of a pod ([`WorkloadSnapshot`])
//! - **Classification**: the significant-change policy ([`classifier`])
//! - **Formatting**: `<timestamp> | <summary>` lines ([`EventFormatter`])
//! - **Dispatch**: the add/update/delete handler ([`ResourceWatcher`])

pub mod classifier;
pub mod error;
pub mod event;
pub mod formatter;
pub mod handler;
pub mod payload;
pub mod sink;
pub mod snapshot;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod watcher;

pub use classifier::{is_significant, significant_changes, TrackedField};
pub use error::SnapshotError;
pub use event::ChangeEvent;
pub use formatter::{EventFormatter, OutputFormat};
pub use handler::ResourceEventHandler;
pub use payload::{Payload, Tombstone};
pub use sink::{EventSink, StdoutSink};
pub use snapshot::{ContainerState, ObjectKey, Phase, WorkloadSnapshot};
pub use watcher::ResourceWatcher;
