//! Watch callback interface.

use crate::payload::Payload;

/// Receives raw add/update/delete notifications from a watch subsystem.
///
/// Callbacks may run concurrently for different pods, but a single pod's
/// notifications arrive in order. Implementations must not block for long:
/// the watch's dispatch loop waits for each call to return.
pub trait ResourceEventHandler: Send + Sync {
    /// An object appeared.
    fn on_add(&self, obj: Payload);

    /// An object was replaced; `prior` is the cached state before the change.
    fn on_update(&self, prior: Payload, next: Payload);

    /// An object disappeared.
    fn on_delete(&self, obj: Payload);
}
