//! Termination signal handling.

use crate::error::ControllerError;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Cancels `shutdown` on the first SIGINT or SIGTERM.
///
/// Handlers are registered before this returns, so a failure here is a
/// startup error. The listener exits quietly if `shutdown` is cancelled by
/// someone else first.
pub fn spawn_shutdown_listener(
    shutdown: CancellationToken,
) -> Result<JoinHandle<()>, ControllerError> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        let received = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
            () = shutdown.cancelled() => return,
        };
        info!("Received {}, shutting down", received);
        shutdown.cancel();
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_listener_exits_when_cancelled_elsewhere() {
        let shutdown = CancellationToken::new();
        let listener = spawn_shutdown_listener(shutdown.clone()).unwrap();

        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(5), listener)
            .await
            .unwrap()
            .unwrap();
    }
}
