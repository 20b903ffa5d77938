//! Output sinks for rendered lines.

use std::io::Write;
use std::sync::Arc;
use tracing::warn;

/// Destination for change log lines.
///
/// Implementations must write each line atomically: concurrent callers may
/// interleave lines but never the contents of one line.
pub trait EventSink: Send + Sync {
    /// Appends one line.
    fn emit(&self, line: &str);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, line: &str) {
        (**self).emit(line);
    }
}

/// Writes lines to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&self, line: &str) {
        // The lock is held across the whole line
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{line}").and_then(|()| out.flush()) {
            warn!("Failed to write change log line: {}", e);
        }
    }
}
