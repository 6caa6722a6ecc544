//! Tracing spans and timing helpers.

use tracing::{info_span, Span};

/// Create a span covering one import batch.
pub fn import_span(kind: &str, rows: usize) -> Span {
    info_span!("import", kind = %kind, rows = rows)
}

/// Create a span covering one export job.
pub fn export_span(kind: &str, format: &str) -> Span {
    info_span!("export", kind = %kind, format = %format)
}

/// Create a span for a blob storage operation.
pub fn storage_span(operation: &str, path: &str) -> Span {
    info_span!("storage", op = %operation, path = %path)
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Milliseconds elapsed so far.
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Complete the timer and record duration.
    pub fn finish(self) -> u64 {
        let duration_ms = self.elapsed_ms();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = duration_ms,
            "operation completed"
        );
        duration_ms
    }
}
