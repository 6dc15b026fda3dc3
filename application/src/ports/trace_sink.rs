//! Trace sink port
//!
//! A sink is created once at process start and handed to the use cases that
//! report to it. Tracing is best-effort: sinks swallow and log their own
//! failures instead of returning them.

use serde_json::Value;

/// Destination for investigation traces
pub trait TraceSink: Send + Sync {
    fn start_span(&self, name: &str, input: Value) -> Box<dyn TraceSpan>;

    /// Flush buffered records before the process exits
    fn flush(&self) {}
}

/// Handle to one open span
pub trait TraceSpan: Send + Sync {
    /// Record the span's output. The last update wins.
    fn update(&self, output: &str);

    /// Attach a named event to the span
    fn event(&self, _name: &str, _data: Value) {}
}

/// Sink that records nothing
pub struct NoTraceSink;

struct NoSpan;

impl TraceSpan for NoSpan {
    fn update(&self, _output: &str) {}
}

impl TraceSink for NoTraceSink {
    fn start_span(&self, _name: &str, _input: Value) -> Box<dyn TraceSpan> {
        Box::new(NoSpan)
    }
}
