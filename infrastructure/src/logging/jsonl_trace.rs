//! JSONL file writer for investigation traces.
//!
//! Every span produces a `span_start` record, any number of `span_event`
//! and `span_update` records, and a `span_end` record when its handle is
//! dropped. Records carry a `type`, a `timestamp` and the `span_id`, and are
//! appended one JSON object per line.

use sherlock_application::{TraceSink, TraceSpan};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::warn;

type SharedWriter = Arc<Mutex<BufWriter<File>>>;

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn write_record(writer: &SharedWriter, record: serde_json::Value) {
    let Ok(line) = serde_json::to_string(&record) else {
        return;
    };

    if let Ok(mut writer) = writer.lock() {
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!("Could not write trace record: {}", e);
        }
    }
}

/// Trace sink appending span records to a JSONL file.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlTraceSink {
    writer: SharedWriter,
    path: PathBuf,
    next_span: AtomicU64,
    /// Distinguishes span ids of different runs appending to the same file
    run_id: String,
}

impl JsonlTraceSink {
    /// Open (or create) the trace file for appending.
    ///
    /// Creates parent directories if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create trace directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open trace file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
            path: path.to_path_buf(),
            next_span: AtomicU64::new(1),
            run_id: format!("{:x}", chrono::Utc::now().timestamp_millis()),
        })
    }

    /// Get the path to the trace file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TraceSink for JsonlTraceSink {
    fn start_span(&self, name: &str, input: serde_json::Value) -> Box<dyn TraceSpan> {
        let span_id = format!(
            "{}-{}",
            self.run_id,
            self.next_span.fetch_add(1, Ordering::Relaxed)
        );

        write_record(
            &self.writer,
            serde_json::json!({
                "type": "span_start",
                "timestamp": timestamp(),
                "span_id": span_id,
                "name": name,
                "input": input,
            }),
        );

        Box::new(JsonlSpan {
            writer: self.writer.clone(),
            span_id,
            name: name.to_string(),
            started: Instant::now(),
        })
    }

    fn flush(&self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlTraceSink {
    fn drop(&mut self) {
        self.flush();
    }
}

struct JsonlSpan {
    writer: SharedWriter,
    span_id: String,
    name: String,
    started: Instant,
}

impl TraceSpan for JsonlSpan {
    fn update(&self, output: &str) {
        write_record(
            &self.writer,
            serde_json::json!({
                "type": "span_update",
                "timestamp": timestamp(),
                "span_id": self.span_id,
                "output": output,
            }),
        );
    }

    fn event(&self, name: &str, data: serde_json::Value) {
        write_record(
            &self.writer,
            serde_json::json!({
                "type": "span_event",
                "timestamp": timestamp(),
                "span_id": self.span_id,
                "event": name,
                "data": data,
            }),
        );
    }
}

impl Drop for JsonlSpan {
    fn drop(&mut self) {
        write_record(
            &self.writer,
            serde_json::json!({
                "type": "span_end",
                "timestamp": timestamp(),
                "span_id": self.span_id,
                "name": self.name,
                "duration_ms": self.started.elapsed().as_millis() as u64,
            }),
        );
    }
}
