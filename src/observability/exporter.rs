//! JSON-lines span exporter.
//!
//! Each finished span becomes one JSON object on its own line. The file is
//! opened lazily on the first export and appended to afterwards.

use futures_util::future::BoxFuture;
use opentelemetry::trace::{SpanId, Status, TraceError};
use opentelemetry::KeyValue;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;
use serde_json::{json, Map, Value as JsonValue};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// Service name attached to every exported span.
pub const SERVICE_NAME: &str = "drawer-stack";

struct JsonLinesExporter {
    path: PathBuf,
    file: Mutex<Option<File>>,
    is_shutdown: AtomicBool,
}

impl JsonLinesExporter {
    const fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: Mutex::new(None),
            is_shutdown: AtomicBool::new(false),
        }
    }

    fn write_batch(&self, batch: &[SpanData]) -> std::io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("mutex poisoned: {e}")))?;

        if guard.is_none() {
            let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            *guard = Some(file);
        }
        let Some(file) = guard.as_mut() else {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "trace file unavailable"));
        };

        for span in batch {
            writeln!(file, "{}", span_to_json(span))?;
        }
        file.flush()
    }
}

impl SpanExporter for JsonLinesExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Box::pin(std::future::ready(Err(TraceError::from("exporter is shut down"))));
        }

        let result = self
            .write_batch(&batch)
            .map_err(|e| TraceError::from(e.to_string()));
        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for JsonLinesExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesExporter")
            .field("path", &self.path)
            .field("is_shutdown", &self.is_shutdown)
            .finish_non_exhaustive()
    }
}

fn unix_nanos(time: SystemTime) -> u128 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos()
}

fn attributes_to_json(attributes: &[KeyValue]) -> JsonValue {
    let map: Map<String, JsonValue> = attributes
        .iter()
        .map(|kv| {
            let value = match &kv.value {
                opentelemetry::Value::Bool(b) => json!(b),
                opentelemetry::Value::I64(i) => json!(i),
                opentelemetry::Value::F64(f) => json!(f),
                other => json!(other.to_string()),
            };
            (kv.key.to_string(), value)
        })
        .collect();
    JsonValue::Object(map)
}

/// Flattens one span into the line format written by the exporter.
fn span_to_json(span: &SpanData) -> JsonValue {
    let start = unix_nanos(span.start_time);
    let end = unix_nanos(span.end_time);
    let (status, status_message) = match &span.status {
        Status::Unset => ("unset", String::new()),
        Status::Ok => ("ok", String::new()),
        Status::Error { description } => ("error", description.to_string()),
    };

    json!({
        "service": SERVICE_NAME,
        "name": span.name,
        "trace_id": format!("{:032x}", span.span_context.trace_id()),
        "span_id": format!("{:016x}", span.span_context.span_id()),
        "parent_span_id": if span.parent_span_id == SpanId::INVALID {
            JsonValue::Null
        } else {
            json!(format!("{:016x}", span.parent_span_id))
        },
        "start_unix_nano": start.to_string(),
        "duration_nano": end.saturating_sub(start).to_string(),
        "attributes": attributes_to_json(&span.attributes),
        "events": span.events.iter().map(|event| json!({
            "name": event.name,
            "attributes": attributes_to_json(&event.attributes),
        })).collect::<Vec<_>>(),
        "status": status,
        "status_message": status_message,
    })
}

/// Builds a tracer provider that appends finished spans to `path`.
///
/// Spans are exported synchronously as they end.
#[must_use]
pub fn file_tracer_provider(path: &Path) -> TracerProvider {
    let resource = Resource::new(vec![KeyValue::new("service.name", SERVICE_NAME)]);

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(JsonLinesExporter::new(path.to_path_buf()))
        .build()
}
