//! Tracing initialization and subscriber setup.

use super::exporter;
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use std::path::Path;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the global tracing subscriber.
///
/// The pipeline is:
/// 1. `EnvFilter` built from `config.trace_level` (default `"info"`)
/// 2. A human-readable `fmt` layer on stderr
/// 3. When `config.trace_file` is set, an OpenTelemetry layer appending one
///    JSON line per finished span to that file
///
/// # Initialization Behavior
///
/// - Creates the trace file's directory if it doesn't exist
/// - Skips the file layer silently if that directory cannot be created
/// - Idempotent: only the first call installs a subscriber
///
/// # Example
///
/// ```rust
/// use drawer_stack::observability::init_tracing;
/// use drawer_stack::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let level = config
        .trace_level
        .clone()
        .unwrap_or_else(|| "info".to_string());

    let otel_layer = config
        .trace_file
        .as_deref()
        .and_then(file_tracer)
        .map(OpenTelemetryLayer::new);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(fmt_layer)
        .with(otel_layer);

    let _ = subscriber.try_init();
}

fn file_tracer(path: &Path) -> Option<opentelemetry_sdk::trace::Tracer> {
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return None;
        }
    }

    let provider = exporter::file_tracer_provider(path);
    Some(provider.tracer(exporter::SERVICE_NAME))
}
