//! Tracing setup with optional file-based span export.
//!
//! The crate logs through `tracing` everywhere. This module wires a subscriber
//! for binaries and tests that want to see it:
//!
//! ```text
//! tracing macros → EnvFilter → fmt layer (stderr)
//!                            └→ tracing-opentelemetry → SDK TracerProvider → JSON-lines file
//! ```
//!
//! # Configuration
//!
//! Trace level comes from `Config::trace_level` (default `"info"`), the span
//! file from `Config::trace_file`.
//!
//! # Modules
//!
//! - `init`: subscriber setup
//! - [`exporter`]: `SpanExporter` writing one JSON object per span

pub mod exporter;
mod init;

pub use exporter::file_tracer_provider;
pub use init::init_tracing;
