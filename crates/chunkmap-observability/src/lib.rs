//! # chunkmap-observability
//!
//! Logging setup shared by the chunkmap CLI and benchmark harnesses.
//!
//! ## Structured logging
//! Human-readable or JSON logs via `tracing-subscriber`, with per-component
//! level overrides (`chunkmap_core=trace` shows every chunk).

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig};
