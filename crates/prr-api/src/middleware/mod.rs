//! # HTTP Middleware
//!
//! - `tracing_layer`: per-request spans and response logging.
//! - `metrics`: Prometheus request counters and latency histogram.
//! - `panic`: converts handler panics into JSON 500 responses.

pub mod metrics;
pub mod panic;
pub mod tracing_layer;
