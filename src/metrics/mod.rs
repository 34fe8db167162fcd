//! Metrics collection and exposition for Prometheus.
//!
//! This module owns the registry holding the node count gauges
//! and the default process metrics.

mod recorder;

pub use recorder::{Metrics, NodeStatusRecorder};
