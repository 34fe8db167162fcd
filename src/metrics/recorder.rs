//! Metrics recording implementation using Prometheus.

use prometheus::{Encoder, Gauge, Registry, TextEncoder, register_gauge_with_registry};
use std::sync::Arc;

use crate::models::{NodeCounts, NodeStatus};

/// Trait for recording polled node status.
pub trait NodeStatusRecorder: Clone + Send + Sync + 'static {
    /// Overwrites the published counts with a freshly decoded snapshot.
    fn record_node_status(&self, status: &NodeStatus);
}

/// Prometheus metrics collector.
///
/// Clones share the same registry and gauges, so one instance can be handed
/// to the poller and another to the HTTP handlers.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    up_nodes: Gauge,
    down_nodes: Gauge,
    inactive_nodes: Gauge,
}

impl Metrics {
    /// Creates a new metrics instance with a Prometheus registry.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());

        let up_nodes = register_gauge_with_registry!(
            "total_up_nodes",
            "Current number of up node.",
            registry.clone()
        )
        .expect("Failed to register total_up_nodes");

        let down_nodes = register_gauge_with_registry!(
            "total_down_nodes",
            "Current number of down node.",
            registry.clone()
        )
        .expect("Failed to register total_down_nodes");

        let inactive_nodes = register_gauge_with_registry!(
            "total_inactive_nodes",
            "Current number of inactive node.",
            registry.clone()
        )
        .expect("Failed to register total_inactive_nodes");

        #[cfg(target_os = "linux")]
        registry
            .register(Box::new(
                prometheus::process_collector::ProcessCollector::for_self(),
            ))
            .expect("Failed to register process collector");

        Metrics {
            registry,
            up_nodes,
            down_nodes,
            inactive_nodes,
        }
    }

    /// Current gauge values.
    pub fn node_counts(&self) -> NodeCounts {
        NodeCounts {
            up: self.up_nodes.get(),
            down: self.down_nodes.get(),
            inactive: self.inactive_nodes.get(),
        }
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .expect("Failed to encode metrics");
        String::from_utf8(buffer).expect("Metrics encoding produced invalid UTF-8")
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStatusRecorder for Metrics {
    fn record_node_status(&self, status: &NodeStatus) {
        let counts = status.counts();
        self.up_nodes.set(counts.up);
        self.down_nodes.set(counts.down);
        self.inactive_nodes.set(counts.inactive);
    }
}
