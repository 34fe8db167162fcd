//! Shared application state.

use crate::metrics::Metrics;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Gauges written by the poller and rendered on every scrape.
    pub metrics: Metrics,
}
