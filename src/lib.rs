//! Library exports for nodestatus-exporter, shared between the binary and tests.

pub mod cli;
pub mod config;
pub mod metrics;
pub mod models;
pub mod poller;
pub mod routes;
pub mod startup;
pub mod state;
pub mod utils;
