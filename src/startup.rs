//! Application startup and server initialization.
//!
//! Binds the metrics listener, starts the node status poller in the background
//! and serves scrapes until the process is killed.

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::ConfigV1;
use crate::metrics::{Metrics, NodeStatusRecorder};
use crate::poller::{NODES_URL, Poller};
use crate::routes;
use crate::state::AppState;

/// Exit status used when a node status payload cannot be decoded.
pub const FATAL_DECODE_EXIT_CODE: i32 = 2;

/// Initializes and runs the exporter.
///
/// # Errors
///
/// Returns an error if the listener cannot bind to the configured address
/// or the server fails while running.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Metrics::new();

    let listener = TcpListener::bind(&config.bind_address).await?;
    info!("Serving metrics on {}", listener.local_addr()?);

    spawn_poller(Poller::new(
        NODES_URL,
        config.poll_interval(),
        metrics.clone(),
    ));

    let state = AppState { metrics };
    axum::serve(listener, routes::create_router(state)).await?;

    Ok(())
}

/// Runs the poller on the runtime. A fatal poll error, such as an undecodable
/// payload, terminates the process.
pub fn spawn_poller<R: NodeStatusRecorder>(poller: Poller<R>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = poller.run().await {
            error!(
                event_name = "poller.failed",
                event_domain = "poller",
                error = %e,
                "node status poller failed, aborting"
            );
            std::process::exit(FATAL_DECODE_EXIT_CODE);
        }
    })
}
