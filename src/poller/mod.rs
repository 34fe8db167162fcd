//! Periodic polling of the remote node status endpoint.

mod error;
mod node_poller;

pub use error::PollError;
pub use node_poller::{NODES_URL, Poller};
