pub mod node_status;

pub use node_status::{NodeCounts, NodeStatus};
