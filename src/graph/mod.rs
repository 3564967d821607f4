// ABOUTME: Dependency graph of stack deploys and asset builds/publishes, and its scheduler.
// ABOUTME: Each node category runs under its own concurrency ceiling.

mod error;
mod node;
pub mod scheduler;
mod work_graph;

pub use error::GraphError;
pub use node::{AssetBuildNode, AssetPublishNode, NodeCategory, NodeId, StackNode, WorkNode};
pub use scheduler::{Concurrency, WorkHandlers, run};
pub use work_graph::WorkGraph;
