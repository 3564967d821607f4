// ABOUTME: Errors from building or walking the work graph.

use super::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("stack {stack} depends on {dependency}, which is not part of this deployment")]
    UnknownDependency { stack: String, dependency: String },

    #[error("duplicate stack in deployment: {0}")]
    DuplicateStack(String),

    #[error("dependency cycle between: {}", format_nodes(.0))]
    Cycle(Vec<NodeId>),

    #[error(
        "work graph stopped making progress with {} node(s) left ({}); please file a bug report",
        .0.len(),
        format_nodes(.0)
    )]
    Stalled(Vec<NodeId>),
}

fn format_nodes(nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
