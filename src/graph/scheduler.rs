// ABOUTME: Walks the work graph, dispatching ready nodes under one concurrency ceiling per category.
// ABOUTME: The first failure stops new dispatch; in-flight nodes drain before it is returned.

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::{
    AssetBuildNode, AssetPublishNode, GraphError, NodeCategory, NodeId, StackNode, WorkGraph,
    WorkNode,
};

/// Maximum number of in-flight nodes per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Concurrency {
    #[serde(default = "default_stacks")]
    pub stacks: usize,
    #[serde(default = "default_asset_builds")]
    pub asset_builds: usize,
    #[serde(default = "default_asset_publishes")]
    pub asset_publishes: usize,
}

fn default_stacks() -> usize {
    1
}

fn default_asset_builds() -> usize {
    1
}

fn default_asset_publishes() -> usize {
    8
}

impl Default for Concurrency {
    fn default() -> Self {
        Self {
            stacks: default_stacks(),
            asset_builds: default_asset_builds(),
            asset_publishes: default_asset_publishes(),
        }
    }
}

impl Concurrency {
    /// Ceiling for `category`; never below one.
    pub fn limit(&self, category: NodeCategory) -> usize {
        let limit = match category {
            NodeCategory::Stack => self.stacks,
            NodeCategory::AssetBuild => self.asset_builds,
            NodeCategory::AssetPublish => self.asset_publishes,
        };
        limit.max(1)
    }
}

/// What to do for each node category.
#[async_trait]
pub trait WorkHandlers: Send + Sync {
    type Error: From<GraphError> + Send;

    async fn deploy_stack(&self, node: &StackNode) -> Result<(), Self::Error>;

    async fn build_asset(&self, node: &AssetBuildNode) -> Result<(), Self::Error>;

    async fn publish_asset(&self, node: &AssetPublishNode) -> Result<(), Self::Error>;
}

async fn dispatch<H: WorkHandlers>(handlers: &H, node: &WorkNode) -> Result<(), H::Error> {
    match node {
        WorkNode::Stack(stack) => handlers.deploy_stack(stack).await,
        WorkNode::AssetBuild(build) => handlers.build_asset(build).await,
        WorkNode::AssetPublish(publish) => handlers.publish_asset(publish).await,
    }
}

/// Execute every node of `graph`.
///
/// A node starts only after all of its dependencies completed successfully.
/// Nodes without a relative dependency run in no particular order.
pub async fn run<H: WorkHandlers>(
    graph: WorkGraph,
    concurrency: &Concurrency,
    handlers: &H,
) -> Result<(), H::Error> {
    let mut pending: BTreeMap<NodeId, WorkNode> = graph.into_nodes();
    let mut completed: HashSet<NodeId> = HashSet::new();
    let mut active: HashMap<NodeCategory, usize> = HashMap::new();
    let mut in_flight: FuturesUnordered<BoxFuture<'_, (NodeId, NodeCategory, Result<(), H::Error>)>> =
        FuturesUnordered::new();
    let mut first_error: Option<H::Error> = None;

    loop {
        if first_error.is_none() {
            let ready: Vec<NodeId> = pending
                .values()
                .filter(|node| node.depends_on().iter().all(|dep| completed.contains(dep)))
                .map(|node| node.id().clone())
                .collect();

            for id in ready {
                let Some(category) = pending.get(&id).map(WorkNode::category) else {
                    continue;
                };
                let running = active.entry(category).or_insert(0);
                if *running >= concurrency.limit(category) {
                    continue;
                }
                let Some(node) = pending.remove(&id) else {
                    continue;
                };
                *running += 1;

                tracing::debug!("Starting {} node {}", category, id);
                in_flight.push(Box::pin(async move {
                    let result = dispatch(handlers, &node).await;
                    (id, category, result)
                }));
            }
        }

        let Some((id, category, result)) = in_flight.next().await else {
            break;
        };

        if let Some(running) = active.get_mut(&category) {
            *running -= 1;
        }

        match result {
            Ok(()) => {
                tracing::debug!("Completed {} node {}", category, id);
                completed.insert(id);
            }
            Err(e) => {
                tracing::debug!("Failed {} node {}", category, id);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    if !pending.is_empty() {
        return Err(GraphError::Stalled(pending.into_keys().collect()).into());
    }

    Ok(())
}
