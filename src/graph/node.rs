// ABOUTME: Work graph node types: stack deploys, asset builds, and asset publishes.
// ABOUTME: Each node lists the nodes that must complete before it may start.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::assembly::{AssetManifestEntry, StackArtifact};
use crate::types::{AssetId, StackName};

/// Identifier of a node in the work graph.
///
/// Stacks and assets live in separate variants, so a stack can never share an
/// id with an asset node whatever it is called. Publishes are keyed by asset
/// and destination: one built asset may be published to several places.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Stack(StackName),
    AssetBuild(AssetId),
    AssetPublish { asset: AssetId, destination: String },
}

impl NodeId {
    pub fn stack(name: &StackName) -> Self {
        Self::Stack(name.clone())
    }

    pub fn asset_build(asset: &AssetId) -> Self {
        Self::AssetBuild(asset.clone())
    }

    pub fn asset_publish(asset: &AssetManifestEntry) -> Self {
        Self::AssetPublish {
            asset: asset.id.clone(),
            destination: asset.destination.clone(),
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Stack(name) => write!(f, "{name}"),
            NodeId::AssetBuild(asset) => write!(f, "build-{asset}"),
            NodeId::AssetPublish { asset, destination } => {
                write!(f, "publish-{asset} -> {destination}")
            }
        }
    }
}

/// Node categories, each scheduled under its own concurrency ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeCategory {
    Stack,
    AssetBuild,
    AssetPublish,
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeCategory::Stack => f.write_str("stack"),
            NodeCategory::AssetBuild => f.write_str("asset-build"),
            NodeCategory::AssetPublish => f.write_str("asset-publish"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StackNode {
    pub id: NodeId,
    pub stack: Arc<StackArtifact>,
    pub depends_on: BTreeSet<NodeId>,
}

#[derive(Debug, Clone)]
pub struct AssetBuildNode {
    pub id: NodeId,
    pub asset: Arc<AssetManifestEntry>,
    pub parent_stack: Arc<StackArtifact>,
    pub depends_on: BTreeSet<NodeId>,
}

#[derive(Debug, Clone)]
pub struct AssetPublishNode {
    pub id: NodeId,
    pub asset: Arc<AssetManifestEntry>,
    pub parent_stack: Arc<StackArtifact>,
    pub depends_on: BTreeSet<NodeId>,
}

#[derive(Debug, Clone)]
pub enum WorkNode {
    Stack(StackNode),
    AssetBuild(AssetBuildNode),
    AssetPublish(AssetPublishNode),
}

impl WorkNode {
    pub fn id(&self) -> &NodeId {
        match self {
            WorkNode::Stack(node) => &node.id,
            WorkNode::AssetBuild(node) => &node.id,
            WorkNode::AssetPublish(node) => &node.id,
        }
    }

    pub fn category(&self) -> NodeCategory {
        match self {
            WorkNode::Stack(_) => NodeCategory::Stack,
            WorkNode::AssetBuild(_) => NodeCategory::AssetBuild,
            WorkNode::AssetPublish(_) => NodeCategory::AssetPublish,
        }
    }

    pub fn depends_on(&self) -> &BTreeSet<NodeId> {
        match self {
            WorkNode::Stack(node) => &node.depends_on,
            WorkNode::AssetBuild(node) => &node.depends_on,
            WorkNode::AssetPublish(node) => &node.depends_on,
        }
    }

    pub(crate) fn depends_on_mut(&mut self) -> &mut BTreeSet<NodeId> {
        match self {
            WorkNode::Stack(node) => &mut node.depends_on,
            WorkNode::AssetBuild(node) => &mut node.depends_on,
            WorkNode::AssetPublish(node) => &mut node.depends_on,
        }
    }
}
