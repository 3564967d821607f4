// ABOUTME: The dependency DAG for one deploy invocation.
// ABOUTME: Built from stacks and their assets, pruned of already-published assets, then consumed by the scheduler.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::future::Future;
use std::sync::Arc;

use crate::assembly::StackArtifact;

use super::{AssetBuildNode, AssetPublishNode, GraphError, NodeId, StackNode, WorkNode};

#[derive(Debug, Clone, Default)]
pub struct WorkGraph {
    nodes: BTreeMap<NodeId, WorkNode>,
}

impl WorkGraph {
    /// Build the graph for `stacks`.
    ///
    /// Stacks depend on the publish node of every asset they reference and on
    /// the stacks named in their dependencies. Publishing depends on building.
    /// An asset shared by several stacks gets one build node, created with the
    /// first referencing stack, and one publish node per distinct destination. With `prebuild_assets` off,
    /// asset builds also wait for the parent stack's dependencies.
    pub fn build(stacks: &[Arc<StackArtifact>], prebuild_assets: bool) -> Result<Self, GraphError> {
        let mut names = HashSet::new();
        for stack in stacks {
            if !names.insert(&stack.name) {
                return Err(GraphError::DuplicateStack(stack.name.to_string()));
            }
        }

        let mut graph = WorkGraph::default();

        for stack in stacks {
            let stack_deps = stack
                .dependencies
                .iter()
                .map(|dependency| {
                    if names.contains(dependency) {
                        Ok(NodeId::stack(dependency))
                    } else {
                        Err(GraphError::UnknownDependency {
                            stack: stack.name.to_string(),
                            dependency: dependency.to_string(),
                        })
                    }
                })
                .collect::<Result<BTreeSet<_>, _>>()?;

            let mut depends_on = stack_deps.clone();

            for asset in &stack.assets {
                let asset = Arc::new(asset.clone());
                let build_id = NodeId::asset_build(&asset.id);
                let publish_id = NodeId::asset_publish(&asset);

                if let Entry::Vacant(slot) = graph.nodes.entry(build_id.clone()) {
                    slot.insert(WorkNode::AssetBuild(AssetBuildNode {
                        id: build_id.clone(),
                        asset: asset.clone(),
                        parent_stack: stack.clone(),
                        depends_on: if prebuild_assets {
                            BTreeSet::new()
                        } else {
                            stack_deps.clone()
                        },
                    }));
                }

                if let Entry::Vacant(slot) = graph.nodes.entry(publish_id.clone()) {
                    let mut publish_deps = stack_deps.clone();
                    publish_deps.insert(build_id);
                    slot.insert(WorkNode::AssetPublish(AssetPublishNode {
                        id: publish_id.clone(),
                        asset,
                        parent_stack: stack.clone(),
                        depends_on: publish_deps,
                    }));
                }

                depends_on.insert(publish_id);
            }

            let id = NodeId::stack(&stack.name);
            graph.nodes.insert(
                id.clone(),
                WorkNode::Stack(StackNode {
                    id,
                    stack: stack.clone(),
                    depends_on,
                }),
            );
        }

        graph.waves()?;
        Ok(graph)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &NodeId) -> Option<&WorkNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &WorkNode> {
        self.nodes.values()
    }

    pub fn into_nodes(self) -> BTreeMap<NodeId, WorkNode> {
        self.nodes
    }

    /// Remove a node and every edge pointing at it.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<WorkNode> {
        let removed = self.nodes.remove(id)?;
        for node in self.nodes.values_mut() {
            node.depends_on_mut().remove(id);
        }
        Some(removed)
    }

    fn has_dependents(&self, id: &NodeId) -> bool {
        self.nodes.values().any(|node| node.depends_on().contains(id))
    }

    /// Drop publish nodes whose asset is already at its destination, and any
    /// build node left without dependents. Returns the number of publishes removed.
    pub async fn remove_published_assets<F, Fut, E>(&mut self, mut is_published: F) -> Result<usize, E>
    where
        F: FnMut(AssetPublishNode) -> Fut,
        Fut: Future<Output = Result<bool, E>>,
    {
        let publishes: Vec<AssetPublishNode> = self
            .nodes
            .values()
            .filter_map(|node| match node {
                WorkNode::AssetPublish(publish) => Some(publish.clone()),
                _ => None,
            })
            .collect();

        let mut removed = 0;
        for publish in publishes {
            let id = publish.id.clone();
            if is_published(publish).await? {
                tracing::debug!("Asset already published, skipping {}", id);
                self.remove_node(&id);
                removed += 1;
            }
        }

        let unneeded_builds: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| matches!(node, WorkNode::AssetBuild(_)))
            .map(|node| node.id().clone())
            .filter(|id| !self.has_dependents(id))
            .collect();
        for id in unneeded_builds {
            self.remove_node(&id);
        }

        Ok(removed)
    }

    /// Nodes grouped into waves: every node's dependencies are in earlier waves.
    pub fn waves(&self) -> Result<Vec<Vec<NodeId>>, GraphError> {
        let mut done: HashSet<&NodeId> = HashSet::new();
        let mut remaining: Vec<&WorkNode> = self.nodes.values().collect();
        let mut waves = Vec::new();

        while !remaining.is_empty() {
            let (ready, blocked): (Vec<&WorkNode>, Vec<&WorkNode>) = remaining
                .into_iter()
                .partition(|node| node.depends_on().iter().all(|dep| done.contains(dep)));

            if ready.is_empty() {
                return Err(GraphError::Cycle(
                    blocked.iter().map(|node| node.id().clone()).collect(),
                ));
            }

            done.extend(ready.iter().map(|node| node.id()));
            waves.push(ready.iter().map(|node| node.id().clone()).collect());
            remaining = blocked;
        }

        Ok(waves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{AssetKind, AssetManifestEntry, Template};
    use crate::types::{AssetId, Environment, StackName};

    fn stack(name: &str) -> StackArtifact {
        StackArtifact::new(
            StackName::new(name).unwrap(),
            Environment::new("111111111111", "eu-west-1"),
            Template::default(),
        )
    }

    fn asset(id: &str) -> AssetManifestEntry {
        AssetManifestEntry::new(id, AssetKind::File, "asset.zip", "bucket/asset.zip")
    }

    fn id(name: &str) -> NodeId {
        NodeId::stack(&StackName::new(name).unwrap())
    }

    #[test]
    fn stack_waits_for_its_asset_publish() {
        let stacks = vec![Arc::new(stack("app").with_asset(asset("a1")))];
        let graph = WorkGraph::build(&stacks, true).unwrap();

        assert_eq!(graph.len(), 3);
        let waves = graph.waves().unwrap();
        assert_eq!(waves.len(), 3);
        assert_eq!(waves[0][0].to_string(), "build-a1");
        assert_eq!(waves[1][0].to_string(), "publish-a1 -> bucket/asset.zip");
        assert_eq!(waves[2][0], id("app"));
    }

    #[test]
    fn shared_asset_gets_one_build_and_publish() {
        let stacks = vec![
            Arc::new(stack("one").with_asset(asset("shared"))),
            Arc::new(stack("two").with_asset(asset("shared"))),
        ];
        let graph = WorkGraph::build(&stacks, true).unwrap();

        assert_eq!(graph.len(), 4);
        let publish = NodeId::asset_publish(&asset("shared"));
        for name in ["one", "two"] {
            let node = graph.get(&id(name)).unwrap();
            assert!(node.depends_on().contains(&publish));
        }
    }

    #[test]
    fn stacks_named_like_asset_nodes_do_not_replace_them() {
        for stacks in [
            vec![
                Arc::new(stack("build-a1")),
                Arc::new(stack("publish-a1")),
                Arc::new(stack("app").with_asset(asset("a1"))),
            ],
            vec![
                Arc::new(stack("app").with_asset(asset("a1"))),
                Arc::new(stack("build-a1")),
                Arc::new(stack("publish-a1")),
            ],
        ] {
            let graph = WorkGraph::build(&stacks, true).unwrap();
            assert_eq!(graph.len(), 5);

            let build = NodeId::asset_build(&AssetId::new("a1"));
            let publish = NodeId::asset_publish(&asset("a1"));
            assert!(matches!(graph.get(&build), Some(WorkNode::AssetBuild(_))));
            assert!(matches!(graph.get(&publish), Some(WorkNode::AssetPublish(_))));

            let publish_deps = graph.get(&publish).unwrap().depends_on();
            assert_eq!(publish_deps, &BTreeSet::from([build]));
            assert!(graph.get(&id("build-a1")).unwrap().depends_on().is_empty());
        }
    }

    #[test]
    fn shared_asset_is_published_to_every_destination() {
        let to_one = AssetManifestEntry::new("code", AssetKind::File, "code.zip", "bucket-one/code.zip");
        let to_two = AssetManifestEntry::new("code", AssetKind::File, "code.zip", "bucket-two/code.zip");
        let stacks = vec![
            Arc::new(stack("one").with_asset(to_one.clone())),
            Arc::new(stack("two").with_asset(to_two.clone())),
        ];
        let graph = WorkGraph::build(&stacks, true).unwrap();

        // one build, two publishes, two stacks
        assert_eq!(graph.len(), 5);
        let build = NodeId::asset_build(&AssetId::new("code"));
        for (name, entry) in [("one", &to_one), ("two", &to_two)] {
            let publish = NodeId::asset_publish(entry);
            let Some(WorkNode::AssetPublish(node)) = graph.get(&publish) else {
                panic!("no publish node for {}", entry.destination);
            };
            assert_eq!(node.asset.destination, entry.destination);
            assert!(node.depends_on.contains(&build));

            let deps = graph.get(&id(name)).unwrap().depends_on();
            assert_eq!(deps, &BTreeSet::from([publish]));
        }
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let stacks = vec![Arc::new(
            stack("app").with_dependency(StackName::new("missing").unwrap()),
        )];
        let err = WorkGraph::build(&stacks, true).unwrap_err();
        assert!(matches!(err, GraphError::UnknownDependency { .. }));
    }

    #[test]
    fn duplicate_stack_is_rejected() {
        let stacks = vec![Arc::new(stack("app")), Arc::new(stack("app"))];
        let err = WorkGraph::build(&stacks, true).unwrap_err();
        assert_eq!(err, GraphError::DuplicateStack("app".to_string()));
    }

    #[test]
    fn cycle_is_rejected() {
        let stacks = vec![
            Arc::new(stack("a").with_dependency(StackName::new("b").unwrap())),
            Arc::new(stack("b").with_dependency(StackName::new("a").unwrap())),
        ];
        let err = WorkGraph::build(&stacks, true).unwrap_err();
        assert!(matches!(err, GraphError::Cycle(nodes) if nodes.len() == 2));
    }

    #[test]
    fn build_waits_for_stack_dependencies_without_prebuild() {
        let stacks = vec![
            Arc::new(stack("base")),
            Arc::new(
                stack("app")
                    .with_dependency(StackName::new("base").unwrap())
                    .with_asset(asset("a1")),
            ),
        ];

        let prebuilt = WorkGraph::build(&stacks, true).unwrap();
        let build = NodeId::asset_build(&AssetId::new("a1"));
        assert!(prebuilt.get(&build).unwrap().depends_on().is_empty());

        let serial = WorkGraph::build(&stacks, false).unwrap();
        assert!(serial.get(&build).unwrap().depends_on().contains(&id("base")));
    }

    #[tokio::test]
    async fn published_assets_are_pruned_with_their_builds() {
        let stacks = vec![Arc::new(
            stack("app").with_asset(asset("done")).with_asset(asset("todo")),
        )];
        let mut graph = WorkGraph::build(&stacks, true).unwrap();
        assert_eq!(graph.len(), 5);

        let removed = graph
            .remove_published_assets(|node| async move {
                Ok::<_, GraphError>(node.asset.id.as_str() == "done")
            })
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(graph.len(), 3);
        let app = graph.get(&id("app")).unwrap();
        assert_eq!(app.depends_on().len(), 1);
        assert!(graph.get(&NodeId::asset_build(&AssetId::new("done"))).is_none());
    }
}
