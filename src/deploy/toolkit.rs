// ABOUTME: Top-level deploy and rollback entry points.
// ABOUTME: Builds the work graph, prunes published assets, and runs it under per-category limits.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::assembly::StackArtifact;
use crate::cloud::TemplateDiff;
use crate::diagnostics::Diagnostics;
use crate::graph::{self, AssetBuildNode, AssetPublishNode, StackNode, WorkGraph, WorkHandlers};
use crate::types::StackName;

use super::approval::Prompter;
use super::machine::StackDeployment;
use super::{
    DeployError, DeployOptions, DeployReport, Deployments, OutputsCollector, RollbackCoordinator,
    RollbackOptions, StackResult,
};

pub struct Toolkit {
    deployments: Arc<Deployments>,
    rollbacks: RollbackCoordinator,
    prompter: Arc<dyn Prompter>,
    diff: Arc<dyn TemplateDiff>,
}

impl Toolkit {
    pub fn new(
        deployments: Arc<Deployments>,
        prompter: Arc<dyn Prompter>,
        diff: Arc<dyn TemplateDiff>,
    ) -> Self {
        Self {
            rollbacks: RollbackCoordinator::new(deployments.clone()),
            deployments,
            prompter,
            diff,
        }
    }

    /// Deploy `stacks` and their assets in dependency order.
    ///
    /// Outputs collected before a failure are still written to
    /// `options.outputs_file`.
    pub async fn deploy(
        &self,
        stacks: &[Arc<StackArtifact>],
        options: &DeployOptions,
    ) -> Result<DeployReport, DeployError> {
        let work = WorkGraph::build(stacks, options.prebuild_assets)?;
        let diagnostics = Diagnostics::default();
        let outputs = OutputsCollector::default();
        let run = DeployRun {
            stack: StackDeployment {
                deployments: &self.deployments,
                rollbacks: &self.rollbacks,
                prompter: self.prompter.as_ref(),
                diff: self.diff.as_ref(),
                options,
                diagnostics: &diagnostics,
                outputs: &outputs,
            },
            results: Mutex::new(BTreeMap::new()),
        };

        let result = run.execute(work).await;

        if let Some(path) = &options.outputs_file {
            let written = outputs.write(path).await;
            if result.is_ok() {
                written?;
            } else if let Err(e) = written {
                tracing::error!("{}", e);
            }
        }
        result?;

        let results = run.results.into_inner();
        Ok(DeployReport {
            results,
            outputs: outputs.into_outputs(),
            warnings: diagnostics.into_warnings(),
        })
    }

    /// Roll back `stacks` that are paused in a failed state.
    pub async fn rollback(
        &self,
        stacks: &[Arc<StackArtifact>],
        options: &RollbackOptions,
    ) -> Result<(), DeployError> {
        let diagnostics = Diagnostics::default();
        self.rollbacks.rollback(stacks, options, &diagnostics).await
    }
}

struct DeployRun<'a> {
    stack: StackDeployment<'a>,
    results: Mutex<BTreeMap<StackName, StackResult>>,
}

impl DeployRun<'_> {
    async fn execute(&self, mut work: WorkGraph) -> Result<(), DeployError> {
        let deployments = self.stack.deployments;
        let diagnostics = self.stack.diagnostics;

        let pruned = work
            .remove_published_assets(|node| async move {
                deployments
                    .is_asset_published(&node.asset, &node.parent_stack, diagnostics)
                    .await
            })
            .await?;
        if pruned > 0 {
            tracing::debug!("{} asset(s) already published", pruned);
        }

        graph::run(work, &self.stack.options.concurrency, self).await
    }
}

#[async_trait]
impl WorkHandlers for DeployRun<'_> {
    type Error = DeployError;

    async fn deploy_stack(&self, node: &StackNode) -> Result<(), DeployError> {
        let result = self.stack.run(&node.stack).await?;
        self.results.lock().insert(node.stack.name.clone(), result);
        Ok(())
    }

    async fn build_asset(&self, node: &AssetBuildNode) -> Result<(), DeployError> {
        tracing::info!("{}: building asset {}", node.parent_stack.display_name(), node.asset.id);
        self.stack
            .deployments
            .build_asset(&node.asset, &node.parent_stack)
            .await
    }

    async fn publish_asset(&self, node: &AssetPublishNode) -> Result<(), DeployError> {
        tracing::info!("{}: publishing asset {}", node.parent_stack.display_name(), node.asset.id);
        self.stack
            .deployments
            .publish_asset(&node.asset, &node.parent_stack, self.stack.diagnostics)
            .await
    }
}
