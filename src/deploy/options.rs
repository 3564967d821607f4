// ABOUTME: Knobs for a deploy or rollback run.
// ABOUTME: Built from the config file or directly by library callers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cloud::{DeploymentMethod, HotswapMode, RequireApproval};
use crate::graph::Concurrency;

#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub concurrency: Concurrency,
    pub require_approval: RequireApproval,
    /// Roll back on failure. Turned on automatically when a paused stack must be recovered.
    pub rollback: bool,
    /// Skip confirmations for rollbacks and replacements.
    pub force: bool,
    pub hotswap: HotswapMode,
    pub method: DeploymentMethod,
    /// Where to write the collected stack outputs as JSON.
    pub outputs_file: Option<PathBuf>,
    /// Build assets as early as possible instead of right before their stack.
    pub prebuild_assets: bool,
    /// Execution role passed to the provisioning service.
    pub role_arn: Option<String>,
    /// Overrides each stack's own tags when non-empty.
    pub tags: BTreeMap<String, String>,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            concurrency: Concurrency::default(),
            require_approval: RequireApproval::default(),
            rollback: true,
            force: false,
            hotswap: HotswapMode::default(),
            method: DeploymentMethod::default(),
            outputs_file: None,
            prebuild_assets: true,
            role_arn: None,
            tags: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RollbackOptions {
    pub role_arn: Option<String>,
    /// Orphan resources that fail to roll back.
    pub force: bool,
    pub orphan_logical_ids: Vec<String>,
    pub validate_bootstrap_version: bool,
    /// Walk stacks in reverse deploy order.
    pub reverse: bool,
}

impl Default for RollbackOptions {
    fn default() -> Self {
        Self {
            role_arn: None,
            force: false,
            orphan_logical_ids: Vec::new(),
            validate_bootstrap_version: true,
            reverse: false,
        }
    }
}
