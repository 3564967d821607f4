// ABOUTME: Request and result types shared by the collaborator traits.
// ABOUTME: Deploy outcomes, rollback results, role requests, and deployment knobs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::assembly::StackArtifact;
use crate::types::{AccountId, StackName};

/// Identity of the ambient principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub account_id: AccountId,
    pub partition: String,
}

impl AccountInfo {
    pub fn new(account_id: impl Into<String>, partition: impl Into<String>) -> Self {
        Self {
            account_id: AccountId::new(account_id),
            partition: partition.into(),
        }
    }
}

/// Extra parameters for a role-assumption call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssumeRoleOptions {
    pub duration: Option<Duration>,
    pub tags: BTreeMap<String, String>,
    pub transitive_tag_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub session_name: String,
    pub external_id: Option<String>,
    pub options: AssumeRoleOptions,
}

/// How a stack update is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentMethod {
    /// Create and execute a change set.
    #[default]
    ChangeSet,
    /// Call create/update directly.
    Direct,
}

/// Whether the expedited update path may be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HotswapMode {
    #[default]
    FullDeployment,
    HotswapOnly,
    FallBack,
}

/// When a human has to approve a deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequireApproval {
    Never,
    AnyChange,
    #[default]
    Broadening,
}

/// One provisioning call for one stack.
#[derive(Debug, Clone)]
pub struct DeployStackRequest {
    pub stack: StackArtifact,
    pub deploy_name: StackName,
    /// Execution role handed to the provisioning service.
    pub role_arn: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub parameters: BTreeMap<String, String>,
    pub method: DeploymentMethod,
    pub rollback: bool,
    pub hotswap: HotswapMode,
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct RollbackStackRequest {
    pub stack: StackName,
    pub role_arn: Option<String>,
    pub force: bool,
    pub orphan_logical_ids: Vec<String>,
    pub validate_bootstrap_version: bool,
}

/// Why a paused stack must be rolled back before deploying again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackReason {
    /// The pending change replaces a resource.
    Replacement,
    /// Rollback was disabled but the stack is paused in a failed state.
    Other,
}

/// Result of a single provisioning call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployOutcome {
    DidDeploy {
        outputs: BTreeMap<String, String>,
        stack_arn: String,
        no_op: bool,
    },
    NeedsRollbackFirst {
        reason: RollbackReason,
        status: String,
    },
    ReplacementRequiresRollback,
    /// A result type the provisioning layer reported that has no mapping here.
    Unrecognized { kind: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollbackResult {
    pub not_in_rollbackable_state: bool,
}
