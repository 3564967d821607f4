// ABOUTME: Interfaces to the external provisioning, identity, and asset services.
// ABOUTME: The orchestrator only calls these; it never implements the services themselves.

mod client;
mod error;
pub mod traits;
mod types;

pub use client::CloudClient;
pub use error::{CloudError, CloudErrorKind};
pub use traits::{AssetOps, IdentityOps, StackOps, TemplateDiff};
pub use types::{
    AccountInfo, AssumeRoleOptions, AssumeRoleRequest, DeployOutcome, DeployStackRequest,
    DeploymentMethod, HotswapMode, RequireApproval, RollbackReason, RollbackResult,
    RollbackStackRequest,
};
