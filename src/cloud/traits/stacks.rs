// ABOUTME: Stack provisioning operations.
// ABOUTME: Deploy, roll back, destroy, and inspect a single stack.

use async_trait::async_trait;

use crate::assembly::Template;
use crate::cloud::{
    CloudClient, CloudError, DeployOutcome, DeployStackRequest, RollbackResult,
    RollbackStackRequest,
};
use crate::types::StackName;

#[async_trait]
pub trait StackOps: Send + Sync {
    /// Run one provisioning attempt and report how it ended.
    async fn deploy_stack(
        &self,
        client: &CloudClient,
        request: &DeployStackRequest,
    ) -> Result<DeployOutcome, CloudError>;

    /// Roll back a stack that is paused in a failed state.
    async fn rollback_stack(
        &self,
        client: &CloudClient,
        request: &RollbackStackRequest,
    ) -> Result<RollbackResult, CloudError>;

    /// Delete a stack and all of its resources.
    async fn destroy_stack(
        &self,
        client: &CloudClient,
        stack: &StackName,
        role_arn: Option<&str>,
    ) -> Result<(), CloudError>;

    async fn stack_exists(&self, client: &CloudClient, stack: &StackName)
    -> Result<bool, CloudError>;

    /// Template currently deployed; empty when the stack does not exist.
    async fn read_current_template(
        &self,
        client: &CloudClient,
        stack: &StackName,
    ) -> Result<Template, CloudError>;
}
