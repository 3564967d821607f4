// ABOUTME: Credential-aware access to the provisioning and asset collaborators.
// ABOUTME: Every call first resolves a client for the stack's environment and role.

use std::sync::Arc;

use crate::assembly::{AssetManifestEntry, StackArtifact, Template};
use crate::cloud::{
    AssetOps, CloudClient, DeployOutcome, DeployStackRequest, RollbackResult,
    RollbackStackRequest, StackOps,
};
use crate::credentials::{CredentialBroker, Mode, RoleOptions};
use crate::diagnostics::{Diagnostics, Warning};
use crate::types::Environment;

use super::error::AssetErrorExt;
use super::{DeployError, RollbackOptions};

pub struct Deployments {
    broker: Arc<CredentialBroker>,
    stacks: Arc<dyn StackOps>,
    assets: Arc<dyn AssetOps>,
}

impl Deployments {
    pub fn new(
        broker: Arc<CredentialBroker>,
        stacks: Arc<dyn StackOps>,
        assets: Arc<dyn AssetOps>,
    ) -> Self {
        Self {
            broker,
            stacks,
            assets,
        }
    }

    pub fn broker(&self) -> &CredentialBroker {
        &self.broker
    }

    /// Client for `env` acting as `role_arn` (placeholders expanded) when given.
    async fn client(
        &self,
        label: &str,
        env: &Environment,
        mode: Mode,
        role_arn: Option<&str>,
        external_id: Option<&str>,
        diagnostics: &Diagnostics,
    ) -> Result<CloudClient, DeployError> {
        let role = match role_arn {
            Some(arn) => {
                let arn = self
                    .broker
                    .environments()
                    .replace_placeholders(arn, env)
                    .await?;
                Some(RoleOptions {
                    role_arn: arn,
                    external_id: external_id.map(str::to_string),
                    ..Default::default()
                })
            }
            None => None,
        };

        let session = self
            .broker
            .for_environment(env, mode, role.as_ref())
            .await?;

        if let Some(role) = &role {
            if !session.did_assume_role {
                diagnostics.warn(Warning::role_fallback(
                    label,
                    &role.role_arn,
                    &session.client.source,
                ));
            }
        }

        Ok(session.client)
    }

    async fn stack_client(
        &self,
        stack: &StackArtifact,
        mode: Mode,
        diagnostics: &Diagnostics,
    ) -> Result<CloudClient, DeployError> {
        let role_arn = match mode {
            Mode::ForReading => stack.read_role_arn(),
            Mode::ForWriting => stack.assume_role_arn.as_deref(),
        };
        self.client(
            stack.display_name(),
            &stack.environment,
            mode,
            role_arn,
            stack.assume_role_external_id.as_deref(),
            diagnostics,
        )
        .await
    }

    async fn asset_client(
        &self,
        asset: &AssetManifestEntry,
        stack: &StackArtifact,
        diagnostics: &Diagnostics,
    ) -> Result<CloudClient, DeployError> {
        self.client(
            stack.display_name(),
            &stack.environment,
            Mode::ForWriting,
            asset.assume_role_arn.as_deref(),
            None,
            diagnostics,
        )
        .await
    }

    pub async fn deploy_stack(
        &self,
        request: &DeployStackRequest,
        diagnostics: &Diagnostics,
    ) -> Result<DeployOutcome, DeployError> {
        let client = self
            .stack_client(&request.stack, Mode::ForWriting, diagnostics)
            .await?;
        Ok(self.stacks.deploy_stack(&client, request).await?)
    }

    pub async fn rollback_stack(
        &self,
        stack: &StackArtifact,
        options: &RollbackOptions,
        diagnostics: &Diagnostics,
    ) -> Result<RollbackResult, DeployError> {
        let client = self
            .stack_client(stack, Mode::ForWriting, diagnostics)
            .await?;
        let request = RollbackStackRequest {
            stack: stack.name.clone(),
            role_arn: options.role_arn.clone(),
            force: options.force,
            orphan_logical_ids: options.orphan_logical_ids.clone(),
            validate_bootstrap_version: options.validate_bootstrap_version,
        };
        Ok(self.stacks.rollback_stack(&client, &request).await?)
    }

    pub async fn destroy_stack(
        &self,
        stack: &StackArtifact,
        role_arn: Option<&str>,
        diagnostics: &Diagnostics,
    ) -> Result<(), DeployError> {
        let client = self
            .stack_client(stack, Mode::ForWriting, diagnostics)
            .await?;
        Ok(self
            .stacks
            .destroy_stack(&client, &stack.name, role_arn)
            .await?)
    }

    pub async fn stack_exists(
        &self,
        stack: &StackArtifact,
        diagnostics: &Diagnostics,
    ) -> Result<bool, DeployError> {
        let client = self
            .stack_client(stack, Mode::ForReading, diagnostics)
            .await?;
        Ok(self.stacks.stack_exists(&client, &stack.name).await?)
    }

    pub async fn read_current_template(
        &self,
        stack: &StackArtifact,
        diagnostics: &Diagnostics,
    ) -> Result<Template, DeployError> {
        let client = self
            .stack_client(stack, Mode::ForReading, diagnostics)
            .await?;
        Ok(self
            .stacks
            .read_current_template(&client, &stack.name)
            .await?)
    }

    /// Builds run locally and need no credentials.
    pub async fn build_asset(
        &self,
        asset: &AssetManifestEntry,
        stack: &StackArtifact,
    ) -> Result<(), DeployError> {
        self.assets.build_asset(asset, stack).await.building(&asset.id)
    }

    pub async fn publish_asset(
        &self,
        asset: &AssetManifestEntry,
        stack: &StackArtifact,
        diagnostics: &Diagnostics,
    ) -> Result<(), DeployError> {
        let client = self.asset_client(asset, stack, diagnostics).await?;
        self.assets
            .publish_asset(&client, asset)
            .await
            .publishing(&asset.id)
    }

    pub async fn is_asset_published(
        &self,
        asset: &AssetManifestEntry,
        stack: &StackArtifact,
        diagnostics: &Diagnostics,
    ) -> Result<bool, DeployError> {
        let client = self.asset_client(asset, stack, diagnostics).await?;
        self.assets
            .is_asset_published(&client, asset)
            .await
            .publishing(&asset.id)
    }
}
