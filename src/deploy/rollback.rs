// ABOUTME: Rolls back stacks paused in a failed state.
// ABOUTME: Fails when one stack's rollback fails, or when no stack was eligible at all.

use std::sync::Arc;

use crate::assembly::StackArtifact;
use crate::cloud::RollbackResult;
use crate::diagnostics::Diagnostics;

use super::{DeployError, Deployments, RollbackOptions};

pub struct RollbackCoordinator {
    deployments: Arc<Deployments>,
}

impl RollbackCoordinator {
    pub fn new(deployments: Arc<Deployments>) -> Self {
        Self { deployments }
    }

    /// Roll back one stack.
    ///
    /// Failures become `RollbackFailed` with a hint to use `--force`;
    /// expired-token errors pass through unchanged.
    pub async fn rollback_stack(
        &self,
        stack: &StackArtifact,
        options: &RollbackOptions,
        diagnostics: &Diagnostics,
    ) -> Result<RollbackResult, DeployError> {
        tracing::info!("{}: rolling back", stack.display_name());

        match self
            .deployments
            .rollback_stack(stack, options, diagnostics)
            .await
        {
            Ok(result) => {
                if result.not_in_rollbackable_state {
                    tracing::debug!("{}: not in a rollbackable state", stack.display_name());
                }
                Ok(result)
            }
            Err(e) if e.is_expired_token() => Err(e),
            Err(e) => {
                tracing::error!("{} failed: {}", stack.display_name(), e);
                Err(DeployError::RollbackFailed {
                    stack: stack.name.to_string(),
                    source: Box::new(e),
                })
            }
        }
    }

    /// Roll back `stacks` one at a time, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// `NoRollbackableStacks` if none of the stacks could be rolled back.
    pub async fn rollback(
        &self,
        stacks: &[Arc<StackArtifact>],
        options: &RollbackOptions,
        diagnostics: &Diagnostics,
    ) -> Result<(), DeployError> {
        let ordered: Vec<&Arc<StackArtifact>> = if options.reverse {
            stacks.iter().rev().collect()
        } else {
            stacks.iter().collect()
        };

        let mut any_rollbackable = false;
        for stack in ordered {
            let result = self.rollback_stack(stack, options, diagnostics).await?;
            if !result.not_in_rollbackable_state {
                any_rollbackable = true;
            }
        }

        if !any_rollbackable {
            return Err(DeployError::NoRollbackableStacks);
        }

        Ok(())
    }
}
