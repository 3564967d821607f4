// ABOUTME: Per-stack deploy state machine with a bounded retry loop.
// ABOUTME: Start -> AttemptDeploy -> (PerformRollback -> AttemptDeploy)? -> Done.

use std::sync::Arc;

use crate::assembly::StackArtifact;
use crate::cloud::{DeployOutcome, DeployStackRequest, RequireApproval, RollbackReason, TemplateDiff};
use crate::diagnostics::{Diagnostics, Warning};

use super::approval::{Prompter, ask_user_confirmation};
use super::{
    DeployError, DeployOptions, Deployments, OutputsCollector, RollbackCoordinator,
    RollbackOptions, StackResult,
};

/// Number of `AttemptDeploy` invocations made so far for one stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Iteration(u8);

impl Iteration {
    /// One attempt, one rollback, one retry.
    pub const MAX: u8 = 2;

    /// The next attempt, or `None` once the bound is used up.
    pub fn next(self) -> Option<Self> {
        (self.0 < Self::MAX).then_some(Self(self.0 + 1))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Where one stack's deployment currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum DeployState {
    Start,
    AttemptDeploy { attempts: Iteration, rollback: bool },
    PerformRollback { attempts: Iteration },
    Done(StackResult),
}

/// Everything a single stack deployment needs, shared by all stacks in a run.
pub struct StackDeployment<'a> {
    pub deployments: &'a Deployments,
    pub rollbacks: &'a RollbackCoordinator,
    pub prompter: &'a dyn Prompter,
    pub diff: &'a dyn TemplateDiff,
    pub options: &'a DeployOptions,
    pub diagnostics: &'a Diagnostics,
    pub outputs: &'a OutputsCollector,
}

impl StackDeployment<'_> {
    /// Drive `stack` from `Start` to `Done`.
    pub async fn run(&self, stack: &Arc<StackArtifact>) -> Result<StackResult, DeployError> {
        let mut state = DeployState::Start;
        loop {
            state = match state {
                DeployState::Start => self.start(stack).await?,
                DeployState::AttemptDeploy { attempts, rollback } => {
                    self.attempt(stack, attempts, rollback).await?
                }
                DeployState::PerformRollback { attempts } => {
                    self.perform_rollback(stack).await?;
                    DeployState::AttemptDeploy {
                        attempts,
                        rollback: true,
                    }
                }
                DeployState::Done(result) => return Ok(result),
            };
        }
    }

    fn concurrency(&self) -> usize {
        self.options.concurrency.stacks.max(1)
    }

    async fn start(&self, stack: &StackArtifact) -> Result<DeployState, DeployError> {
        let name = stack.display_name();

        if stack.template.resource_count() == 0 {
            if !self.deployments.stack_exists(stack, self.diagnostics).await? {
                self.diagnostics.warn(Warning::empty_stack(name));
                return Ok(DeployState::Done(StackResult::Skipped));
            }

            self.diagnostics.warn(Warning::destroyed_empty_stack(name));
            self.deployments
                .destroy_stack(stack, self.options.role_arn.as_deref(), self.diagnostics)
                .await?;
            return Ok(DeployState::Done(StackResult::Destroyed));
        }

        if self.options.require_approval != RequireApproval::Never {
            let current = self
                .deployments
                .read_current_template(stack, self.diagnostics)
                .await?;
            if self
                .diff
                .requires_approval(&current, &stack.template, self.options.require_approval)
            {
                let motivation = "\"--require-approval\" is enabled and stack includes security-sensitive updates";
                let question = format!("{motivation}\nDo you wish to deploy these changes");
                ask_user_confirmation(self.prompter, self.concurrency(), motivation, &question)
                    .await?;
            }
        }

        Ok(DeployState::AttemptDeploy {
            attempts: Iteration::default(),
            rollback: self.options.rollback,
        })
    }

    async fn attempt(
        &self,
        stack: &Arc<StackArtifact>,
        attempts: Iteration,
        rollback: bool,
    ) -> Result<DeployState, DeployError> {
        let Some(attempts) = attempts.next() else {
            return Err(DeployError::DidNotStabilize {
                stack: stack.name.to_string(),
                attempts: attempts.get(),
            });
        };

        tracing::info!(
            "{}: deploying (attempt {}, rollback {})",
            stack.display_name(),
            attempts.get(),
            if rollback { "enabled" } else { "disabled" }
        );

        let request = self.request(stack, rollback);
        let outcome = self
            .deployments
            .deploy_stack(&request, self.diagnostics)
            .await?;

        match outcome {
            DeployOutcome::DidDeploy {
                outputs,
                stack_arn,
                no_op,
            } => {
                if no_op {
                    tracing::info!("{}: no changes", stack.display_name());
                } else {
                    tracing::info!("{}: deployed {}", stack.display_name(), stack_arn);
                }
                self.outputs.record(stack.display_name(), &outputs);
                Ok(DeployState::Done(StackResult::Deployed {
                    stack_arn,
                    no_op,
                    outputs,
                }))
            }
            DeployOutcome::NeedsRollbackFirst { reason, status } => {
                let motivation = match reason {
                    RollbackReason::Replacement => format!(
                        "Stack is in a paused fail state ({status}) and change includes a replacement which cannot be deployed with \"--no-rollback\""
                    ),
                    RollbackReason::Other => format!(
                        "Stack is in a paused fail state ({status}) and command line arguments do not include \"--no-rollback\""
                    ),
                };
                self.confirm_or_force(
                    &motivation,
                    format!("{motivation}. Rolling back first (--force)."),
                    format!("{motivation}. Roll back first and then proceed with deployment"),
                )
                .await?;
                Ok(DeployState::PerformRollback { attempts })
            }
            DeployOutcome::ReplacementRequiresRollback => {
                let motivation =
                    "Change includes a replacement which cannot be deployed with \"--no-rollback\"";
                self.confirm_or_force(
                    motivation,
                    format!("{motivation}. Proceeding with regular deployment (--force)."),
                    format!("{motivation}. Perform a regular deployment"),
                )
                .await?;
                Ok(DeployState::AttemptDeploy {
                    attempts,
                    rollback: true,
                })
            }
            DeployOutcome::Unrecognized { kind } => Err(DeployError::UnexpectedOutcome {
                stack: stack.name.to_string(),
                kind,
            }),
        }
    }

    async fn confirm_or_force(
        &self,
        motivation: &str,
        forced: String,
        question: String,
    ) -> Result<(), DeployError> {
        if self.options.force {
            self.diagnostics.warn(Warning::forced(forced));
            return Ok(());
        }
        ask_user_confirmation(self.prompter, self.concurrency(), motivation, &question).await
    }

    async fn perform_rollback(&self, stack: &Arc<StackArtifact>) -> Result<(), DeployError> {
        let options = RollbackOptions {
            role_arn: self.options.role_arn.clone(),
            force: self.options.force,
            ..Default::default()
        };
        self.rollbacks
            .rollback(std::slice::from_ref(stack), &options, self.diagnostics)
            .await
    }

    fn request(&self, stack: &StackArtifact, rollback: bool) -> DeployStackRequest {
        let tags = if self.options.tags.is_empty() {
            stack.tags.clone()
        } else {
            self.options.tags.clone()
        };

        DeployStackRequest {
            stack: stack.clone(),
            deploy_name: stack.name.clone(),
            role_arn: self.options.role_arn.clone(),
            tags,
            parameters: stack.parameters.clone(),
            method: self.options.method,
            rollback,
            hotswap: self.options.hotswap,
            force: self.options.force,
        }
    }
}
