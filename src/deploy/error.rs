// ABOUTME: Error types for deploy and rollback runs.
// ABOUTME: Expired-token cloud errors always surface as `DeployError::Cloud`, never rewrapped.

use std::path::PathBuf;

use crate::cloud::CloudError;
use crate::credentials::AuthError;
use crate::graph::GraphError;
use crate::types::AssetId;

/// Errors that can end a deploy or rollback run.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Credential resolution failed.
    #[error(transparent)]
    Auth(AuthError),

    /// A provisioning call failed; also carries expired-token errors from anywhere.
    #[error(transparent)]
    Cloud(#[from] CloudError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Confirmation needed but nobody is at the terminal.
    #[error(
        "{motivation}, but terminal (TTY) is not attached so we are unable to get a confirmation from the user"
    )]
    NoTerminal { motivation: String },

    /// Confirmation needed but several stacks deploy at once.
    #[error(
        "{motivation}, but concurrency is greater than 1 so we are unable to get a confirmation from the user"
    )]
    ConcurrencyTooHigh { motivation: String },

    #[error("Aborted by user")]
    Aborted,

    #[error("failed to read confirmation: {0}")]
    Prompt(#[source] std::io::Error),

    #[error(
        "{stack}: deployment did not stabilize within {attempts} attempts; please file a bug report"
    )]
    DidNotStabilize { stack: String, attempts: u8 },

    #[error("{stack}: unexpected result type from deployment: {kind}; please file a bug report")]
    UnexpectedOutcome { stack: String, kind: String },

    #[error("Rollback failed (use --force to orphan failing resources): {source}")]
    RollbackFailed {
        stack: String,
        #[source]
        source: Box<DeployError>,
    },

    #[error("No stacks were in a state that could be rolled back")]
    NoRollbackableStacks,

    #[error("failed to build asset {asset}: {source}")]
    AssetBuild {
        asset: AssetId,
        #[source]
        source: CloudError,
    },

    #[error("failed to publish asset {asset}: {source}")]
    AssetPublish {
        asset: AssetId,
        #[source]
        source: CloudError,
    },

    #[error("failed to write outputs file {path}: {source}")]
    OutputsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode stack outputs: {0}")]
    OutputsEncode(#[from] serde_json::Error),
}

/// Coarse classification of a `DeployError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    ExpiredToken,
    Auth,
    Cloud,
    Graph,
    Confirmation,
    Defensive,
    Rollback,
    Asset,
    Outputs,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        if self.is_expired_token() {
            return DeployErrorKind::ExpiredToken;
        }
        match self {
            DeployError::Auth(_) => DeployErrorKind::Auth,
            DeployError::Cloud(_) => DeployErrorKind::Cloud,
            DeployError::Graph(GraphError::Stalled(_)) => DeployErrorKind::Defensive,
            DeployError::Graph(_) => DeployErrorKind::Graph,
            DeployError::NoTerminal { .. }
            | DeployError::ConcurrencyTooHigh { .. }
            | DeployError::Aborted
            | DeployError::Prompt(_) => DeployErrorKind::Confirmation,
            DeployError::DidNotStabilize { .. } | DeployError::UnexpectedOutcome { .. } => {
                DeployErrorKind::Defensive
            }
            DeployError::RollbackFailed { .. } | DeployError::NoRollbackableStacks => {
                DeployErrorKind::Rollback
            }
            DeployError::AssetBuild { .. } | DeployError::AssetPublish { .. } => {
                DeployErrorKind::Asset
            }
            DeployError::OutputsFile { .. } | DeployError::OutputsEncode(_) => {
                DeployErrorKind::Outputs
            }
        }
    }

    pub fn is_expired_token(&self) -> bool {
        self.cloud_error().is_some_and(CloudError::is_expired_token)
    }

    /// The underlying cloud error, when there is one.
    pub fn cloud_error(&self) -> Option<&CloudError> {
        match self {
            DeployError::Cloud(e) => Some(e),
            DeployError::Auth(e) => e.cloud_error(),
            DeployError::AssetBuild { source, .. } | DeployError::AssetPublish { source, .. } => {
                Some(source)
            }
            DeployError::RollbackFailed { source, .. } => source.cloud_error(),
            _ => None,
        }
    }
}

impl From<AuthError> for DeployError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Cloud { source } => DeployError::Cloud(source),
            other => DeployError::Auth(other),
        }
    }
}

/// Attach asset context to cloud errors, leaving expired tokens untouched.
pub trait AssetErrorExt<T> {
    fn building(self, asset: &AssetId) -> Result<T, DeployError>;
    fn publishing(self, asset: &AssetId) -> Result<T, DeployError>;
}

impl<T> AssetErrorExt<T> for Result<T, CloudError> {
    fn building(self, asset: &AssetId) -> Result<T, DeployError> {
        self.map_err(|source| {
            if source.is_expired_token() {
                DeployError::Cloud(source)
            } else {
                DeployError::AssetBuild {
                    asset: asset.clone(),
                    source,
                }
            }
        })
    }

    fn publishing(self, asset: &AssetId) -> Result<T, DeployError> {
        self.map_err(|source| {
            if source.is_expired_token() {
                DeployError::Cloud(source)
            } else {
                DeployError::AssetPublish {
                    asset: asset.clone(),
                    source,
                }
            }
        })
    }
}
