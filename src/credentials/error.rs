// ABOUTME: Authentication error types with SNAFU pattern.
// ABOUTME: Fatal credential failures; expired tokens pass through the Cloud variant untouched.

use snafu::Snafu;

use crate::cloud::CloudError;
use crate::types::AccountId;

use super::CredentialOutcome;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum AuthError {
    /// Neither ambient credentials nor any plugin are available.
    #[snafu(display("{message}"))]
    NoCredentials { account: AccountId, message: String },

    /// Ambient credentials belong to another account and no plugin matched.
    #[snafu(display("{message}"))]
    WrongAccount {
        account: AccountId,
        current_account: AccountId,
        message: String,
    },

    /// Role assumption failed and falling back to the base credentials was not allowed.
    #[snafu(display(
        "Could not assume role in target account using {source_description}: {source}. \
         Please make sure that the role {role_arn} exists in the account. If it doesn't exist, \
         (re)-bootstrap the environment with the right trust settings"
    ))]
    AssumeRole {
        role_arn: String,
        source_description: String,
        source: CloudError,
    },

    #[snafu(display(
        "Unable to resolve the account to use for {environment}. It must be either configured \
         on the stack or derivable from ambient credentials"
    ))]
    UnresolvedAccount { environment: String },

    /// A collaborator error passed through unchanged (always the case for expired tokens).
    #[snafu(display("{source}"))]
    Cloud { source: CloudError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No credentials configured at all for the target account.
    NoCredentials,
    /// Ambient credentials belong to a different account.
    WrongAccount,
    /// Role assumption failed without a usable fallback.
    AssumeRoleFailed,
    /// The environment's account could not be determined.
    UnresolvedAccount,
    /// The caller's credentials have expired.
    ExpiredToken,
    /// Any other collaborator failure.
    Cloud,
}

impl AuthError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::NoCredentials { .. } => AuthErrorKind::NoCredentials,
            AuthError::WrongAccount { .. } => AuthErrorKind::WrongAccount,
            AuthError::AssumeRole { .. } => AuthErrorKind::AssumeRoleFailed,
            AuthError::UnresolvedAccount { .. } => AuthErrorKind::UnresolvedAccount,
            AuthError::Cloud { source } if source.is_expired_token() => AuthErrorKind::ExpiredToken,
            AuthError::Cloud { .. } => AuthErrorKind::Cloud,
        }
    }

    pub fn is_expired_token(&self) -> bool {
        self.kind() == AuthErrorKind::ExpiredToken
    }

    /// The passed-through collaborator error, if this is one.
    pub fn cloud_error(&self) -> Option<&CloudError> {
        match self {
            AuthError::Cloud { source } => Some(source),
            _ => None,
        }
    }

    /// Fatal error for an outcome that carries no credentials usable in `account`.
    pub fn from_outcome(account: &AccountId, outcome: &CredentialOutcome) -> Self {
        let message = obtain_credentials_message(account, outcome);
        match outcome {
            CredentialOutcome::IncorrectDefault { account_id, .. } => AuthError::WrongAccount {
                account: account.clone(),
                current_account: account_id.clone(),
                message,
            },
            _ => AuthError::NoCredentials {
                account: account.clone(),
                message,
            },
        }
    }
}

impl From<CloudError> for AuthError {
    fn from(source: CloudError) -> Self {
        AuthError::Cloud { source }
    }
}

/// One-line explanation of why no usable credentials exist, naming the plugins tried.
pub fn obtain_credentials_message(account: &AccountId, outcome: &CredentialOutcome) -> String {
    let mut parts = vec![format!("Need to perform AWS calls for account {account}")];

    let unused_plugins: &[String] = match outcome {
        CredentialOutcome::IncorrectDefault {
            account_id,
            unused_plugins,
            ..
        } => {
            parts.push(format!("but the current credentials are for {account_id}"));
            unused_plugins
        }
        CredentialOutcome::NoCredentials { unused_plugins } => {
            parts.push("but no credentials have been configured".to_string());
            unused_plugins
        }
        CredentialOutcome::CorrectDefault { .. } | CredentialOutcome::Plugin { .. } => &[],
    };

    if !unused_plugins.is_empty() {
        parts.push(format!(
            "and none of these plugins found any: {}",
            unused_plugins.join(", ")
        ));
    }

    parts.join(", ")
}
