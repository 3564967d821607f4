// ABOUTME: Layers role assumption on top of resolved base credentials.
// ABOUTME: Falls back to base credentials when they are already trusted for the target account.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::cloud::{AssumeRoleOptions, AssumeRoleRequest, CloudClient, CloudError, IdentityOps};

use super::error::AuthError;
use super::{CachingProvider, CredentialOutcome, CredentialProvider, Credentials, SharedProvider};

const SESSION_PREFIX: &str = "stackhand";
const MAX_SESSION_NAME_LEN: usize = 64;

/// Role to assume for a target environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleOptions {
    pub role_arn: String,
    pub external_id: Option<String>,
    pub session: AssumeRoleOptions,
}

impl RoleOptions {
    pub fn new(role_arn: impl Into<String>) -> Self {
        Self {
            role_arn: role_arn.into(),
            ..Default::default()
        }
    }
}

/// A client plus whether it acts as the assumed role.
#[derive(Debug, Clone)]
pub struct RoleSession {
    pub client: CloudClient,
    pub did_assume_role: bool,
}

/// Provider that calls the identity service for fresh role credentials on every invocation.
struct AssumedRoleProvider {
    identity: Arc<dyn IdentityOps>,
    base: SharedProvider,
    request: AssumeRoleRequest,
    region: String,
}

#[async_trait]
impl CredentialProvider for AssumedRoleProvider {
    async fn provide(&self) -> Result<Credentials, CloudError> {
        tracing::debug!(
            "Assuming role {} as session {}",
            self.request.role_arn,
            self.request.session_name
        );
        self.identity
            .assume_role(&self.base, &self.request, &self.region)
            .await
    }
}

pub struct RoleAssumptionEngine {
    identity: Arc<dyn IdentityOps>,
    refresh_window: Duration,
    fallback_to_base: bool,
}

impl RoleAssumptionEngine {
    pub fn new(identity: Arc<dyn IdentityOps>, refresh_window: Duration) -> Self {
        Self {
            identity,
            refresh_window,
            fallback_to_base: true,
        }
    }

    /// Whether a failed assumption may fall back to trusted base credentials.
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_base = enabled;
        self
    }

    /// Assume `role` using the base credentials in `base`.
    ///
    /// The returned credentials are cached and refreshed on expiry; the
    /// provider is invoked once up front so failures surface here.
    pub async fn assume_role(
        &self,
        base: &CredentialOutcome,
        role: &RoleOptions,
        region: &str,
    ) -> Result<RoleSession, AuthError> {
        let Some(base_credentials) = base.any_credentials() else {
            return Err(AuthError::AssumeRole {
                role_arn: role.role_arn.clone(),
                source_description: base.source_description(),
                source: CloudError::other("no base credentials available to assume the role with"),
            });
        };

        let request = AssumeRoleRequest {
            role_arn: role.role_arn.clone(),
            session_name: session_name(),
            external_id: role.external_id.clone(),
            options: role.session.clone(),
        };
        let assumed = CachingProvider::shared(
            Arc::new(AssumedRoleProvider {
                identity: self.identity.clone(),
                base: base_credentials.clone(),
                request,
                region: region.to_string(),
            }),
            self.refresh_window,
        );

        match assumed.provide().await {
            Ok(_) => Ok(RoleSession {
                client: CloudClient::new(region, assumed, format!("role {}", role.role_arn)),
                did_assume_role: true,
            }),
            Err(e) if e.is_expired_token() => Err(AuthError::Cloud { source: e }),
            Err(e) => self.recover(base, role, region, e),
        }
    }

    fn recover(
        &self,
        base: &CredentialOutcome,
        role: &RoleOptions,
        region: &str,
        error: CloudError,
    ) -> Result<RoleSession, AuthError> {
        match (self.fallback_to_base, base.usable_credentials()) {
            (true, Some(credentials)) => {
                tracing::warn!(
                    "Could not assume role {} ({}); continuing with {}",
                    role.role_arn,
                    error,
                    base.source_description()
                );
                Ok(RoleSession {
                    client: CloudClient::new(
                        region,
                        credentials.clone(),
                        base.source_description(),
                    ),
                    did_assume_role: false,
                })
            }
            _ => Err(AuthError::AssumeRole {
                role_arn: role.role_arn.clone(),
                source_description: base.source_description(),
                source: error,
            }),
        }
    }
}

/// Role session name derived from the local user, e.g. `stackhand-alice`.
pub fn session_name() -> String {
    let user = whoami::fallible::username().unwrap_or_else(|_| "noname".to_string());
    let mut name = format!("{SESSION_PREFIX}-{}", sanitize_username(&user));
    name.truncate(MAX_SESSION_NAME_LEN);
    name
}

/// Replace characters a role session name cannot contain with `@`.
fn sanitize_username(user: &str) -> String {
    let cleaned: String = user
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "_+=,.@-".contains(c) {
                c
            } else {
                '@'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "noname".to_string()
    } else {
        cleaned
    }
}
