// ABOUTME: Entry point of the credential subsystem: environment in, credentialed client out.
// ABOUTME: Chains environment resolution, cached base lookup, and role assumption.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::cloud::{CloudClient, IdentityOps};
use crate::types::{AccountId, Environment};

use super::error::AuthError;
use super::{
    BaseCredentialResolver, CredentialOutcome, EnvironmentResolver, Mode,
    PluginCredentialResolver, RoleAssumptionEngine, RoleOptions, RoleSession,
};

/// Tunables for credential handling.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialSettings {
    /// Credentials this close to expiry are refreshed before use.
    #[serde(default = "default_refresh_window", with = "humantime_serde")]
    pub refresh_window: Duration,

    /// Fall back to trusted base credentials when role assumption fails.
    #[serde(default = "default_role_fallback")]
    pub role_fallback: bool,
}

fn default_refresh_window() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_role_fallback() -> bool {
    true
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            refresh_window: default_refresh_window(),
            role_fallback: default_role_fallback(),
        }
    }
}

pub struct CredentialBroker {
    base: Arc<BaseCredentialResolver>,
    environments: EnvironmentResolver,
    roles: RoleAssumptionEngine,
}

impl CredentialBroker {
    pub fn new(
        identity: Arc<dyn IdentityOps>,
        plugins: PluginCredentialResolver,
        settings: &CredentialSettings,
    ) -> Self {
        let base = Arc::new(BaseCredentialResolver::new(
            identity.clone(),
            plugins,
            settings.refresh_window,
        ));
        Self {
            environments: EnvironmentResolver::new(base.clone()),
            roles: RoleAssumptionEngine::new(identity, settings.refresh_window)
                .with_fallback(settings.role_fallback),
            base,
        }
    }

    pub fn base(&self) -> &BaseCredentialResolver {
        &self.base
    }

    pub fn environments(&self) -> &EnvironmentResolver {
        &self.environments
    }

    pub async fn resolve_environment(&self, env: &Environment) -> Result<Environment, AuthError> {
        self.environments.resolve(env).await
    }

    /// Client for `env`, acting as `role` when one is given.
    pub async fn for_environment(
        &self,
        env: &Environment,
        mode: Mode,
        role: Option<&RoleOptions>,
    ) -> Result<RoleSession, AuthError> {
        let env = self.resolve_environment(env).await?;
        let account = AccountId::new(env.account.as_str());
        let base = self.base.fetch_base(&account, mode).await?;

        if let CredentialOutcome::NoCredentials { .. } = base.as_ref() {
            return Err(AuthError::from_outcome(&account, &base));
        }

        let Some(role) = role else {
            return match base.usable_credentials() {
                Some(credentials) => Ok(RoleSession {
                    client: CloudClient::new(
                        &env.region,
                        credentials.clone(),
                        base.source_description(),
                    ),
                    did_assume_role: false,
                }),
                None => Err(AuthError::from_outcome(&account, &base)),
            };
        };

        self.roles.assume_role(&base, role, &env.region).await
    }
}
