// ABOUTME: Replaces unknown-account/unknown-region sentinels with ambient defaults.
// ABOUTME: Also expands ${AWS::AccountId}-style placeholders in role ARNs.

use std::sync::Arc;

use crate::types::Environment;

use super::BaseCredentialResolver;
use super::error::AuthError;

const DEFAULT_PARTITION: &str = "aws";

pub struct EnvironmentResolver {
    base: Arc<BaseCredentialResolver>,
}

impl EnvironmentResolver {
    pub fn new(base: Arc<BaseCredentialResolver>) -> Self {
        Self { base }
    }

    /// Concrete environment with both sentinels substituted.
    pub async fn resolve(&self, env: &Environment) -> Result<Environment, AuthError> {
        let region = if env.has_unknown_region() {
            self.base.identity().default_region()
        } else {
            env.region.clone()
        };

        let account = if env.has_unknown_account() {
            let default_account = self.base.default_account().await?;
            match default_account.info() {
                Some(info) => info.account_id.to_string(),
                None => {
                    return Err(AuthError::UnresolvedAccount {
                        environment: env.name.clone(),
                    });
                }
            }
        } else {
            env.account.clone()
        };

        Ok(Environment::new(account, region))
    }

    /// Expand `${AWS::AccountId}`, `${AWS::Region}` and `${AWS::Partition}` in `value`.
    ///
    /// The partition comes from the ambient account lookup and defaults to `aws`.
    pub async fn replace_placeholders(
        &self,
        value: &str,
        env: &Environment,
    ) -> Result<String, AuthError> {
        if !value.contains("${AWS::") {
            return Ok(value.to_string());
        }

        let resolved = self.resolve(env).await?;
        let partition = self
            .base
            .default_account()
            .await?
            .info()
            .map(|info| info.partition.clone())
            .unwrap_or_else(|| DEFAULT_PARTITION.to_string());

        Ok(value
            .replace("${AWS::AccountId}", &resolved.account)
            .replace("${AWS::Region}", &resolved.region)
            .replace("${AWS::Partition}", &partition))
    }
}
