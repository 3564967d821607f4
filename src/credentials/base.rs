// ABOUTME: Decides which credential source is authoritative for a target account.
// ABOUTME: Returns a tagged outcome, cached per (account, mode), and never errors for "wrong account".

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::cloud::{AccountInfo, CloudError, IdentityOps};
use crate::types::AccountId;

use super::{
    CachingProvider, CredentialOutcome, DefaultAccount, DefaultAccountCache, Mode,
    PluginCredentialResolver, SharedProvider, SingleFlightCache,
};

/// Resolves base credentials (before any role assumption) for target accounts.
pub struct BaseCredentialResolver {
    identity: Arc<dyn IdentityOps>,
    plugins: PluginCredentialResolver,
    refresh_window: Duration,
    default_credentials: OnceCell<SharedProvider>,
    default_account: DefaultAccountCache,
    outcomes: SingleFlightCache<(AccountId, Mode), Arc<CredentialOutcome>>,
}

impl BaseCredentialResolver {
    pub fn new(
        identity: Arc<dyn IdentityOps>,
        plugins: PluginCredentialResolver,
        refresh_window: Duration,
    ) -> Self {
        Self {
            identity,
            plugins,
            refresh_window,
            default_credentials: OnceCell::new(),
            default_account: DefaultAccountCache::new(),
            outcomes: SingleFlightCache::new(),
        }
    }

    pub fn identity(&self) -> &Arc<dyn IdentityOps> {
        &self.identity
    }

    pub fn plugins(&self) -> &PluginCredentialResolver {
        &self.plugins
    }

    /// Decide where credentials for `account` come from.
    ///
    /// The outcome is cached per `(account, mode)`, failure outcomes included,
    /// so plugins are queried at most once per key.
    pub async fn fetch_base(
        &self,
        account: &AccountId,
        mode: Mode,
    ) -> Result<Arc<CredentialOutcome>, CloudError> {
        let key = (account.clone(), mode);
        self.outcomes
            .get_or_try_init(&key, || async {
                tracing::debug!("Resolving base credentials for {} ({})", account, mode);
                self.lookup(account, mode).await.map(Arc::new)
            })
            .await
    }

    async fn lookup(&self, account: &AccountId, mode: Mode) -> Result<CredentialOutcome, CloudError> {
        let default_account = self.default_account().await?;

        if let Some(info) = default_account.info()
            && &info.account_id == account
        {
            return Ok(CredentialOutcome::CorrectDefault {
                credentials: self.default_credentials().await?,
            });
        }

        if let Some(found) = self.plugins.fetch_credentials_for(account, mode).await? {
            return Ok(CredentialOutcome::Plugin {
                credentials: found.credentials,
                plugin_name: found.plugin_name,
            });
        }

        let unused_plugins = self.plugins.plugin_names();
        match default_account {
            DefaultAccount::Known(info) => Ok(CredentialOutcome::IncorrectDefault {
                credentials: self.default_credentials().await?,
                account_id: info.account_id,
                unused_plugins,
            }),
            DefaultAccount::Unknown => Ok(CredentialOutcome::NoCredentials { unused_plugins }),
        }
    }

    /// Ambient credentials from the default chain, memoized.
    pub async fn default_credentials(&self) -> Result<SharedProvider, CloudError> {
        self.default_credentials
            .get_or_try_init(|| async {
                let provider = self.identity.default_credentials().await?;
                Ok(CachingProvider::shared(provider, self.refresh_window))
            })
            .await
            .cloned()
    }

    /// Account the ambient credentials belong to, looked up once per resolver.
    ///
    /// Non-fatal lookup failures are cached as `Unknown`. Expired tokens are
    /// returned as-is and not cached.
    pub async fn default_account(&self) -> Result<DefaultAccount, CloudError> {
        self.default_account
            .get_or_try_init(|| async {
                match self.lookup_default_account().await {
                    Ok(info) => {
                        tracing::debug!("Default account is {}", info.account_id);
                        Ok(DefaultAccount::Known(info))
                    }
                    Err(e) if e.is_expired_token() => Err(e),
                    Err(e) => {
                        tracing::debug!("Unable to determine the default account: {}", e);
                        Ok(DefaultAccount::Unknown)
                    }
                }
            })
            .await
    }

    async fn lookup_default_account(&self) -> Result<AccountInfo, CloudError> {
        let credentials = self.default_credentials().await?;
        let resolved = credentials.provide().await?;
        if resolved.access_key_id.is_empty() {
            return Err(CloudError::other("Unable to resolve credentials from the default chain"));
        }
        self.identity.current_account(&credentials).await
    }
}
