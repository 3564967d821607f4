// ABOUTME: Pluggable credential sources and the resolver that queries them in registration order.
// ABOUTME: Plugin failures are logged and downgraded; whatever a plugin returns becomes a SharedProvider.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::cloud::CloudError;
use crate::types::AccountId;

use super::{
    CachingProvider, Credentials, LegacyCredentials, LegacyProvider, Mode, RefetchingProvider,
    SharedProvider, StaticProvider,
};

/// The shapes a plugin may hand back.
pub enum PluginCredentials {
    /// A ready-made provider.
    Provider(SharedProvider),
    /// Plain credentials, with or without an expiration.
    Static(Credentials),
    /// Credentials object that refreshes itself.
    Legacy(Arc<dyn LegacyCredentials>),
}

/// A third-party credential source. Treated as untrusted.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    fn name(&self) -> &str;

    async fn is_available(&self) -> Result<bool, CloudError>;

    async fn can_provide_credentials(&self, account: &AccountId) -> Result<bool, CloudError>;

    async fn get_provider(
        &self,
        account: &AccountId,
        mode: Mode,
    ) -> Result<PluginCredentials, CloudError>;
}

/// Credentials a plugin agreed to provide.
#[derive(Clone)]
pub struct PluginMatch {
    pub credentials: SharedProvider,
    pub plugin_name: String,
}

/// Queries registered sources in order and normalizes the first match.
pub struct PluginCredentialResolver {
    sources: Vec<Arc<dyn CredentialSource>>,
    refresh_window: Duration,
}

impl PluginCredentialResolver {
    pub fn new(refresh_window: Duration) -> Self {
        Self {
            sources: Vec::new(),
            refresh_window,
        }
    }

    pub fn register(&mut self, source: Arc<dyn CredentialSource>) {
        tracing::debug!("Registered credential source {}", source.name());
        self.sources.push(source);
    }

    /// Names of every registered source, in registration order.
    pub fn plugin_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// First plugin able to provide credentials for `account`, if any.
    ///
    /// Errors from availability and capability checks are never propagated.
    /// Only an expired-token error from fetching the provider escapes.
    pub async fn fetch_credentials_for(
        &self,
        account: &AccountId,
        mode: Mode,
    ) -> Result<Option<PluginMatch>, CloudError> {
        for source in &self.sources {
            let name = source.name();

            if !guarded(name, "is_available", source.is_available()).await {
                tracing::debug!("Credentials source {} is not available, ignoring it", name);
                continue;
            }

            if !guarded(
                name,
                "can_provide_credentials",
                source.can_provide_credentials(account),
            )
            .await
            {
                continue;
            }

            tracing::debug!("Using {} credentials for account {}", name, account);
            let provided = match source.get_provider(account, mode).await {
                Ok(provided) => provided,
                Err(e) if e.is_expired_token() => return Err(e),
                Err(e) => {
                    tracing::warn!("Credential source {} failed to provide credentials: {}", name, e);
                    continue;
                }
            };

            return Ok(Some(PluginMatch {
                credentials: self.normalize(source, account, mode, provided),
                plugin_name: name.to_string(),
            }));
        }

        Ok(None)
    }

    fn normalize(
        &self,
        source: &Arc<dyn CredentialSource>,
        account: &AccountId,
        mode: Mode,
        provided: PluginCredentials,
    ) -> SharedProvider {
        match provided {
            PluginCredentials::Provider(provider) => {
                CachingProvider::shared(provider, self.refresh_window)
            }
            PluginCredentials::Static(credentials) if credentials.expiration.is_none() => {
                StaticProvider::shared(credentials)
            }
            PluginCredentials::Static(credentials) => {
                let source = source.clone();
                let account = account.clone();
                Arc::new(RefetchingProvider::new(
                    credentials,
                    self.refresh_window,
                    move || {
                        let source = source.clone();
                        let account = account.clone();
                        Box::pin(async move { refetch_static(source.as_ref(), &account, mode).await })
                    },
                ))
            }
            PluginCredentials::Legacy(legacy) => Arc::new(LegacyProvider::new(legacy)),
        }
    }
}

async fn refetch_static(
    source: &dyn CredentialSource,
    account: &AccountId,
    mode: Mode,
) -> Result<Credentials, CloudError> {
    match source.get_provider(account, mode).await? {
        PluginCredentials::Static(credentials) => Ok(credentials),
        _ => Err(CloudError::other(format!(
            "Plugin {} initially returned static credentials but now returned something else",
            source.name()
        ))),
    }
}

/// Run a plugin check, turning any error into `false`.
async fn guarded<F>(plugin: &str, check: &str, call: F) -> bool
where
    F: Future<Output = Result<bool, CloudError>>,
{
    match call.await {
        Ok(answer) => answer,
        Err(e) => {
            tracing::warn!("Uncaught error in credential source {} ({}): {}", plugin, check, e);
            false
        }
    }
}
