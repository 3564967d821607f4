// ABOUTME: The refreshing-credentials capability and its adapters.
// ABOUTME: Static, expiring, and legacy self-refreshing sources all become a SharedProvider.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::cloud::CloudError;

use super::Credentials;

/// Produce current credentials, refreshing them if needed.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn provide(&self) -> Result<Credentials, CloudError>;
}

pub type SharedProvider = Arc<dyn CredentialProvider>;

/// Credentials from an older plugin interface that refresh themselves in place.
#[async_trait]
pub trait LegacyCredentials: Send + Sync {
    /// Refresh the held credentials if they are expired or about to expire.
    async fn refresh_if_needed(&self) -> Result<(), CloudError>;

    /// The credentials currently held.
    fn snapshot(&self) -> Credentials;
}

/// Non-expiring credentials handed out as-is.
#[derive(Debug, Clone)]
pub struct StaticProvider(Credentials);

impl StaticProvider {
    pub fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }

    pub fn shared(credentials: Credentials) -> SharedProvider {
        Arc::new(Self(credentials))
    }
}

#[async_trait]
impl CredentialProvider for StaticProvider {
    async fn provide(&self) -> Result<Credentials, CloudError> {
        Ok(self.0.clone())
    }
}

/// Adapter for [`LegacyCredentials`]: refresh, then re-read the fields.
pub struct LegacyProvider(Arc<dyn LegacyCredentials>);

impl LegacyProvider {
    pub fn new(legacy: Arc<dyn LegacyCredentials>) -> Self {
        Self(legacy)
    }
}

#[async_trait]
impl CredentialProvider for LegacyProvider {
    async fn provide(&self) -> Result<Credentials, CloudError> {
        self.0.refresh_if_needed().await?;
        Ok(self.0.snapshot())
    }
}

type Refetch = Box<dyn Fn() -> BoxFuture<'static, Result<Credentials, CloudError>> + Send + Sync>;

/// Expiring static credentials: each call rechecks expiry and re-invokes the source when due.
pub struct RefetchingProvider {
    current: Mutex<Credentials>,
    refetch: Refetch,
    refresh_window: Duration,
}

impl RefetchingProvider {
    pub fn new<F>(initial: Credentials, refresh_window: Duration, refetch: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<Credentials, CloudError>> + Send + Sync + 'static,
    {
        Self {
            current: Mutex::new(initial),
            refetch: Box::new(refetch),
            refresh_window,
        }
    }
}

#[async_trait]
impl CredentialProvider for RefetchingProvider {
    async fn provide(&self) -> Result<Credentials, CloudError> {
        let mut current = self.current.lock().await;
        if current.expires_within(self.refresh_window) {
            tracing::debug!("Credentials about to expire, fetching fresh ones from source");
            *current = (self.refetch)().await?;
        }
        Ok(current.clone())
    }
}

/// Memoizes another provider until its credentials come within the refresh window of expiring.
///
/// The lock is held across the refresh, so concurrent callers wait for a single
/// underlying fetch instead of each issuing their own.
pub struct CachingProvider {
    inner: SharedProvider,
    refresh_window: Duration,
    cached: Mutex<Option<Credentials>>,
}

impl CachingProvider {
    pub fn new(inner: SharedProvider, refresh_window: Duration) -> Self {
        Self {
            inner,
            refresh_window,
            cached: Mutex::new(None),
        }
    }

    pub fn shared(inner: SharedProvider, refresh_window: Duration) -> SharedProvider {
        Arc::new(Self::new(inner, refresh_window))
    }
}

#[async_trait]
impl CredentialProvider for CachingProvider {
    async fn provide(&self) -> Result<Credentials, CloudError> {
        let mut cached = self.cached.lock().await;
        if let Some(credentials) = cached.as_ref()
            && !credentials.expires_within(self.refresh_window)
        {
            return Ok(credentials.clone());
        }

        let fresh = self.inner.provide().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }
}
