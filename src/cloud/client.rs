// ABOUTME: A credentialed handle for one target environment.
// ABOUTME: Passed to every provisioning and asset call so collaborators act as the right principal.

use std::fmt;

use crate::credentials::SharedProvider;

/// Credentials plus region for calls against one account.
#[derive(Clone)]
pub struct CloudClient {
    pub region: String,
    pub credentials: SharedProvider,
    /// Human-readable origin of the credentials, e.g. `plugin corp-sso`.
    pub source: String,
}

impl CloudClient {
    pub fn new(region: impl Into<String>, credentials: SharedProvider, source: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            credentials,
            source: source.into(),
        }
    }
}

impl fmt::Debug for CloudClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudClient")
            .field("region", &self.region)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
