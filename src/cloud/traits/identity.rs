// ABOUTME: Ambient identity operations: default credentials, "who am I", and role assumption.
// ABOUTME: Implemented by the cloud SDK adapter; mocked in tests.

use async_trait::async_trait;

use crate::cloud::{AccountInfo, AssumeRoleRequest, CloudError};
use crate::credentials::{Credentials, SharedProvider};

#[async_trait]
pub trait IdentityOps: Send + Sync {
    /// Region configured for the process (environment, profile, or instance metadata).
    fn default_region(&self) -> String;

    /// Credentials from the default provider chain.
    async fn default_credentials(&self) -> Result<SharedProvider, CloudError>;

    /// Account and partition the given credentials belong to.
    async fn current_account(&self, credentials: &SharedProvider)
    -> Result<AccountInfo, CloudError>;

    /// Exchange `base` for temporary credentials of the requested role.
    async fn assume_role(
        &self,
        base: &SharedProvider,
        request: &AssumeRoleRequest,
        region: &str,
    ) -> Result<Credentials, CloudError>;
}
