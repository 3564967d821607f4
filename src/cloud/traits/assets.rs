// ABOUTME: Asset build and publish operations.
// ABOUTME: Builds run locally; publishing and the published check talk to the destination account.

use async_trait::async_trait;

use crate::assembly::{AssetManifestEntry, StackArtifact};
use crate::cloud::{CloudClient, CloudError};

#[async_trait]
pub trait AssetOps: Send + Sync {
    /// Build (package or image-build) an asset locally.
    async fn build_asset(
        &self,
        asset: &AssetManifestEntry,
        stack: &StackArtifact,
    ) -> Result<(), CloudError>;

    /// Upload a built asset to its destination.
    async fn publish_asset(
        &self,
        client: &CloudClient,
        asset: &AssetManifestEntry,
    ) -> Result<(), CloudError>;

    /// Whether the destination already holds this asset.
    async fn is_asset_published(
        &self,
        client: &CloudClient,
        asset: &AssetManifestEntry,
    ) -> Result<bool, CloudError>;
}
