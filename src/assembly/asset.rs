// ABOUTME: File and container-image assets referenced by a stack.
// ABOUTME: Each asset is built once and published once per run, before its stacks deploy.

use serde::{Deserialize, Serialize};

use crate::types::AssetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    File,
    DockerImage,
}

/// A single asset and the location it must be published to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifestEntry {
    pub id: AssetId,
    pub kind: AssetKind,
    /// Local path or build context.
    pub source: String,
    /// Bucket key or repository tag the asset is published to.
    pub destination: String,
    /// Role used to publish into the destination account.
    #[serde(default)]
    pub assume_role_arn: Option<String>,
}

impl AssetManifestEntry {
    pub fn new(
        id: impl Into<String>,
        kind: AssetKind,
        source: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            id: AssetId::new(id),
            kind,
            source: source.into(),
            destination: destination.into(),
            assume_role_arn: None,
        }
    }
}
